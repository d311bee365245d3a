use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};

/// Seconds after which a lock left behind by a dead writer is broken.
pub const STALE_LOCK_SECS: i64 = 60;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Write content atomically: write to temp file, fsync, rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let temp_path = dir.join(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    let mut file = std::fs::File::create(&temp_path)
        .with_context(|| format!("cannot create temp file for {}", path.display()))?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("cannot rename temp to {}", path.display()))?;
    Ok(())
}

/// Advisory lock on a report file, held as `<file>.lock`.
///
/// The lock file holds the owner's pid and a unix timestamp. Creation is
/// exclusive, so two writers never both hold it.
#[derive(Debug)]
pub struct AdvisoryLock {
    lock_path: PathBuf,
}

impl AdvisoryLock {
    /// Take the lock, or `None` if a live writer holds it.
    pub fn try_acquire(target: &Path) -> Result<Option<Self>> {
        let mut name = target.as_os_str().to_owned();
        name.push(".lock");
        let lock_path = PathBuf::from(name);

        if Self::is_stale(&lock_path) {
            let _ = std::fs::remove_file(&lock_path);
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(mut file) => {
                let ts = chrono::Utc::now().timestamp();
                writeln!(file, "{}\n{ts}", std::process::id())
                    .with_context(|| format!("cannot write lock {}", lock_path.display()))?;
                Ok(Some(Self { lock_path }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("cannot acquire lock {}", lock_path.display()))
            }
        }
    }

    fn is_stale(lock_path: &Path) -> bool {
        let Ok(content) = std::fs::read_to_string(lock_path) else {
            return false;
        };
        content
            .lines()
            .nth(1)
            .and_then(|ts| ts.trim().parse::<i64>().ok())
            .is_some_and(|ts| chrono::Utc::now().timestamp() - ts > STALE_LOCK_SECS)
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    pub fn release(mut self) -> Result<()> {
        let lock_path = std::mem::take(&mut self.lock_path);
        if lock_path.exists() {
            std::fs::remove_file(&lock_path)
                .with_context(|| format!("cannot release lock {}", lock_path.display()))?;
        }
        Ok(())
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        // empty once released; the path may already belong to the next holder
        if !self.lock_path.as_os_str().is_empty() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
