use crate::errors::{LookupError, ReportError, StoreError};
use crate::profile::UserRecord;
use crate::reference::content::TextQuery;
use crate::state::{PersistedReport, ReportKey};

/// Resolves authored text for a style.
pub trait ContentLookup {
    fn text(&self, query: &TextQuery) -> Result<String, LookupError>;
}

/// Supplies raw trait records by user id.
pub trait TraitSource {
    fn user(&self, user_id: &str) -> Result<UserRecord, ReportError>;
}

/// Result of offering a report to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// A report under the same key was already stored; nothing changed.
    AlreadyExists,
    /// Another writer holds the key right now; its copy will land instead.
    Contended,
}

/// Persists finished reports, keyed by user and request shape.
pub trait ReportStore {
    fn load(&self, key: &ReportKey) -> Result<Option<PersistedReport>, StoreError>;
    fn save(&self, report: &PersistedReport) -> Result<SaveOutcome, StoreError>;
}
