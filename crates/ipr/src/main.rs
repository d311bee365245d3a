#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use interpersona_core::config::{ReportConfig, CONFIG_PATH};
use interpersona_core::profile::{TraitVector, UserDirectory};
use interpersona_core::reference::ReferenceData;
use interpersona_core::traits::{ReportStore, TraitSource};
use interpersona_core::types::{ReportVariant, SectionId, StyleCode};
use interpersona_engine::assign::assign_styles;
use interpersona_engine::report::{pair_report, ReportRequest, Reporter};
use interpersona_engine::select::ordering::order_stories;
use interpersona_engine::select::{user_rows, Candidate};
use interpersona_engine::state::store::{FileReportStore, MemoryReportStore};
use interpersona_engine::story::build_stories;

#[derive(Parser)]
#[command(
    name = "ipr",
    version,
    about = "Personality style assignment and story-ordered reports."
)]
struct Cli {
    /// Report config JSON (default: .interpersona/config.json if present).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Reference bundle and trait source shared by the computing commands.
#[derive(clap::Args)]
struct Inputs {
    /// Reference bundle JSON.
    #[arg(long, short)]
    reference: String,

    /// User records JSON (array of {user_id, first_name, age, gender, traits}).
    #[arg(long, short)]
    users: String,
}

#[derive(Subcommand)]
enum Cmd {
    /// Write the default report config to .interpersona/config.json.
    Init {
        /// Overwrite an existing config.
        #[arg(long)]
        force: bool,
    },

    /// Validate a reference bundle: schema + consistency + lint.
    Check {
        /// Path to reference bundle .json file.
        file: String,

        /// Output structured JSON report.
        #[arg(long)]
        json: bool,

        /// Fail on warnings (not just errors).
        #[arg(long)]
        strict: bool,
    },

    /// Assign a user to one style per theme.
    Assign {
        #[command(flatten)]
        inputs: Inputs,

        user: String,
    },

    /// Show the ordered stories of every section for a user.
    Stories {
        #[command(flatten)]
        inputs: Inputs,

        user: String,

        /// Only this section.
        #[arg(long)]
        section: Option<SectionId>,
    },

    /// Build (or fetch) an individual report.
    Report {
        #[command(flatten)]
        inputs: Inputs,

        user: String,

        /// individual or individual_filtered.
        #[arg(long, default_value = "individual_filtered", value_parser = parse_variant)]
        variant: ReportVariant,

        /// Render for someone other than the user.
        #[arg(long)]
        other: bool,

        /// Only this section; 0 for the summary alone.
        #[arg(long)]
        section: Option<SectionId>,

        #[arg(long, default_value_t = 1)]
        language: u16,

        /// Persist reports under this directory and reuse them.
        #[arg(long)]
        store: Option<String>,
    },

    /// Compare two users theme by theme.
    Pair {
        #[command(flatten)]
        inputs: Inputs,

        user_1: String,

        user_2: String,

        #[arg(long, default_value_t = 1)]
        language: u16,
    },
}

fn parse_variant(raw: &str) -> Result<ReportVariant, String> {
    match raw {
        "individual" => Ok(ReportVariant::Individual),
        "individual_filtered" => Ok(ReportVariant::IndividualFiltered),
        other => Err(format!(
            "unknown variant '{other}' (expected individual or individual_filtered)"
        )),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.cmd {
        Cmd::Init { force } => cmd_init(force),

        Cmd::Check { file, json, strict } => cmd_check(&file, json, strict, config),

        Cmd::Assign { inputs, user } => cmd_assign(&inputs, &user, config),

        Cmd::Stories {
            inputs,
            user,
            section,
        } => cmd_stories(&inputs, &user, section, config),

        Cmd::Report {
            inputs,
            user,
            variant,
            other,
            section,
            language,
            store,
        } => {
            let request = ReportRequest {
                user_id: user,
                variant,
                self_user: !other,
                section,
                language,
            };
            cmd_report(&inputs, &request, store.as_deref(), config)
        }

        Cmd::Pair {
            inputs,
            user_1,
            user_2,
            language,
        } => cmd_pair(&inputs, &user_1, &user_2, language, config),
    }
}

// ── Helpers ─────────────────────────────────────────────────────

struct Loaded {
    reference: ReferenceData,
    users: UserDirectory,
    config: ReportConfig,
}

fn load(inputs: &Inputs, config: Option<&str>) -> Result<Loaded> {
    let loaded = Loaded {
        reference: ReferenceData::load(&inputs.reference)?,
        users: UserDirectory::load(&inputs.users)?,
        config: ReportConfig::load(config)?,
    };
    tracing::debug!(
        reference = %inputs.reference,
        fingerprint = loaded.reference.fingerprint(),
        users = loaded.users.ids().count(),
        "inputs loaded"
    );
    Ok(loaded)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Commands ────────────────────────────────────────────────────

fn cmd_init(force: bool) -> Result<()> {
    if Path::new(CONFIG_PATH).exists() && !force {
        bail!("{CONFIG_PATH} already exists (use --force to overwrite)");
    }
    if let Some(dir) = Path::new(CONFIG_PATH).parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&ReportConfig::default())?;
    std::fs::write(CONFIG_PATH, &json).with_context(|| format!("cannot write {CONFIG_PATH}"))?;
    eprintln!("created {CONFIG_PATH}");
    Ok(())
}

fn cmd_check(file: &str, json_out: bool, strict: bool, config: Option<&str>) -> Result<()> {
    let content = std::fs::read_to_string(file).with_context(|| format!("cannot read {file}"))?;
    let data: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("{file}: invalid JSON"))?;
    let config = ReportConfig::load(config)?;

    let report = interpersona_core::schema::check(&data, file, strict, Some(&config));

    if json_out {
        print_json(&report)?;
    } else {
        if report.pass {
            eprintln!("  ok  {file} (v{})", report.version);
        } else {
            eprintln!("  FAIL {file} (v{})", report.version);
        }
        for e in &report.errors {
            eprintln!(
                "  error {}: {} {}",
                e.code,
                e.message,
                e.path.as_deref().unwrap_or("")
            );
        }
        for w in &report.warnings {
            eprintln!(
                "  warn  {}: {} {}",
                w.code,
                w.message,
                w.path.as_deref().unwrap_or("")
            );
        }
    }

    if !report.pass {
        bail!("check failed for {file}");
    }
    Ok(())
}

fn cmd_assign(inputs: &Inputs, user: &str, config: Option<&str>) -> Result<()> {
    let l = load(inputs, config)?;
    let traits = TraitVector::from_record(&l.users.user(user)?)?;
    let assignments = assign_styles(&traits, &l.reference, &l.config, 1)?;
    print_json(&assignments)
}

#[derive(Serialize)]
struct SectionStories {
    section: SectionId,
    stories: Vec<Vec<StyleCode>>,
}

fn cmd_stories(
    inputs: &Inputs,
    user: &str,
    only: Option<SectionId>,
    config: Option<&str>,
) -> Result<()> {
    let l = load(inputs, config)?;
    let traits = TraitVector::from_record(&l.users.user(user)?)?;
    let assignments = assign_styles(&traits, &l.reference, &l.config, 1)?;

    let mut by_section: BTreeMap<SectionId, Vec<Candidate<'_>>> = BTreeMap::new();
    for c in user_rows(&l.reference, &assignments) {
        by_section.entry(c.section()).or_default().push(c);
    }

    let mut out = Vec::new();
    for (section, rows) in by_section {
        if only.is_some_and(|s| s != section) {
            continue;
        }
        let Some(graph) = l.reference.sections.get(&section) else {
            bail!("section {section} has no graph");
        };
        let styles: Vec<StyleCode> = rows.iter().map(Candidate::code).collect();
        let stories = order_stories(build_stories(graph, &styles)?, &rows);
        out.push(SectionStories { section, stories });
    }
    print_json(&out)
}

fn cmd_report(
    inputs: &Inputs,
    request: &ReportRequest,
    store_dir: Option<&str>,
    config: Option<&str>,
) -> Result<()> {
    let l = load(inputs, config)?;
    let store: Box<dyn ReportStore> = match store_dir {
        Some(dir) => Box::new(FileReportStore::new(dir)),
        None => Box::new(MemoryReportStore::new()),
    };
    let report = Reporter::new(&l.reference, &l.config)
        .report(request, &l.users, store.as_ref())
        .with_context(|| format!("report for {} failed", request.user_id))?;
    print_json(&report.payload)
}

fn cmd_pair(
    inputs: &Inputs,
    user_1: &str,
    user_2: &str,
    language: u16,
    config: Option<&str>,
) -> Result<()> {
    let l = load(inputs, config)?;
    let report = pair_report(&l.reference, &l.config, &l.users, user_1, user_2, language)?;
    print_json(&report)
}
