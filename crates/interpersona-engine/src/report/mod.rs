//! Individual and pair reports.

pub mod individual;
pub mod pair;
pub mod share;
pub mod text;

use interpersona_core::errors::ReportError;
use interpersona_core::state::ReportStage;
use interpersona_core::types::ReportVariant;
use tracing::debug;

pub use self::individual::{ReportRequest, Reporter};
pub use self::pair::{pair_report, similarity_score};

/// Tracks one request through the report lifecycle.
#[derive(Debug)]
pub struct Progress {
    stage: ReportStage,
    variant: ReportVariant,
}

impl Progress {
    pub fn new(variant: ReportVariant) -> Self {
        Self {
            stage: ReportStage::NoReport,
            variant,
        }
    }

    pub fn stage(&self) -> ReportStage {
        self.stage
    }

    pub fn advance(&mut self, next: ReportStage) -> Result<(), ReportError> {
        if !self.stage.can_advance_to(next, self.variant) {
            return Err(ReportError::config(format!(
                "{} report cannot go from {} to {next}",
                self.variant, self.stage
            )));
        }
        debug!(from = %self.stage, to = %next, variant = %self.variant, "report stage");
        self.stage = next;
        Ok(())
    }
}
