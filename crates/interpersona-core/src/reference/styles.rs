use serde::{Deserialize, Serialize};

use crate::types::{StyleCode, StyleId, ThemeId, UnitFloat};

/// Reference percentile profile of one style, aligned with the theme's clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub style_id: StyleId,
    pub percentiles: Vec<UnitFloat>,
}

impl StyleProfile {
    pub fn code(&self, theme: ThemeId) -> StyleCode {
        StyleCode::new(theme, self.style_id)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.percentiles.iter().map(|p| p.value())
    }
}
