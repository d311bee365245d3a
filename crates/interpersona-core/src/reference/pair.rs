use serde::{Deserialize, Serialize};

use crate::types::StyleCode;

/// Authored distance between two styles of the same theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceScore {
    pub style_1: StyleCode,
    pub style_2: StyleCode,
    pub score: i32,
}

/// Comparison sentence shown for a difference score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreText {
    pub score: i32,
    #[serde(default = "default_language")]
    pub language: u16,
    pub text: String,
}

fn default_language() -> u16 {
    1
}

/// Tables used only by the pair report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairTables {
    #[serde(default)]
    pub difference_scores: Vec<DifferenceScore>,
    #[serde(default)]
    pub score_texts: Vec<ScoreText>,
}

impl PairTables {
    /// Difference score for a style pair.
    ///
    /// Resolution order, first hit wins:
    /// 1. `(a, b)`
    /// 2. `(b, a)`
    /// 3. `(a, *)`
    /// 4. `(*, b)`
    /// 5. `(*, *)`
    pub fn difference(&self, a: StyleCode, b: StyleCode) -> Option<i32> {
        let w = StyleCode::WILDCARD;
        [(a, b), (b, a), (a, w), (w, b), (w, w)]
            .into_iter()
            .find_map(|(x, y)| {
                self.difference_scores
                    .iter()
                    .find(|d| d.style_1 == x && d.style_2 == y)
                    .map(|d| d.score)
            })
    }

    pub fn score_text(&self, score: i32, language: u16) -> Option<&str> {
        self.score_texts
            .iter()
            .find(|t| t.score == score && t.language == language)
            .map(|t| t.text.as_str())
    }
}
