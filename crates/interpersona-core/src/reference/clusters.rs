use serde::{Deserialize, Serialize};

use super::styles::StyleProfile;
use crate::profile::{MODEL_INPUT_COUNT, TRAIT_COUNT};
use crate::types::ThemeId;

/// Linear-model coefficients aligned to the trait schema.
///
/// Authored as a flat array of 30 entries (facets only) or 32 entries
/// (facets, then age, then gender). Any other width is rejected at load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Coefficients {
    traits: [f64; TRAIT_COUNT],
    demographics: Option<[f64; 2]>,
}

impl Coefficients {
    pub fn traits_only(traits: [f64; TRAIT_COUNT]) -> Self {
        Self {
            traits,
            demographics: None,
        }
    }

    pub fn with_demographics(traits: [f64; TRAIT_COUNT], age: f64, gender: f64) -> Self {
        Self {
            traits,
            demographics: Some([age, gender]),
        }
    }

    pub fn uses_demographics(&self) -> bool {
        self.demographics.is_some()
    }

    /// Coefficients in model input order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.traits
            .iter()
            .copied()
            .chain(self.demographics.into_iter().flatten())
    }
}

impl TryFrom<Vec<f64>> for Coefficients {
    type Error = String;

    fn try_from(raw: Vec<f64>) -> Result<Self, Self::Error> {
        if let Some(bad) = raw.iter().position(|c| !c.is_finite()) {
            return Err(format!("coefficient {bad} is not finite"));
        }
        let mut traits = [0.0; TRAIT_COUNT];
        match raw.len() {
            TRAIT_COUNT => {
                traits.copy_from_slice(&raw);
                Ok(Self::traits_only(traits))
            }
            MODEL_INPUT_COUNT => {
                traits.copy_from_slice(&raw[..TRAIT_COUNT]);
                Ok(Self::with_demographics(
                    traits,
                    raw[TRAIT_COUNT],
                    raw[TRAIT_COUNT + 1],
                ))
            }
            n => Err(format!(
                "expected {TRAIT_COUNT} or {MODEL_INPUT_COUNT} coefficients, got {n}"
            )),
        }
    }
}

impl From<Coefficients> for Vec<f64> {
    fn from(c: Coefficients) -> Self {
        c.iter().collect()
    }
}

/// One cluster of a theme's regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    pub cluster_id: u16,
    pub mean: f64,
    pub stdev: f64,
    #[serde(default)]
    pub intercept: f64,
    pub coefficients: Coefficients,
}

/// Model and style catalogue of a single theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeModel {
    pub theme_id: ThemeId,
    #[serde(default)]
    pub name: String,
    /// Cluster order defines the percentile vector layout.
    pub clusters: Vec<ClusterModel>,
    /// Authoring order; earlier styles win angle ties.
    pub styles: Vec<StyleProfile>,
}

impl ThemeModel {
    pub fn style(&self, style_id: u16) -> Option<&StyleProfile> {
        self.styles.iter().find(|s| s.style_id == style_id)
    }
}
