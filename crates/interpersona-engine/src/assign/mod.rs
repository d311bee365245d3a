//! Trait vector to per-theme style assignment.
//!
//! interpolate -> project -> percentile -> dihedral match, one theme at a time.

pub mod dihedral;
pub mod interpolate;
pub mod percentile;
pub mod projector;

use interpersona_core::config::ReportConfig;
use interpersona_core::errors::ReportError;
use interpersona_core::profile::{NormalizedProfile, TraitVector};
use interpersona_core::reference::clusters::ThemeModel;
use interpersona_core::reference::ReferenceData;
use interpersona_core::types::{StyleCode, StyleId, ThemeId, UnitFloat};
use serde::Serialize;
use tracing::debug;

use self::dihedral::closest_style;
use self::interpolate::normalize;
use self::percentile::percentile;
use self::projector::predict;

/// A user's winning style in one theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyleAssignment {
    /// 1 or 2; distinguishes the two sides of a pair report.
    pub user_index: u8,
    pub theme: ThemeId,
    pub style: StyleId,
    pub angle: f64,
}

impl StyleAssignment {
    pub fn code(&self) -> StyleCode {
        StyleCode::new(self.theme, self.style)
    }
}

/// Percentile of every cluster of a theme, in cluster order.
pub fn theme_percentiles(
    profile: &NormalizedProfile,
    theme: &ThemeModel,
) -> Result<Vec<UnitFloat>, ReportError> {
    theme
        .clusters
        .iter()
        .map(|c| percentile(predict(profile, c), c.mean, c.stdev))
        .collect()
}

/// Assign a user to one style per theme, in ascending theme order.
pub fn assign_styles(
    traits: &TraitVector,
    reference: &ReferenceData,
    config: &ReportConfig,
    user_index: u8,
) -> Result<Vec<StyleAssignment>, ReportError> {
    let profile = normalize(traits, &config.age_scale)?;
    let mut out = Vec::with_capacity(reference.themes.len());
    for theme in reference.themes.values() {
        let percentiles = theme_percentiles(&profile, theme)?;
        let best = closest_style(theme, &percentiles)?;
        debug!(
            user = %traits.user_id,
            theme = theme.theme_id,
            style = best.style_id,
            angle = best.angle,
            "style assigned"
        );
        out.push(StyleAssignment {
            user_index,
            theme: theme.theme_id,
            style: best.style_id,
            angle: best.angle,
        });
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use interpersona_core::profile::{UserRecord, TRAIT_SCHEMA};
    use interpersona_core::reference::ReferenceData;
    use serde_json::json;

    /// Trait record with every facet at `fill`, except `anxiety` at `anxiety`.
    pub fn user(id: &str, fill: f64, anxiety: f64) -> UserRecord {
        let mut traits: std::collections::BTreeMap<String, f64> =
            TRAIT_SCHEMA.iter().map(|n| (n.to_string(), fill)).collect();
        traits.insert("anxiety".into(), anxiety);
        UserRecord {
            user_id: id.to_string(),
            first_name: format!("{id}-name"),
            age: 30.0,
            gender: "male".to_string(),
            traits,
        }
    }

    fn one_hot(i: usize, w: f64) -> Vec<f64> {
        let mut v = vec![0.0; 30];
        v[i] = w;
        v
    }

    /// Two themes. Theme 1 cluster 1 reads `anxiety`, cluster 2 reads `anger`;
    /// theme 2 has one cluster on `anxiety`. High anxiety picks style 1 in both.
    pub fn reference() -> ReferenceData {
        let v = json!({
            "themes": [
                {
                    "theme_id": 1,
                    "name": "Drive",
                    "clusters": [
                        {"cluster_id": 1, "mean": 0.0, "stdev": 1.0, "coefficients": one_hot(0, 1.0)},
                        {"cluster_id": 2, "mean": 0.0, "stdev": 1.0, "coefficients": one_hot(1, 1.0)}
                    ],
                    "styles": [
                        {"style_id": 1, "percentiles": [0.9, 0.5]},
                        {"style_id": 2, "percentiles": [0.1, 0.5]},
                        {"style_id": 3, "percentiles": [0.5, 0.9]}
                    ]
                },
                {
                    "theme_id": 2,
                    "name": "Calm",
                    "clusters": [
                        {"cluster_id": 1, "mean": 0.0, "stdev": 1.0, "coefficients": one_hot(0, 1.0)}
                    ],
                    "styles": [
                        {"style_id": 1, "percentiles": [0.8]},
                        {"style_id": 2, "percentiles": [0.2]}
                    ]
                }
            ]
        });
        ReferenceData::from_json(&serde_json::to_vec(&v).unwrap()).unwrap()
    }
}
