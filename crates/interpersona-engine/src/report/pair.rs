use interpersona_core::config::ReportConfig;
use interpersona_core::errors::ReportError;
use interpersona_core::payload::{PairReport, PairThemeRow};
use interpersona_core::profile::{TraitVector, TRAIT_COUNT};
use interpersona_core::reference::content::TextQuery;
use interpersona_core::reference::ReferenceData;
use interpersona_core::traits::TraitSource;
use interpersona_core::types::TextKind;
use tracing::debug;

use super::text::resolve_text;
use crate::assign::{assign_styles, StyleAssignment};

/// Comparison shown when no difference score is authored for a pair.
pub const BLANK: &str = "BLANK";

/// Trait similarity of two users on a 0..=100 scale.
///
/// Pearson correlation of the trait scores, mapped from [-1, 1] and rounded
/// half to even. `None` when either vector has no variance.
pub fn similarity_score(a: &[f64; TRAIT_COUNT], b: &[f64; TRAIT_COUNT]) -> Option<u32> {
    let n = TRAIT_COUNT as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    let denom = (var_a * var_b).sqrt();
    if !denom.is_normal() {
        return None;
    }
    let r = (cov / denom).clamp(-1.0, 1.0);
    Some(((r + 1.0) / 2.0 * 100.0).round_ties_even() as u32)
}

fn style_in(assignments: &[StyleAssignment], theme: u16) -> Option<&StyleAssignment> {
    assignments.iter().find(|a| a.theme == theme)
}

/// Side-by-side report of two users, one row per theme in `theme_order`.
///
/// Themes the reference data does not define are left out. A user may be
/// paired with themself.
pub fn pair_report(
    reference: &ReferenceData,
    config: &ReportConfig,
    traits: &dyn TraitSource,
    user_1: &str,
    user_2: &str,
    language: u16,
) -> Result<PairReport, ReportError> {
    let first = TraitVector::from_record(&traits.user(user_1)?)?;
    let second = TraitVector::from_record(&traits.user(user_2)?)?;
    let styles_1 = assign_styles(&first, reference, config, 1)?;
    let styles_2 = assign_styles(&second, reference, config, 2)?;

    let mut themes = Vec::with_capacity(config.theme_order.len());
    for &theme in &config.theme_order {
        let (Some(a), Some(b)) = (style_in(&styles_1, theme), style_in(&styles_2, theme)) else {
            debug!(theme, "theme not in reference data, skipped");
            continue;
        };
        let (code_1, code_2) = (a.code(), b.code());
        let difference_score = reference.pair.difference(code_1, code_2);
        let comparison = match difference_score {
            Some(score) => reference
                .pair
                .score_text(score, language)
                .map_or_else(|| config.missing_content.clone(), str::to_string),
            None => BLANK.to_string(),
        };
        let text_for = |subject: &TraitVector, code, self_user| {
            let query = TextQuery {
                kind: TextKind::Interpersonal,
                code,
                language,
                gender: subject.gender,
                self_user,
            };
            resolve_text(reference, &query, config, &subject.first_name)
        };

        themes.push(PairThemeRow {
            theme,
            theme_name: reference.theme(theme)?.name.clone(),
            user_1_style: code_1,
            user_2_style: code_2,
            difference_score,
            comparison,
            user_1_text: text_for(&first, code_1, true),
            user_2_text: text_for(&second, code_2, false),
        });
    }

    Ok(PairReport {
        user_1: first.user_id.clone(),
        user_2: second.user_id.clone(),
        similarity_score: similarity_score(&first.scores, &second.scores),
        themes,
    })
}
