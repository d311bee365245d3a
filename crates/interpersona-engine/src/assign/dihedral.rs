use interpersona_core::errors::ReportError;
use interpersona_core::reference::clusters::ThemeModel;
use interpersona_core::types::{StyleId, UnitFloat};

/// Percentile vectors are centred on this value before comparing directions.
pub const CENTRE: f64 = 0.5;

/// Best-matching style of a theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleMatch {
    pub style_id: StyleId,
    /// Degrees, in [0, 180].
    pub angle: f64,
}

/// Angle in degrees between two already-centred vectors.
///
/// `None` when either vector has zero norm. The cosine is clamped so
/// rounding never pushes `acos` out of its domain.
pub fn dihedral_angle(u: &[f64], s: &[f64]) -> Option<f64> {
    let dot: f64 = u.iter().zip(s).map(|(a, b)| a * b).sum();
    let nu = norm(u);
    let ns = norm(s);
    if nu == 0.0 || ns == 0.0 {
        return None;
    }
    let cos = (dot / (nu * ns)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn centred(v: impl Iterator<Item = f64>) -> Vec<f64> {
    v.map(|x| x - CENTRE).collect()
}

/// Angles from a centred user vector to every centred style vector, in
/// authoring order.
pub fn rank_styles(
    theme: &ThemeModel,
    user: &[UnitFloat],
) -> Result<Vec<StyleMatch>, ReportError> {
    let u = centred(user.iter().map(|p| p.value()));
    if norm(&u) == 0.0 {
        return Err(ReportError::DegenerateVector {
            theme: theme.theme_id,
            subject: "user".to_string(),
        });
    }
    theme
        .styles
        .iter()
        .map(|style| {
            let s = centred(style.values());
            dihedral_angle(&u, &s)
                .map(|angle| StyleMatch {
                    style_id: style.style_id,
                    angle,
                })
                .ok_or_else(|| ReportError::DegenerateVector {
                    theme: theme.theme_id,
                    subject: format!("style {}", style.style_id),
                })
        })
        .collect()
}

/// Style with the smallest angle; the earliest authored style wins ties.
pub fn closest_style(theme: &ThemeModel, user: &[UnitFloat]) -> Result<StyleMatch, ReportError> {
    if user.len() != theme.clusters.len() {
        return Err(ReportError::config(format!(
            "theme {} expects {} percentiles, got {}",
            theme.theme_id,
            theme.clusters.len(),
            user.len()
        )));
    }
    let ranked = rank_styles(theme, user)?;
    let mut best: Option<StyleMatch> = None;
    for m in ranked {
        if best.map_or(true, |b| m.angle < b.angle) {
            best = Some(m);
        }
    }
    best.ok_or_else(|| ReportError::config(format!("theme {} has no styles", theme.theme_id)))
}
