use interpersona_core::config::AgeScale;
use interpersona_core::errors::ReportError;
use interpersona_core::profile::{NormalizedProfile, TraitVector};

/// Map a raw age linearly from the configured raw range onto the target range.
pub fn interpolate_age(age: f64, scale: &AgeScale) -> Result<f64, ReportError> {
    let span = scale.raw_max - scale.raw_min;
    if !span.is_normal() {
        return Err(ReportError::config(format!(
            "age range {}..{} is empty",
            scale.raw_min, scale.raw_max
        )));
    }
    Ok(scale.scaled_min + ((age - scale.raw_min) / span) * (scale.scaled_max - scale.scaled_min))
}

/// Trait scores plus numeric age and gender, ready for projection.
pub fn normalize(traits: &TraitVector, scale: &AgeScale) -> Result<NormalizedProfile, ReportError> {
    Ok(NormalizedProfile {
        scores: traits.scores,
        age: interpolate_age(traits.age, scale)?,
        gender: traits.gender.numeric(),
    })
}
