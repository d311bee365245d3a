use interpersona_core::errors::ReportError;
use interpersona_core::types::UnitFloat;
use statrs::distribution::{ContinuousCDF, Normal};

/// Normal CDF of `predicted` under the cluster's mean and stdev.
pub fn percentile(predicted: f64, mean: f64, stdev: f64) -> Result<UnitFloat, ReportError> {
    if !(stdev.is_finite() && stdev > 0.0) {
        return Err(ReportError::config(format!(
            "cluster stdev must be positive, got {stdev}"
        )));
    }
    let dist = Normal::new(mean, stdev)
        .map_err(|e| ReportError::config(format!("bad cluster distribution: {e}")))?;
    Ok(UnitFloat::saturating(dist.cdf(predicted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mean_maps_to_half() {
        assert!((percentile(0.0, 0.0, 1.0).unwrap().value() - 0.5).abs() < 1e-15);
        assert!((percentile(3.0, 3.0, 0.2).unwrap().value() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn matches_reference_values() {
        // Phi(1) and Phi(-1.96)
        let p = percentile(1.0, 0.0, 1.0).unwrap().value();
        assert!((p - 0.841_344_746_068_542_9).abs() < 1e-9);
        let p = percentile(-1.96, 0.0, 1.0).unwrap().value();
        assert!((p - 0.024_997_895_148_220_435).abs() < 1e-9);
        // location/scale: z = (7 - 5) / 2 = 1
        let p = percentile(7.0, 5.0, 2.0).unwrap().value();
        assert!((p - 0.841_344_746_068_542_9).abs() < 1e-9);
    }

    #[test]
    fn non_positive_stdev_is_configuration_error() {
        for s in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                percentile(0.0, 0.0, s),
                Err(ReportError::Configuration(_))
            ));
        }
    }

    proptest! {
        #[test]
        fn percentile_stays_in_unit_interval(
            x in -1e6f64..1e6,
            mean in -100f64..100.0,
            stdev in 1e-3f64..100.0,
        ) {
            let p = percentile(x, mean, stdev).unwrap().value();
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
