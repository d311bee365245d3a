use interpersona_core::profile::NormalizedProfile;
use interpersona_core::reference::clusters::ClusterModel;

/// Linear cluster score: facets (and demographics when the model has them)
/// dotted with the coefficients left to right, intercept added last.
pub fn predict(profile: &NormalizedProfile, cluster: &ClusterModel) -> f64 {
    let coefs = &cluster.coefficients;
    let mut sum = 0.0;
    for (x, c) in profile.inputs(coefs.uses_demographics()).zip(coefs.iter()) {
        sum += x * c;
    }
    sum + cluster.intercept
}
