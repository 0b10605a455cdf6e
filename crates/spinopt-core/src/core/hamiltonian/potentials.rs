use nalgebra::Vector3;

/// `-J (si · sj)`
#[inline]
pub fn exchange(si: &Vector3<f64>, sj: &Vector3<f64>, coupling: f64) -> f64 {
    -coupling * si.dot(sj)
}

/// Gradients of [`exchange`] with respect to `si` and `sj`.
#[inline]
pub fn exchange_gradient(
    si: &Vector3<f64>,
    sj: &Vector3<f64>,
    coupling: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    (sj * -coupling, si * -coupling)
}

/// `-D · (si × sj)`
#[inline]
pub fn dmi(si: &Vector3<f64>, sj: &Vector3<f64>, d: &Vector3<f64>) -> f64 {
    -d.dot(&si.cross(sj))
}

/// Gradients of [`dmi`] with respect to `si` and `sj`.
///
/// Uses `D · (a × b) = a · (b × D) = b · (D × a)`.
#[inline]
pub fn dmi_gradient(
    si: &Vector3<f64>,
    sj: &Vector3<f64>,
    d: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    (-sj.cross(d), -d.cross(si))
}

/// `-K (s · n)²`
#[inline]
pub fn uniaxial_anisotropy(s: &Vector3<f64>, constant: f64, axis: &Vector3<f64>) -> f64 {
    let projection = s.dot(axis);
    -constant * projection * projection
}

#[inline]
pub fn uniaxial_anisotropy_gradient(
    s: &Vector3<f64>,
    constant: f64,
    axis: &Vector3<f64>,
) -> Vector3<f64> {
    axis * (-2.0 * constant * s.dot(axis))
}
