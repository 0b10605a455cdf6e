use nalgebra::Vector3;
use rand::Rng;
use std::f64::consts::PI;
use std::ops::Index;

/// Lower bound on the norm used when projecting a spin onto the unit sphere.
///
/// A zero vector is therefore mapped to the zero vector instead of producing NaNs. This is
/// a silent approximation: such a spin does not lie on the sphere after projection.
pub const NORM_FLOOR: f64 = 1e-10;

/// Projects a single vector onto the unit sphere, flooring its norm at [`NORM_FLOOR`].
#[inline]
pub fn project(v: &Vector3<f64>) -> Vector3<f64> {
    v / v.norm().max(NORM_FLOOR)
}

/// Pulls a gradient taken with respect to the projected spin `project(x)` back to the
/// unprojected vector `x`.
///
/// For `s = x / |x|` the Jacobian is `(I - s sᵀ) / |x|`, so only the tangential part of
/// `grad` survives. Inside the floored region the projection is the linear map
/// `x / NORM_FLOOR` and the gradient is scaled accordingly.
#[inline]
pub fn pull_back_gradient(x: &Vector3<f64>, grad: &Vector3<f64>) -> Vector3<f64> {
    let norm = x.norm();
    if norm <= NORM_FLOOR {
        return grad / NORM_FLOOR;
    }
    let s = x / norm;
    (grad - s * s.dot(grad)) / norm
}

/// An ordered set of classical spins, one 3-vector per lattice site.
///
/// Site `i` of the configuration corresponds to atom id `i` of the
/// [`InteractionStore`](super::interactions::InteractionStore). The vectors are only
/// guaranteed to be unit length after [`project`](Self::projected) has been applied; the
/// optimizers work on the unprojected variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpinConfiguration {
    spins: Vec<Vector3<f64>>,
}

impl SpinConfiguration {
    pub fn new(spins: Vec<Vector3<f64>>) -> Self {
        Self { spins }
    }

    pub fn from_rows(rows: &[[f64; 3]]) -> Self {
        Self {
            spins: rows.iter().map(|r| Vector3::new(r[0], r[1], r[2])).collect(),
        }
    }

    /// All spins pointing along `direction` (normalized).
    pub fn uniform(num_sites: usize, direction: Vector3<f64>) -> Self {
        let unit = project(&direction);
        Self {
            spins: vec![unit; num_sites],
        }
    }

    /// Spins drawn uniformly from the unit sphere.
    pub fn random<R: Rng + ?Sized>(num_sites: usize, rng: &mut R) -> Self {
        let spins = (0..num_sites)
            .map(|_| {
                let z: f64 = rng.gen_range(-1.0..=1.0);
                let phi: f64 = rng.gen_range(0.0..2.0 * PI);
                let rho = (1.0 - z * z).max(0.0).sqrt();
                Vector3::new(rho * phi.cos(), rho * phi.sin(), z)
            })
            .collect();
        Self { spins }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vector3<f64>] {
        &self.spins
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.spins.iter()
    }

    pub fn into_inner(self) -> Vec<Vector3<f64>> {
        self.spins
    }

    /// Returns a copy with every spin projected onto the unit sphere.
    pub fn projected(&self) -> Self {
        Self {
            spins: self.spins.iter().map(project).collect(),
        }
    }

    /// Average moment per site. Zero for an empty configuration.
    pub fn magnetization(&self) -> Vector3<f64> {
        if self.spins.is_empty() {
            return Vector3::zeros();
        }
        self.spins.iter().sum::<Vector3<f64>>() / self.spins.len() as f64
    }

    /// Largest deviation of any spin norm from one.
    pub fn max_norm_deviation(&self) -> f64 {
        self.spins
            .iter()
            .map(|s| (s.norm() - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

impl Index<usize> for SpinConfiguration {
    type Output = Vector3<f64>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.spins[index]
    }
}

impl From<Vec<Vector3<f64>>> for SpinConfiguration {
    fn from(spins: Vec<Vector3<f64>>) -> Self {
        Self::new(spins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn project_returns_unit_vector() {
        let v = project(&Vector3::new(3.0, 0.0, 4.0));
        assert!((v - Vector3::new(0.6, 0.0, 0.8)).norm() < TOLERANCE);
    }

    #[test]
    fn project_maps_zero_vector_to_zero_without_nan() {
        let v = project(&Vector3::zeros());
        assert_eq!(v, Vector3::zeros());
        assert!(v.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn projection_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = SpinConfiguration::random(64, &mut rng);
        let once = config.projected();
        let twice = once.projected();
        for (a, b) in once.iter().zip(twice.iter()) {
            assert!((a - b).norm() < TOLERANCE);
        }
    }

    #[test]
    fn projected_configuration_has_unit_norms() {
        let config = SpinConfiguration::from_rows(&[[2.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, -0.5, 0.0]]);
        assert!(config.projected().max_norm_deviation() < TOLERANCE);
    }

    #[test]
    fn random_configuration_lies_on_sphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = SpinConfiguration::random(100, &mut rng);
        assert_eq!(config.len(), 100);
        assert!(config.max_norm_deviation() < 1e-12);
    }

    #[test]
    fn pull_back_gradient_removes_radial_component() {
        let x = Vector3::new(0.0, 0.0, 2.0);
        let g = Vector3::new(1.0, 2.0, 5.0);
        let pulled = pull_back_gradient(&x, &g);
        assert!((pulled - Vector3::new(0.5, 1.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn pull_back_gradient_matches_finite_differences() {
        let x = Vector3::new(0.3, -1.2, 0.7);
        let g = Vector3::new(-0.4, 0.9, 1.5);
        // f(x) = g · project(x)
        let f = |v: Vector3<f64>| g.dot(&project(&v));
        let analytic = pull_back_gradient(&x, &g);
        let h = 1e-6;
        for k in 0..3 {
            let mut plus = x;
            let mut minus = x;
            plus[k] += h;
            minus[k] -= h;
            let numeric = (f(plus) - f(minus)) / (2.0 * h);
            assert!((numeric - analytic[k]).abs() < 1e-8);
        }
    }

    #[test]
    fn magnetization_averages_spins() {
        let config = SpinConfiguration::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!((config.magnetization() - Vector3::new(0.5, 0.5, 0.0)).norm() < TOLERANCE);
        assert_eq!(SpinConfiguration::default().magnetization(), Vector3::zeros());
    }

    #[test]
    fn uniform_configuration_is_normalized() {
        let config = SpinConfiguration::uniform(3, Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(config.len(), 3);
        assert_eq!(config[2], Vector3::new(0.0, 0.0, 1.0));
    }
}
