use crate::core::hamiltonian::evaluator::{Hamiltonian, HamiltonianError};
use crate::core::hamiltonian::term::EnergyBreakdown;
use crate::core::models::spins::{project, pull_back_gradient};
use nalgebra::Vector3;

/// Energy of the projected configuration together with the gradient of its total
/// with respect to the unprojected working variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub energy: EnergyBreakdown,
    pub gradient: Vec<Vector3<f64>>,
}

impl Evaluation {
    #[inline]
    pub fn total(&self) -> f64 {
        self.energy.total()
    }

    /// Largest absolute gradient component.
    pub fn max_abs_gradient(&self) -> f64 {
        self.gradient.iter().map(|g| g.amax()).fold(0.0, f64::max)
    }
}

/// The function the optimizers minimize: `x ↦ E(project(x))`.
///
/// Every evaluation, including those made inside a line search, goes through
/// [`evaluate`](Self::evaluate), which also keeps a running count.
#[derive(Debug)]
pub struct Objective<'a> {
    hamiltonian: Hamiltonian<'a>,
    evaluations: usize,
}

impl<'a> Objective<'a> {
    pub fn new(hamiltonian: Hamiltonian<'a>) -> Self {
        Self {
            hamiltonian,
            evaluations: 0,
        }
    }

    /// Number of evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn evaluate(&mut self, x: &[Vector3<f64>]) -> Result<Evaluation, HamiltonianError> {
        let spins: Vec<Vector3<f64>> = x.iter().map(project).collect();
        let (energy, spin_gradient) = self.hamiltonian.energy_and_gradient(&spins)?;
        let gradient = x
            .iter()
            .zip(&spin_gradient)
            .map(|(xi, gi)| pull_back_gradient(xi, gi))
            .collect();
        self.evaluations += 1;
        Ok(Evaluation { energy, gradient })
    }
}
