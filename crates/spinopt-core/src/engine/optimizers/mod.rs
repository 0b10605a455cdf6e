//! Update rules that advance the unprojected spin variable.
//!
//! Every rule receives the evaluation at the current point and an evaluation callback.
//! Rules that need extra function values (the quasi-Newton line search) call it as often
//! as they need; the others never do.

pub mod adam;
pub mod lbfgs;
pub mod sgd;

use super::config::OptimizerKind;
use super::error::EngineError;
use super::objective::Evaluation;
use nalgebra::Vector3;

/// Evaluates the objective at an arbitrary point of the working variable.
pub type EvaluateFn<'f> = dyn FnMut(&[Vector3<f64>]) -> Result<Evaluation, EngineError> + 'f;

pub trait UpdateRule {
    fn name(&self) -> &'static str;

    /// Performs one outer step, moving `params` in place.
    fn step(
        &mut self,
        params: &mut [Vector3<f64>],
        current: &Evaluation,
        evaluate: &mut EvaluateFn<'_>,
    ) -> Result<(), EngineError>;
}

/// Creates a fresh update rule with no accumulated state.
pub fn create(kind: OptimizerKind, learning_rate: f64, num_sites: usize) -> Box<dyn UpdateRule> {
    match kind {
        OptimizerKind::Adam => Box::new(adam::Adam::new(learning_rate, num_sites)),
        OptimizerKind::Sgd => Box::new(sgd::Sgd::new(learning_rate)),
        OptimizerKind::Lbfgs => Box::new(lbfgs::Lbfgs::new(learning_rate)),
    }
}

#[inline]
pub(crate) fn dot(a: &[Vector3<f64>], b: &[Vector3<f64>]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x.dot(y)).sum()
}

/// `y += alpha * x`
#[inline]
pub(crate) fn axpy(alpha: f64, x: &[Vector3<f64>], y: &mut [Vector3<f64>]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += xi * alpha;
    }
}

#[inline]
pub(crate) fn max_abs(v: &[Vector3<f64>]) -> f64 {
    v.iter().map(|x| x.amax()).fold(0.0, f64::max)
}
