use super::{EvaluateFn, UpdateRule, axpy};
use crate::engine::error::EngineError;
use crate::engine::objective::Evaluation;
use nalgebra::Vector3;

/// Plain gradient descent: `x ← x − lr·g`.
#[derive(Debug, Clone)]
pub struct Sgd {
    learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }
}

impl UpdateRule for Sgd {
    fn name(&self) -> &'static str {
        "sgd"
    }

    fn step(
        &mut self,
        params: &mut [Vector3<f64>],
        current: &Evaluation,
        _evaluate: &mut EvaluateFn<'_>,
    ) -> Result<(), EngineError> {
        axpy(-self.learning_rate, &current.gradient, params);
        Ok(())
    }
}
