use super::{EvaluateFn, UpdateRule};
use crate::engine::error::EngineError;
use crate::engine::objective::Evaluation;
use nalgebra::Vector3;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Adam with bias-corrected first and second moment estimates.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    first_moment: Vec<Vector3<f64>>,
    second_moment: Vec<Vector3<f64>>,
    iteration: i32,
}

impl Adam {
    pub fn new(learning_rate: f64, num_sites: usize) -> Self {
        Self {
            learning_rate,
            first_moment: vec![Vector3::zeros(); num_sites],
            second_moment: vec![Vector3::zeros(); num_sites],
            iteration: 0,
        }
    }
}

impl UpdateRule for Adam {
    fn name(&self) -> &'static str {
        "adam"
    }

    fn step(
        &mut self,
        params: &mut [Vector3<f64>],
        current: &Evaluation,
        _evaluate: &mut EvaluateFn<'_>,
    ) -> Result<(), EngineError> {
        if self.first_moment.len() != params.len() {
            self.first_moment = vec![Vector3::zeros(); params.len()];
            self.second_moment = vec![Vector3::zeros(); params.len()];
            self.iteration = 0;
        }

        self.iteration += 1;
        let bias1 = 1.0 - BETA1.powi(self.iteration);
        let bias2 = 1.0 - BETA2.powi(self.iteration);

        for (((x, g), m), v) in params
            .iter_mut()
            .zip(&current.gradient)
            .zip(&mut self.first_moment)
            .zip(&mut self.second_moment)
        {
            for k in 0..3 {
                m[k] = BETA1 * m[k] + (1.0 - BETA1) * g[k];
                v[k] = BETA2 * v[k] + (1.0 - BETA2) * g[k] * g[k];
                let m_hat = m[k] / bias1;
                let v_hat = v[k] / bias2;
                x[k] -= self.learning_rate * m_hat / (v_hat.sqrt() + EPSILON);
            }
        }
        Ok(())
    }
}
