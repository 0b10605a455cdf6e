use super::{EvaluateFn, UpdateRule, axpy, dot, max_abs};
use crate::engine::error::EngineError;
use crate::engine::objective::Evaluation;
use nalgebra::Vector3;
use std::collections::VecDeque;
use tracing::trace;

/// Inner iterations per outer step.
pub const MAX_ITER: usize = 20;
/// Objective evaluations per outer step, counting the evaluation the step starts from.
pub const MAX_EVAL: usize = 25;
pub const HISTORY_SIZE: usize = 100;
const TOLERANCE_GRAD: f64 = 1e-7;
const TOLERANCE_CHANGE: f64 = 1e-9;
const CURVATURE_THRESHOLD: f64 = 1e-10;
const ARMIJO_C1: f64 = 1e-4;
const BACKTRACK_FACTOR: f64 = 0.5;

/// Limited-memory BFGS.
///
/// Curvature pairs, the last search direction and the last accepted step length
/// persist between outer steps, so consecutive calls continue one quasi-Newton run.
/// Each inner iteration computes a two-loop-recursion direction and backtracks from
/// the learning rate until the Armijo condition holds. When the evaluation budget runs
/// out mid line search the last trial point is kept.
#[derive(Debug, Clone)]
pub struct Lbfgs {
    learning_rate: f64,
    iterations: usize,
    direction: Vec<Vector3<f64>>,
    step_length: f64,
    prev_gradient: Vec<Vector3<f64>>,
    steps: VecDeque<Vec<Vector3<f64>>>,
    gradient_changes: VecDeque<Vec<Vector3<f64>>>,
    rho: VecDeque<f64>,
    hessian_diag: f64,
}

impl Lbfgs {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            iterations: 0,
            direction: Vec::new(),
            step_length: 0.0,
            prev_gradient: Vec::new(),
            steps: VecDeque::new(),
            gradient_changes: VecDeque::new(),
            rho: VecDeque::new(),
            hessian_diag: 1.0,
        }
    }

    /// Number of curvature pairs currently stored.
    pub fn history_len(&self) -> usize {
        self.steps.len()
    }

    fn update_curvature(&mut self, gradient: &[Vector3<f64>]) {
        let y: Vec<Vector3<f64>> = gradient
            .iter()
            .zip(&self.prev_gradient)
            .map(|(g, p)| g - p)
            .collect();
        let s: Vec<Vector3<f64>> = self.direction.iter().map(|d| d * self.step_length).collect();
        let ys = dot(&y, &s);
        if ys > CURVATURE_THRESHOLD {
            if self.steps.len() == HISTORY_SIZE {
                self.steps.pop_front();
                self.gradient_changes.pop_front();
                self.rho.pop_front();
            }
            self.hessian_diag = ys / dot(&y, &y);
            self.steps.push_back(s);
            self.gradient_changes.push_back(y);
            self.rho.push_back(1.0 / ys);
        }
    }

    fn two_loop_direction(&self, gradient: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        let k = self.steps.len();
        let mut alpha = vec![0.0; k];
        let mut q: Vec<Vector3<f64>> = gradient.iter().map(|g| -g).collect();

        for i in (0..k).rev() {
            alpha[i] = dot(&self.steps[i], &q) * self.rho[i];
            axpy(-alpha[i], &self.gradient_changes[i], &mut q);
        }

        let mut r: Vec<Vector3<f64>> = q.iter().map(|v| v * self.hessian_diag).collect();
        for i in 0..k {
            let beta = dot(&self.gradient_changes[i], &r) * self.rho[i];
            axpy(alpha[i] - beta, &self.steps[i], &mut r);
        }
        r
    }
}

impl UpdateRule for Lbfgs {
    fn name(&self) -> &'static str {
        "lbfgs"
    }

    fn step(
        &mut self,
        params: &mut [Vector3<f64>],
        current: &Evaluation,
        evaluate: &mut EvaluateFn<'_>,
    ) -> Result<(), EngineError> {
        let mut loss = current.total();
        let mut gradient = current.gradient.clone();
        if max_abs(&gradient) <= TOLERANCE_GRAD {
            return Ok(());
        }

        let mut evaluations = 1;
        let mut inner = 0;

        loop {
            inner += 1;
            self.iterations += 1;

            if self.iterations == 1 {
                self.direction = gradient.iter().map(|g| -g).collect();
                self.steps.clear();
                self.gradient_changes.clear();
                self.rho.clear();
                self.hessian_diag = 1.0;
            } else {
                self.update_curvature(&gradient);
                self.direction = self.two_loop_direction(&gradient);
            }

            self.prev_gradient.clone_from(&gradient);
            let prev_loss = loss;

            let mut t = if self.iterations == 1 {
                let l1: f64 = gradient.iter().map(|g| g.abs().sum()).sum();
                (1.0 / l1).min(1.0) * self.learning_rate
            } else {
                self.learning_rate
            };

            let directional_derivative = dot(&gradient, &self.direction);
            if directional_derivative > -TOLERANCE_CHANGE {
                break;
            }

            let origin = params.to_vec();
            loop {
                for ((x, x0), d) in params.iter_mut().zip(&origin).zip(&self.direction) {
                    *x = x0 + d * t;
                }
                let trial = evaluate(params)?;
                evaluations += 1;

                let sufficient = trial.total() <= loss + ARMIJO_C1 * t * directional_derivative;
                if sufficient || evaluations >= MAX_EVAL {
                    loss = trial.total();
                    gradient = trial.gradient;
                    break;
                }
                t *= BACKTRACK_FACTOR;
            }
            self.step_length = t;

            trace!(inner, evaluations, loss, step_length = t, "L-BFGS inner iteration");

            if inner == MAX_ITER || evaluations >= MAX_EVAL {
                break;
            }
            if max_abs(&gradient) <= TOLERANCE_GRAD {
                break;
            }
            if max_abs(&self.direction) * t <= TOLERANCE_CHANGE {
                break;
            }
            if (loss - prev_loss).abs() < TOLERANCE_CHANGE {
                break;
            }
        }
        Ok(())
    }
}
