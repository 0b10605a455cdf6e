use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown optimizer '{0}'. Expected one of: adam, sgd, lbfgs")]
    UnknownOptimizer(String),

    #[error("Learning rate must be a positive finite number, got {0}")]
    InvalidLearningRate(f64),

    #[error("Step count must be at least 1")]
    InvalidSteps,
}

/// The update rule applied to the working variable at every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerKind {
    /// Adaptive per-coordinate steps with first and second moment estimates.
    Adam,
    /// Fixed-size steps along the negative gradient.
    Sgd,
    /// Limited-memory BFGS with an internal line search.
    Lbfgs,
}

impl OptimizerKind {
    /// The order in which a full comparison runs the optimizers.
    pub const ALL: [OptimizerKind; 3] = [OptimizerKind::Adam, OptimizerKind::Sgd, OptimizerKind::Lbfgs];

    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Adam => "adam",
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Lbfgs => "lbfgs",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adam" | "momentum-adaptive" => Ok(OptimizerKind::Adam),
            "sgd" | "plain-gradient" | "gradient-descent" => Ok(OptimizerKind::Sgd),
            "lbfgs" | "l-bfgs" | "quasi-newton" => Ok(OptimizerKind::Lbfgs),
            _ => Err(ConfigError::UnknownOptimizer(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationConfig {
    /// Identifier of the simulation the data came from; used to name exported tables.
    pub run_id: String,
    pub optimizer: OptimizerKind,
    pub learning_rate: f64,
    /// Number of outer optimizer steps. The run always performs exactly this many.
    pub steps: usize,
}

impl MinimizationConfig {
    /// Same settings with a different update rule.
    pub fn with_optimizer(&self, optimizer: OptimizerKind) -> Self {
        Self {
            optimizer,
            ..self.clone()
        }
    }
}

#[derive(Default)]
pub struct MinimizationConfigBuilder {
    run_id: Option<String>,
    optimizer: Option<String>,
    learning_rate: Option<f64>,
    steps: Option<usize>,
}

impl MinimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
    pub fn optimizer(mut self, kind: OptimizerKind) -> Self {
        self.optimizer = Some(kind.name().to_string());
        self
    }
    /// Selects the update rule by name; unknown names are rejected by [`build`](Self::build).
    pub fn optimizer_name(mut self, name: impl Into<String>) -> Self {
        self.optimizer = Some(name.into());
        self
    }
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = Some(learning_rate);
        self
    }
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn build(self) -> Result<MinimizationConfig, ConfigError> {
        let optimizer = self
            .optimizer
            .ok_or(ConfigError::MissingParameter("optimizer"))?
            .parse::<OptimizerKind>()?;
        let learning_rate = self
            .learning_rate
            .ok_or(ConfigError::MissingParameter("learning_rate"))?;
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(ConfigError::InvalidLearningRate(learning_rate));
        }
        let steps = self.steps.ok_or(ConfigError::MissingParameter("steps"))?;
        if steps == 0 {
            return Err(ConfigError::InvalidSteps);
        }
        Ok(MinimizationConfig {
            run_id: self.run_id.ok_or(ConfigError::MissingParameter("run_id"))?,
            optimizer,
            learning_rate,
            steps,
        })
    }
}
