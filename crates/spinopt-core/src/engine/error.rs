use thiserror::Error;

use super::config::ConfigError;
use crate::core::hamiltonian::evaluator::HamiltonianError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Hamiltonian evaluation failed: {source}")]
    Hamiltonian {
        #[from]
        source: HamiltonianError,
    },

    #[error("Initial spin configuration is empty")]
    EmptyConfiguration,

    #[error("Energy became non-finite at step {step}")]
    NonFiniteEnergy { step: usize },
}
