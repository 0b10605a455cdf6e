use spinopt::core::io::uppasd::UppasdRun;
use spinopt::engine::config::{MinimizationConfig, OptimizerKind};
use std::path::PathBuf;

/// Location of the input data and the atom count override.
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub run: UppasdRun,
    pub n_atoms: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output_dir: PathBuf,
    pub optimizers: Vec<OptimizerKind>,
    pub parallel: bool,
    /// Shared settings; the optimizer field holds the first selected optimizer.
    pub core_config: MinimizationConfig,
}
