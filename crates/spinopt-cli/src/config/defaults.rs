use spinopt::engine::config::OptimizerKind;

pub struct DefaultsConfig {
    pub input_directory: String,
    pub output_directory: String,
    pub optimizers: Vec<OptimizerKind>,
    pub learning_rate: f64,
    pub steps: usize,
    pub parallel: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input_directory: ".".to_string(),
            output_directory: "data".to_string(),
            optimizers: OptimizerKind::ALL.to_vec(),
            learning_rate: 0.1,
            steps: 500,
            parallel: false,
        }
    }
}
