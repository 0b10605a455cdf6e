//! Run configuration assembled from built-in defaults, an optional TOML file, `--set`
//! overrides and command-line arguments, in increasing order of precedence.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::{build_config, build_input_config};
pub use models::AppConfig;
