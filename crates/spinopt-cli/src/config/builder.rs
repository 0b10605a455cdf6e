use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileInputConfig};
use super::models::{AppConfig, InputConfig};
use crate::cli::{DatasetArgs, InspectArgs, MinimizeArgs};
use crate::error::{CliError, Result};
use spinopt::core::io::uppasd::UppasdRun;
use spinopt::engine::config::{MinimizationConfigBuilder, OptimizerKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn build_config(args: &MinimizeArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = load_file_config(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let input = merge_input(&args.dataset, file_config.input.take(), &defaults)?;

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| file_config.output.take().and_then(|o| o.directory))
        .unwrap_or_else(|| PathBuf::from(&defaults.output_directory));

    let opt_file = file_config.optimization.take().unwrap_or_default();

    let optimizers = if !args.optimizers.is_empty() {
        parse_optimizers(&args.optimizers)?
    } else if let Some(names) = &opt_file.optimizers {
        parse_optimizers(names)?
    } else {
        defaults.optimizers.clone()
    };
    let first = optimizers
        .first()
        .copied()
        .ok_or_else(|| CliError::Config("At least one optimizer must be selected.".to_string()))?;

    let learning_rate = args
        .learning_rate
        .or(opt_file.learning_rate)
        .unwrap_or(defaults.learning_rate);
    let steps = args.steps.or(opt_file.steps).unwrap_or(defaults.steps);
    let parallel = args.parallel || opt_file.parallel.unwrap_or(defaults.parallel);

    let core_config = MinimizationConfigBuilder::new()
        .run_id(input.run.simid.clone())
        .optimizer(first)
        .learning_rate(learning_rate)
        .steps(steps)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        input,
        output_dir,
        optimizers,
        parallel,
        core_config,
    })
}

pub fn build_input_config(args: &InspectArgs) -> Result<InputConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = load_file_config(args.config.as_deref())?;
    merge_input(&args.dataset, file_config.input, &defaults)
}

fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::from_file(path),
        None => Ok(FileConfig::default()),
    }
}

fn merge_input(
    args: &DatasetArgs,
    file_val: Option<FileInputConfig>,
    defaults: &DefaultsConfig,
) -> Result<InputConfig> {
    let file_val = file_val.unwrap_or_default();
    let simid = args.simid.clone().or(file_val.simid).ok_or_else(|| {
        CliError::Config(
            "A simulation id is required either in the config file (`input.simid`) or via --simid."
                .to_string(),
        )
    })?;
    let directory = args
        .input_dir
        .clone()
        .or(file_val.directory)
        .unwrap_or_else(|| PathBuf::from(&defaults.input_directory));
    let n_atoms = args.n_atoms.or(file_val.n_atoms);
    if n_atoms == Some(0) {
        return Err(CliError::Config("`n-atoms` must be at least 1.".to_string()));
    }

    Ok(InputConfig {
        run: UppasdRun::new(directory, simid),
        n_atoms,
    })
}

fn parse_optimizers(names: &[String]) -> Result<Vec<OptimizerKind>> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind = OptimizerKind::from_str(name).map_err(|e| CliError::Config(e.to_string()))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "input.simid" => {
                config.input.get_or_insert_with(Default::default).simid = Some(value_str.to_string());
            }
            "input.directory" => {
                config.input.get_or_insert_with(Default::default).directory =
                    Some(PathBuf::from(value_str));
            }
            "input.n-atoms" => {
                config.input.get_or_insert_with(Default::default).n_atoms =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "output.directory" => {
                config.output.get_or_insert_with(Default::default).directory =
                    Some(PathBuf::from(value_str));
            }
            "optimization.optimizers" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .optimizers = Some(
                    value_str
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            "optimization.learning-rate" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .learning_rate = Some(parse_value(key, value_str, "float")?);
            }
            "optimization.steps" => {
                config.optimization.get_or_insert_with(Default::default).steps =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "optimization.parallel" => {
                config.optimization.get_or_insert_with(Default::default).parallel =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn base_minimize_args() -> MinimizeArgs {
        MinimizeArgs {
            config: None,
            dataset: DatasetArgs {
                simid: Some("bccfe001".to_string()),
                input_dir: None,
                n_atoms: None,
            },
            output_dir: None,
            optimizers: vec![],
            learning_rate: None,
            steps: None,
            parallel: false,
            set_values: vec![],
        }
    }

    #[test]
    fn build_config_uses_defaults_for_everything_but_simid() {
        let app = build_config(&base_minimize_args()).expect("build ok");
        let defaults = DefaultsConfig::default();

        assert_eq!(app.input.run.simid, "bccfe001");
        assert_eq!(app.input.run.directory, PathBuf::from(defaults.input_directory));
        assert_eq!(app.input.n_atoms, None);
        assert_eq!(app.output_dir, PathBuf::from(defaults.output_directory));
        assert_eq!(app.optimizers, OptimizerKind::ALL.to_vec());
        assert!(!app.parallel);
        assert_eq!(app.core_config.learning_rate, 0.1);
        assert_eq!(app.core_config.steps, 500);
        assert_eq!(app.core_config.run_id, "bccfe001");
        assert_eq!(app.core_config.optimizer, OptimizerKind::Adam);
    }

    #[test]
    fn build_config_reads_file_and_merges() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        fs::write(
            &cfg_path,
            r#"
            [input]
            simid = "fromfile"
            directory = "runs/fe"
            n-atoms = 4

            [output]
            directory = "results"

            [optimization]
            optimizers = ["lbfgs", "SGD"]
            learning-rate = 0.02
            steps = 250
            parallel = true
            "#,
        )
        .unwrap();

        let mut args = base_minimize_args();
        args.dataset.simid = None;
        args.config = Some(cfg_path);

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.input.run.simid, "fromfile");
        assert_eq!(app.input.run.directory, PathBuf::from("runs/fe"));
        assert_eq!(app.input.n_atoms, Some(4));
        assert_eq!(app.output_dir, PathBuf::from("results"));
        assert_eq!(app.optimizers, vec![OptimizerKind::Lbfgs, OptimizerKind::Sgd]);
        assert!(app.parallel);
        assert_eq!(app.core_config.learning_rate, 0.02);
        assert_eq!(app.core_config.steps, 250);
        assert_eq!(app.core_config.optimizer, OptimizerKind::Lbfgs);
    }

    #[test]
    fn precedence_is_cli_then_set_then_file_then_default() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("config.toml");
        fs::write(
            &cfg_path,
            r#"
            [optimization]
            learning-rate = 0.5
            steps = 10
            optimizers = ["sgd"]
            "#,
        )
        .unwrap();

        let mut args = base_minimize_args();
        args.config = Some(cfg_path);
        args.set_values = vec![
            "optimization.learning-rate=0.25".to_string(),
            "optimization.steps=20".to_string(),
        ];
        args.steps = Some(30);

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.core_config.steps, 30);
        assert!((app.core_config.learning_rate - 0.25).abs() < 1e-12);
        assert_eq!(app.optimizers, vec![OptimizerKind::Sgd]);
    }

    #[test]
    fn set_values_cover_every_section() {
        let mut args = base_minimize_args();
        args.set_values = vec![
            "input.simid=override".to_string(),
            "input.directory=elsewhere".to_string(),
            "input.n-atoms=16".to_string(),
            "output.directory=out".to_string(),
            "optimization.optimizers=adam, lbfgs".to_string(),
            "optimization.parallel=true".to_string(),
        ];
        args.dataset.simid = None;

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.input.run.simid, "override");
        assert_eq!(app.input.run.directory, PathBuf::from("elsewhere"));
        assert_eq!(app.input.n_atoms, Some(16));
        assert_eq!(app.output_dir, PathBuf::from("out"));
        assert_eq!(app.optimizers, vec![OptimizerKind::Adam, OptimizerKind::Lbfgs]);
        assert!(app.parallel);
    }

    #[test]
    fn cli_optimizer_names_are_deduplicated_in_order() {
        let mut args = base_minimize_args();
        args.optimizers = vec!["SGD".to_string(), "quasi-newton".to_string(), "sgd".to_string()];
        let app = build_config(&args).expect("build ok");
        assert_eq!(app.optimizers, vec![OptimizerKind::Sgd, OptimizerKind::Lbfgs]);
    }

    #[test]
    fn unknown_optimizer_is_a_configuration_error() {
        let mut args = base_minimize_args();
        args.optimizers = vec!["newton".to_string()];
        let result = build_config(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("newton")));
    }

    #[test]
    fn invalid_learning_rate_and_steps_are_rejected() {
        let mut args = base_minimize_args();
        args.learning_rate = Some(-1.0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_minimize_args();
        args.steps = Some(0);
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn missing_simid_is_reported() {
        let mut args = base_minimize_args();
        args.dataset.simid = None;
        let result = build_config(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("simid")));
    }

    #[test]
    fn malformed_and_unknown_set_values_are_rejected() {
        let mut args = base_minimize_args();
        args.set_values = vec!["optimization.steps".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        let mut args = base_minimize_args();
        args.set_values = vec!["optimization.momentum=0.9".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(msg)) if msg.contains("Unsupported")));

        let mut args = base_minimize_args();
        args.set_values = vec!["optimization.steps=many".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(msg)) if msg.contains("integer")));
    }

    #[test]
    fn unreadable_config_file_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("bad.toml");
        fs::write(&cfg_path, "[optimization]\nsteps = \"ten\"\n").unwrap();
        let mut args = base_minimize_args();
        args.config = Some(cfg_path.clone());
        match build_config(&args) {
            Err(CliError::FileParsing { path, .. }) => assert_eq!(path, cfg_path),
            other => panic!("expected a parsing error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn inspect_config_only_needs_input_settings() {
        let args = InspectArgs {
            config: None,
            dataset: DatasetArgs {
                simid: Some("abc".to_string()),
                input_dir: Some(PathBuf::from("runs")),
                n_atoms: Some(3),
            },
        };
        let input = build_input_config(&args).unwrap();
        assert_eq!(input.run.jfile_path(), PathBuf::from("runs").join("jfile"));
        assert_eq!(input.run.moment_path(), PathBuf::from("runs").join("moment.abc.out"));
        assert_eq!(input.n_atoms, Some(3));
    }
}
