use crate::cli::MinimizeArgs;
use crate::config::{build_config, AppConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::{message_callback, CliProgressHandler};
use spinopt::{
    core::io::{tables, uppasd::UppasdDataset},
    engine::{config::OptimizerKind, progress::ProgressReporter},
    workflows::minimize::{self, MinimizationResult},
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub fn run(args: MinimizeArgs) -> Result<()> {
    info!("Building run configuration...");
    let config = build_config(&args)?;

    info!(
        "Loading UppASD run '{}' from {:?}",
        config.input.run.simid, config.input.run.directory
    );
    let dataset = config.input.run.load(config.input.n_atoms)?;
    println!(
        "Loaded {} spins (final of {} snapshots) with {} exchange, {} DMI and {} anisotropy terms.",
        dataset.spins.len(),
        dataset.num_snapshots,
        dataset.store.exchange().len(),
        dataset.store.dmi().len(),
        dataset.store.anisotropy().len()
    );

    std::fs::create_dir_all(&config.output_dir).map_err(|e| CliError::Output {
        path: config.output_dir.clone(),
        source: e.into(),
    })?;

    if config.parallel && config.optimizers.len() > 1 {
        run_parallel(&config, &dataset)
    } else {
        run_sequential(&config, &dataset)
    }
}

fn run_sequential(config: &AppConfig, dataset: &UppasdDataset) -> Result<()> {
    for &kind in &config.optimizers {
        println!("Running optimizer: {}", kind);
        let progress_handler = CliProgressHandler::new();
        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        let result = minimize::run(
            &dataset.spins,
            &dataset.store,
            &config.core_config.with_optimizer(kind),
            &reporter,
        )?;
        write_outputs(config, &result)?;
    }
    Ok(())
}

fn run_parallel(config: &AppConfig, dataset: &UppasdDataset) -> Result<()> {
    println!(
        "Running {} optimizers concurrently: {}",
        config.optimizers.len(),
        optimizer_list(&config.optimizers)
    );
    let reporter = ProgressReporter::with_callback(message_callback());
    let results = minimize::run_all(
        &dataset.spins,
        &dataset.store,
        &config.core_config,
        &config.optimizers,
        &reporter,
    );

    let mut first_failure = None;
    for (kind, outcome) in config.optimizers.iter().zip(results) {
        match outcome {
            Ok(result) => write_outputs(config, &result)?,
            Err(e) => {
                error!("Optimizer {} failed: {}", kind, e);
                eprintln!("Optimizer {} failed: {}", kind, e);
                first_failure.get_or_insert(e);
            }
        }
    }

    match first_failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn write_outputs(config: &AppConfig, result: &MinimizationResult) -> Result<()> {
    let simid = &config.core_config.run_id;

    let log_path = energy_log_path(&config.output_dir, simid, result.optimizer);
    info!("Writing energy log to {:?}", &log_path);
    result
        .history
        .write_csv_to_path(&log_path)
        .map_err(|e| CliError::Output {
            path: log_path.clone(),
            source: e.into(),
        })?;

    let spins_path = spins_path(&config.output_dir, simid, result.optimizer);
    info!("Writing final spins to {:?}", &spins_path);
    tables::write_spins_to_path(&result.spins, &spins_path).map_err(|e| CliError::Output {
        path: spins_path.clone(),
        source: e.into(),
    })?;

    println!(
        "Finished {} in {:.2} seconds",
        result.optimizer,
        result.elapsed.as_secs_f64()
    );
    println!(
        "  Energy: {:.6} -> {:.6} (Heis: {:.6} | DMI: {:.6} | Aniso: {:.6}), {} evaluations",
        result.initial_energy.total(),
        result.final_energy.total(),
        result.final_energy.heisenberg,
        result.final_energy.dmi,
        result.final_energy.anisotropy,
        result.evaluations
    );
    println!("  ✓ Energy log written to: {}", log_path.display());
    println!("  ✓ Final spins written to: {}", spins_path.display());
    Ok(())
}

fn optimizer_list(kinds: &[OptimizerKind]) -> String {
    kinds
        .iter()
        .map(OptimizerKind::name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn energy_log_path(dir: &Path, simid: &str, kind: OptimizerKind) -> PathBuf {
    dir.join(format!("energy_log_{}_{}.csv", simid, kind))
}

pub fn spins_path(dir: &Path, simid: &str, kind: OptimizerKind) -> PathBuf {
    dir.join(format!("spins_{}_{}.csv", simid, kind))
}
