use crate::core::hamiltonian::evaluator::Hamiltonian;
use crate::core::hamiltonian::term::EnergyBreakdown;
use crate::core::models::interactions::InteractionStore;
use crate::core::models::spins::SpinConfiguration;
use crate::engine::config::{MinimizationConfig, OptimizerKind};
use crate::engine::error::EngineError;
use crate::engine::history::HistoryLog;
use crate::engine::objective::Objective;
use crate::engine::optimizers;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Vector3;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Steps between two status lines. Step 0 always reports.
pub const REPORT_INTERVAL: usize = 50;

/// Upper bound on the history entries reserved up front; longer runs grow the log.
const MAX_PREALLOCATED_STEPS: usize = 1 << 16;

#[derive(Debug, Clone)]
pub struct MinimizationResult {
    pub optimizer: OptimizerKind,
    /// Final configuration, every spin projected onto the unit sphere.
    pub spins: SpinConfiguration,
    pub history: HistoryLog,
    pub initial_energy: EnergyBreakdown,
    pub final_energy: EnergyBreakdown,
    /// Objective evaluations, including line-search trials.
    pub evaluations: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Minimizes the energy of `initial` under `store` for exactly `config.steps` steps.
///
/// The initial configuration is copied on entry and never modified. Each step applies the
/// update rule to the unprojected variable, then re-projects and re-evaluates; that
/// post-update evaluation is appended to the history and becomes the starting point of
/// the next step.
#[instrument(skip_all, name = "minimization_workflow", fields(run_id = %config.run_id, optimizer = %config.optimizer))]
pub fn run(
    initial: &SpinConfiguration,
    store: &InteractionStore,
    config: &MinimizationConfig,
    reporter: &ProgressReporter,
) -> Result<MinimizationResult, EngineError> {
    let start = Instant::now();
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    if initial.is_empty() {
        return Err(EngineError::EmptyConfiguration);
    }

    let hamiltonian = Hamiltonian::new(store, initial.len())?;
    let mut objective = Objective::new(hamiltonian);
    let mut params: Vec<Vector3<f64>> = initial.clone().into_inner();
    let mut rule = optimizers::create(config.optimizer, config.learning_rate, params.len());

    let mut current = objective.evaluate(&params)?;
    let initial_energy = current.energy;
    if !initial_energy.is_finite() {
        return Err(EngineError::NonFiniteEnergy { step: 0 });
    }
    info!(
        sites = params.len(),
        exchange = store.exchange().len(),
        dmi = store.dmi().len(),
        anisotropy = store.anisotropy().len(),
        initial_total = initial_energy.total(),
        "Starting minimization."
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Minimization",
    });
    reporter.report(Progress::RunStart {
        optimizer: config.optimizer,
        total_steps: config.steps as u64,
    });

    let mut history = new_history(config.steps);
    for step in 0..config.steps {
        {
            let mut evaluate = |x: &[Vector3<f64>]| objective.evaluate(x).map_err(EngineError::from);
            rule.step(&mut params, &current, &mut evaluate)?;
        }

        current = objective.evaluate(&params)?;
        if !current.energy.is_finite() {
            return Err(EngineError::NonFiniteEnergy { step });
        }
        history.push(&current.energy);

        if step % REPORT_INTERVAL == 0 {
            let line = status_line(rule.name(), step, &current.energy);
            info!("{}", line);
            reporter.report(Progress::Message(line));
        }
        reporter.step(step, &current.energy);
    }

    reporter.report(Progress::RunFinish);
    reporter.report(Progress::PhaseFinish);

    let final_energy = current.energy;
    let evaluations = objective.evaluations();
    debug!(evaluations, "Objective evaluation count.");
    info!(
        final_total = final_energy.total(),
        change = final_energy.total() - initial_energy.total(),
        "Minimization complete."
    );

    Ok(MinimizationResult {
        optimizer: config.optimizer,
        spins: SpinConfiguration::new(params).projected(),
        history,
        initial_energy,
        final_energy,
        evaluations,
        elapsed: start.elapsed(),
    })
}

/// Runs one minimization per optimizer on the rayon pool. Results come back in the order
/// of `optimizers`; each run starts from its own copy of `initial`.
pub fn run_all(
    initial: &SpinConfiguration,
    store: &InteractionStore,
    config: &MinimizationConfig,
    optimizers: &[OptimizerKind],
    reporter: &ProgressReporter,
) -> Vec<Result<MinimizationResult, EngineError>> {
    optimizers
        .par_iter()
        .map(|&kind| run(initial, store, &config.with_optimizer(kind), reporter))
        .collect()
}

fn new_history(steps: usize) -> HistoryLog {
    HistoryLog::with_capacity(steps.min(MAX_PREALLOCATED_STEPS))
}

fn status_line(optimizer: &str, step: usize, energy: &EnergyBreakdown) -> String {
    format!(
        "[{}] Step {:03} | Total: {:.6} | Heis: {:.6} | DMI: {:.6} | Aniso: {:.6}",
        optimizer,
        step,
        energy.total(),
        energy.heisenberg,
        energy.dmi,
        energy.anisotropy
    )
}
