use crate::core::hamiltonian::term::EnergyBreakdown;
use crate::engine::config::OptimizerKind;

/// Events emitted by a minimization run, in order: phases bracket the run, `RunStart`
/// precedes exactly `total_steps` `Step` events, and `RunFinish` closes the step loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    RunStart {
        optimizer: OptimizerKind,
        total_steps: u64,
    },
    /// Energies after the update of `step`; identical to the matching history entry.
    Step {
        step: usize,
        energy: EnergyBreakdown,
    },
    RunFinish,

    /// Human-readable status line, emitted every report interval.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Optional sink for [`Progress`] events. A reporter without a callback drops
/// everything, so library callers that do not care pass [`ProgressReporter::new`].
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    #[inline]
    pub fn step(&self, step: usize, energy: &EnergyBreakdown) {
        self.report(Progress::Step {
            step,
            energy: *energy,
        });
    }
}
