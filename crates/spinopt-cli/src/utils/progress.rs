use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use spinopt::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 100;
const PHASE_TEMPLATE: &str = "{spinner:.green} [{prefix}] {msg}";
const STEP_TEMPLATE: &str =
    "[{prefix}] [{bar:40.cyan/blue}] {pos}/{len} steps ({elapsed_precise}) {msg}";

/// One bar per optimizer run. Phases show as a spinner, the step loop as a bar labelled
/// with the optimizer whose message tracks the latest total energy.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(phase_style())
            .with_prefix("spinopt");
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(phase_style());
                    pb.set_message(name.to_string());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                }
                Progress::RunStart {
                    optimizer,
                    total_steps,
                } => {
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_style(step_style());
                    pb.set_prefix(optimizer.name());
                    pb.set_length(total_steps);
                    pb.set_message(String::new());
                }
                Progress::Step { energy, .. } => {
                    pb.set_message(format!("E = {:.6}", energy.total()));
                    pb.inc(1);
                }
                Progress::RunFinish => {
                    if let Some(length) = pb.length() {
                        pb.set_position(length);
                    }
                    pb.finish();
                }
                Progress::PhaseFinish => {
                    pb.disable_steady_tick();
                    if !pb.is_finished() {
                        pb.finish_with_message("done");
                    }
                }
                Progress::Message(line) => pb.println(format!("  {}", line)),
            }
        })
    }
}

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template(PHASE_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn step_style() -> ProgressStyle {
    ProgressStyle::with_template(STEP_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

/// Callback for concurrent runs: interleaved bars are unreadable, so only status lines
/// reach `sink`.
pub fn forward_messages<F>(sink: F) -> ProgressCallback<'static>
where
    F: Fn(String) + Send + Sync + 'static,
{
    Box::new(move |progress: Progress| {
        if let Progress::Message(line) = progress {
            sink(line);
        }
    })
}

pub fn message_callback() -> ProgressCallback<'static> {
    forward_messages(|line| println!("  {}", line))
}
