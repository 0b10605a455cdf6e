use crate::cli::InspectArgs;
use crate::config::build_input_config;
use crate::error::{CliError, Result};
use spinopt::core::hamiltonian::evaluator::Hamiltonian;
use spinopt::core::io::uppasd::{AveragesRecord, UppasdDataset};
use std::fmt::Write;
use tracing::info;

const PREVIEW_PAIRS: usize = 5;

pub fn run(args: InspectArgs) -> Result<()> {
    let input = build_input_config(&args)?;
    info!(
        "Inspecting UppASD run '{}' in {:?}",
        input.run.simid, input.run.directory
    );

    let dataset = input.run.load(input.n_atoms)?;
    let averages = input.run.read_averages()?;

    let hamiltonian = Hamiltonian::new(&dataset.store, dataset.spins.len())
        .map_err(|e| CliError::Other(e.into()))?;
    let energy = hamiltonian
        .energy(dataset.spins.as_slice())
        .map_err(|e| CliError::Other(e.into()))?;

    print!("{}", summarize(&dataset, averages.as_deref().and_then(<[_]>::last)));
    println!(
        "Initial energy: {:.6} mRy (Heis: {:.6} | DMI: {:.6} | Aniso: {:.6})",
        energy.total(),
        energy.heisenberg,
        energy.dmi,
        energy.anisotropy
    );
    Ok(())
}

fn summarize(dataset: &UppasdDataset, last_average: Option<&AveragesRecord>) -> String {
    let mut out = String::new();
    let store = &dataset.store;
    let _ = writeln!(out, "Number of atoms: {}", dataset.spins.len());
    let _ = writeln!(out, "Moment snapshots: {}", dataset.num_snapshots);
    let _ = writeln!(out, "Exchange pairs: {}", store.exchange().len());
    let _ = writeln!(out, "DMI pairs: {}", store.dmi().len());
    let _ = writeln!(out, "Anisotropy terms: {}", store.anisotropy().len());

    if !store.exchange().is_empty() {
        let _ = writeln!(out, "First exchange pairs:");
        for pair in store.exchange().iter().take(PREVIEW_PAIRS) {
            let _ = writeln!(
                out,
                "  Site {} - Site {} : J = {:.6} mRy",
                pair.i + 1,
                pair.j + 1,
                pair.coupling
            );
        }
    }

    let m = dataset.spins.magnetization();
    let _ = writeln!(
        out,
        "Mean moment of the snapshot: ({:.6}, {:.6}, {:.6}), |m| = {:.6}",
        m.x,
        m.y,
        m.z,
        m.norm()
    );
    match last_average {
        Some(avg) => {
            let _ = writeln!(
                out,
                "Last averages entry (step {}): M = ({:.6}, {:.6}, {:.6}), |M| = {:.6} ± {:.6}",
                avg.step,
                avg.magnetization.x,
                avg.magnetization.y,
                avg.magnetization.z,
                avg.magnitude,
                avg.std_magnitude
            );
        }
        None => {
            let _ = writeln!(out, "No averages file found.");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DatasetArgs;
    use nalgebra::Vector3;
    use spinopt::core::models::interactions::{ExchangeInteraction, InteractionStore};
    use spinopt::core::models::spins::SpinConfiguration;
    use std::fs;
    use tempfile::tempdir;

    fn chain_dataset(pairs: usize) -> UppasdDataset {
        let exchange = (0..pairs)
            .map(|i| ExchangeInteraction::new(i, i + 1, 1.0 + i as f64))
            .collect();
        UppasdDataset {
            spins: SpinConfiguration::uniform(pairs + 1, Vector3::z()),
            store: InteractionStore::new(exchange, vec![], vec![]),
            num_snapshots: 3,
        }
    }

    #[test]
    fn summary_lists_counts_and_previews_five_pairs() {
        let text = summarize(&chain_dataset(7), None);
        assert!(text.contains("Number of atoms: 8"));
        assert!(text.contains("Moment snapshots: 3"));
        assert!(text.contains("Exchange pairs: 7"));
        assert!(text.contains("DMI pairs: 0"));
        assert!(text.contains("Site 1 - Site 2 : J = 1.000000 mRy"));
        assert!(text.contains("Site 5 - Site 6 : J = 5.000000 mRy"));
        assert!(!text.contains("Site 6 - Site 7"));
        assert!(text.contains("|m| = 1.000000"));
        assert!(text.contains("No averages file found."));
    }

    #[test]
    fn summary_includes_last_averages_record() {
        let record = AveragesRecord {
            step: 1000.0,
            magnetization: Vector3::new(0.0, 0.0, 0.9),
            magnitude: 0.9,
            std_magnitude: 0.01,
        };
        let text = summarize(&chain_dataset(1), Some(&record));
        assert!(text.contains("Last averages entry (step 1000)"));
        assert!(text.contains("|M| = 0.900000 ± 0.010000"));
    }

    #[test]
    fn run_reads_a_dataset_from_disk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("jfile"), "1 2 1.0 0.0 0.0 0.5\n").unwrap();
        fs::write(dir.path().join("moment.x1.out"), "1 1.0 0.0 0.0\n2 0.0 1.0 0.0\n").unwrap();

        let args = InspectArgs {
            config: None,
            dataset: DatasetArgs {
                simid: Some("x1".to_string()),
                input_dir: Some(dir.path().to_path_buf()),
                n_atoms: None,
            },
        };
        run(args).unwrap();
    }

    #[test]
    fn run_reports_missing_exchange_table() {
        let dir = tempdir().unwrap();
        let args = InspectArgs {
            config: None,
            dataset: DatasetArgs {
                simid: Some("x1".to_string()),
                input_dir: Some(dir.path().to_path_buf()),
                n_atoms: None,
            },
        };
        assert!(matches!(run(args), Err(CliError::Dataset(_))));
    }
}
