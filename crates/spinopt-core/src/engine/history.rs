use crate::core::hamiltonian::term::EnergyBreakdown;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Energies recorded after one optimizer step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub step: usize,
    pub total: f64,
    pub heisenberg: f64,
    pub dmi: f64,
    pub anisotropy: f64,
}

impl HistoryEntry {
    pub fn new(step: usize, energy: &EnergyBreakdown) -> Self {
        Self {
            step,
            total: energy.total(),
            heisenberg: energy.heisenberg,
            dmi: energy.dmi,
            anisotropy: energy.anisotropy,
        }
    }

    pub fn breakdown(&self) -> EnergyBreakdown {
        EnergyBreakdown::new(self.heisenberg, self.dmi, self.anisotropy)
    }
}

/// Append-only energy trace of one minimization run, in step order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Records `energy` as the next step.
    pub fn push(&mut self, energy: &EnergyBreakdown) {
        let step = self.entries.len();
        self.entries.push(HistoryEntry::new(step, energy));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Writes the log as CSV with header `step,total,heisenberg,dmi,anisotropy`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for entry in &self.entries {
            csv_writer.serialize(entry)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_csv_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}
