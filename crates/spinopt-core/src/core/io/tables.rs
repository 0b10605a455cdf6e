use crate::core::models::spins::SpinConfiguration;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Row {row} has site id {site}; sites must be listed in order starting at 0")]
    OutOfOrderSite { row: usize, site: usize },
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct SpinRecord {
    site: usize,
    sx: f64,
    sy: f64,
    sz: f64,
}

/// Writes a configuration as CSV with header `site,sx,sy,sz`.
pub fn write_spins<W: Write>(spins: &SpinConfiguration, writer: W) -> Result<(), TableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (site, s) in spins.iter().enumerate() {
        csv_writer.serialize(SpinRecord {
            site,
            sx: s.x,
            sy: s.y,
            sz: s.z,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_spins_to_path<P: AsRef<Path>>(
    spins: &SpinConfiguration,
    path: P,
) -> Result<(), TableError> {
    let file = std::fs::File::create(path)?;
    write_spins(spins, std::io::BufWriter::new(file))
}

/// Reads a configuration written by [`write_spins`]. Site ids must run 0, 1, 2, ...
pub fn read_spins<R: Read>(reader: R) -> Result<SpinConfiguration, TableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut spins = Vec::new();
    for (row, result) in csv_reader.deserialize::<SpinRecord>().enumerate() {
        let record = result?;
        if record.site != row {
            return Err(TableError::OutOfOrderSite {
                row,
                site: record.site,
            });
        }
        spins.push(Vector3::new(record.sx, record.sy, record.sz));
    }
    Ok(SpinConfiguration::new(spins))
}

pub fn read_spins_from_path<P: AsRef<Path>>(path: P) -> Result<SpinConfiguration, TableError> {
    let file = std::fs::File::open(path)?;
    read_spins(std::io::BufReader::new(file))
}
