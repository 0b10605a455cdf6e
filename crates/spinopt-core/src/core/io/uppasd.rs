//! Parsers for UppASD simulation output.
//!
//! Site ids in UppASD files are 1-based; every parser here converts them to the 0-based
//! ids used by [`InteractionStore`] and [`SpinConfiguration`].

use super::traits::TableFile;
use crate::core::models::interactions::{
    AnisotropyTerm, DmiInteraction, ExchangeInteraction, InteractionError, InteractionStore,
};
use crate::core::models::spins::SpinConfiguration;
use nalgebra::Vector3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum UppasdError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: UppasdParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required file: {}", .0.display())]
    MissingFile(PathBuf),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

#[derive(Debug, Error, PartialEq)]
pub enum UppasdParseErrorKind {
    #[error("Invalid integer in column {column} (value: '{value}')")]
    InvalidInt { column: usize, value: String },
    #[error("Invalid float in column {column} (value: '{value}')")]
    InvalidFloat { column: usize, value: String },
    #[error("Site id in column {column} must be at least 1 (UppASD ids are 1-based)")]
    ZeroSiteId { column: usize },
    #[error("Expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },
}

/// One row of `averages.<simid>.out`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragesRecord {
    pub step: f64,
    pub magnetization: Vector3<f64>,
    pub magnitude: f64,
    pub std_magnitude: f64,
}

fn is_data_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn parse_site(token: &str, line: usize, column: usize) -> Result<usize, UppasdError> {
    let id: usize = token.parse().map_err(|_| UppasdError::Parse {
        line,
        kind: UppasdParseErrorKind::InvalidInt {
            column,
            value: token.to_string(),
        },
    })?;
    id.checked_sub(1).ok_or(UppasdError::Parse {
        line,
        kind: UppasdParseErrorKind::ZeroSiteId { column },
    })
}

fn parse_float(token: &str, line: usize, column: usize) -> Result<f64, UppasdError> {
    token.parse().map_err(|_| UppasdError::Parse {
        line,
        kind: UppasdParseErrorKind::InvalidFloat {
            column,
            value: token.to_string(),
        },
    })
}

/// Exchange table (`jfile`): `i j ... J`, with the coupling in column 6 (mRy).
/// Rows with fewer than six columns are ignored.
pub struct JFile;

impl TableFile for JFile {
    type Record = ExchangeInteraction;
    type Error = UppasdError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Self::Record>, Self::Error> {
        let mut records = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            if !is_data_line(&line) {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 {
                continue;
            }
            records.push(ExchangeInteraction::new(
                parse_site(parts[0], line_num, 1)?,
                parse_site(parts[1], line_num, 2)?,
                parse_float(parts[5], line_num, 6)?,
            ));
        }
        Ok(records)
    }
}

/// DMI table (`dmfile`): `i j Dx Dy Dz`. Rows with fewer than five columns are ignored.
pub struct DmFile;

impl TableFile for DmFile {
    type Record = DmiInteraction;
    type Error = UppasdError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Self::Record>, Self::Error> {
        let mut records = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            if !is_data_line(&line) {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 5 {
                continue;
            }
            let vector = Vector3::new(
                parse_float(parts[2], line_num, 3)?,
                parse_float(parts[3], line_num, 4)?,
                parse_float(parts[4], line_num, 5)?,
            );
            records.push(DmiInteraction::new(
                parse_site(parts[0], line_num, 1)?,
                parse_site(parts[1], line_num, 2)?,
                vector,
            ));
        }
        Ok(records)
    }
}

/// Block-formatted anisotropy output (`aniso1.<simid>.out`).
///
/// A block is four lines long: an `Atom= <id>` header, the axis components, a line whose
/// first token is `K`, and a separator. Blocks that cannot be decoded are skipped and
/// scanning resumes on the following line.
pub struct AnisotropyFile;

impl AnisotropyFile {
    fn parse_block(lines: &[String], start: usize) -> Option<AnisotropyTerm> {
        let id: usize = lines[start].split_whitespace().nth(1)?.parse().ok()?;
        let site = id.checked_sub(1)?;
        let axis: Vec<f64> = lines
            .get(start + 1)?
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .ok()?;
        if axis.len() < 3 {
            return None;
        }
        let constant: f64 = lines
            .get(start + 2)?
            .split_whitespace()
            .next()?
            .parse()
            .ok()?;
        Some(AnisotropyTerm::new(
            site,
            constant,
            Vector3::new(axis[0], axis[1], axis[2]),
        ))
    }
}

impl TableFile for AnisotropyFile {
    type Record = AnisotropyTerm;
    type Error = UppasdError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Self::Record>, Self::Error> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        let mut records = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if !lines[i].contains("Atom=") {
                i += 1;
                continue;
            }
            match Self::parse_block(&lines, i) {
                Some(term) => {
                    records.push(term);
                    i += 4;
                }
                None => {
                    debug!("Skipping malformed anisotropy block at line {}", i + 1);
                    i += 1;
                }
            }
        }
        Ok(records)
    }
}

/// Magnetization averages (`averages.<simid>.out`): `step Mx My Mz M std_M`.
pub struct AveragesFile;

impl TableFile for AveragesFile {
    type Record = AveragesRecord;
    type Error = UppasdError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Self::Record>, Self::Error> {
        let mut records = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            if !is_data_line(&line) {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 {
                return Err(UppasdError::Parse {
                    line: line_num,
                    kind: UppasdParseErrorKind::TooFewColumns {
                        expected: 6,
                        found: parts.len(),
                    },
                });
            }
            let values = parts[..6]
                .iter()
                .enumerate()
                .map(|(column, token)| parse_float(token, line_num, column + 1))
                .collect::<Result<Vec<_>, _>>()?;
            records.push(AveragesRecord {
                step: values[0],
                magnetization: Vector3::new(values[1], values[2], values[3]),
                magnitude: values[4],
                std_magnitude: values[5],
            });
        }
        Ok(records)
    }
}

/// Reads a moment trajectory (`moment.<simid>.out`) as a sequence of snapshots of
/// `num_sites` spins each.
///
/// The last three columns of every row are taken as the moment vector, which covers both
/// bare `mx my mz` tables and UppASD's annotated layout. The row count must be a multiple
/// of `num_sites`. Moments are returned as read, without normalization.
pub fn read_moments(
    reader: &mut impl BufRead,
    num_sites: usize,
) -> Result<Vec<SpinConfiguration>, UppasdError> {
    if num_sites == 0 {
        return Err(UppasdError::Inconsistency(
            "cannot split moments into snapshots of zero atoms".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;
        if !is_data_line(&line) {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(UppasdError::Parse {
                line: line_num,
                kind: UppasdParseErrorKind::TooFewColumns {
                    expected: 3,
                    found: parts.len(),
                },
            });
        }
        let offset = parts.len() - 3;
        rows.push(Vector3::new(
            parse_float(parts[offset], line_num, offset + 1)?,
            parse_float(parts[offset + 1], line_num, offset + 2)?,
            parse_float(parts[offset + 2], line_num, offset + 3)?,
        ));
    }

    if rows.is_empty() {
        return Err(UppasdError::Inconsistency("moment file is empty".to_string()));
    }
    if rows.len() % num_sites != 0 {
        return Err(UppasdError::Inconsistency(format!(
            "moment file has {} rows, which is not a multiple of the atom count {}",
            rows.len(),
            num_sites
        )));
    }

    Ok(rows
        .chunks(num_sites)
        .map(|chunk| SpinConfiguration::new(chunk.to_vec()))
        .collect())
}

pub fn read_moments_from_path<P: AsRef<Path>>(
    path: P,
    num_sites: usize,
) -> Result<Vec<SpinConfiguration>, UppasdError> {
    let file = File::open(path)?;
    read_moments(&mut BufReader::new(file), num_sites)
}

/// Locations of the output files of one UppASD run.
#[derive(Debug, Clone, PartialEq)]
pub struct UppasdRun {
    pub directory: PathBuf,
    pub simid: String,
}

/// Everything needed to start a minimization, assembled from one UppASD run.
#[derive(Debug, Clone)]
pub struct UppasdDataset {
    /// Last moment snapshot, projected onto the unit sphere.
    pub spins: SpinConfiguration,
    pub store: InteractionStore,
    pub num_snapshots: usize,
}

impl UppasdRun {
    pub fn new(directory: impl Into<PathBuf>, simid: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            simid: simid.into(),
        }
    }

    pub fn moment_path(&self) -> PathBuf {
        self.directory.join(format!("moment.{}.out", self.simid))
    }

    pub fn averages_path(&self) -> PathBuf {
        self.directory.join(format!("averages.{}.out", self.simid))
    }

    pub fn anisotropy_path(&self) -> PathBuf {
        self.directory.join(format!("aniso1.{}.out", self.simid))
    }

    pub fn jfile_path(&self) -> PathBuf {
        self.directory.join("jfile")
    }

    pub fn dmfile_path(&self) -> PathBuf {
        self.directory.join("dmfile")
    }

    /// Reads the averages table if the run produced one.
    pub fn read_averages(&self) -> Result<Option<Vec<AveragesRecord>>, UppasdError> {
        read_optional::<AveragesFile>(&self.averages_path())
    }

    /// Reads the interaction tables. The exchange table is required; DMI and anisotropy
    /// are optional and default to empty lists.
    pub fn load_interactions(&self) -> Result<InteractionStore, UppasdError> {
        let jfile = self.jfile_path();
        if !jfile.exists() {
            return Err(UppasdError::MissingFile(jfile));
        }
        let exchange = JFile::read_from_path(&jfile)?;
        info!("Parsed {} exchange pairs from {:?}", exchange.len(), jfile);

        let dmi = read_optional::<DmFile>(&self.dmfile_path())?.unwrap_or_default();
        let anisotropy =
            read_optional::<AnisotropyFile>(&self.anisotropy_path())?.unwrap_or_default();
        info!(
            dmi_pairs = dmi.len(),
            anisotropy_terms = anisotropy.len(),
            "Parsed optional interaction tables."
        );

        Ok(InteractionStore::new(exchange, dmi, anisotropy))
    }

    /// Loads the interaction tables and the last moment snapshot.
    ///
    /// The atom count is `num_sites` when given, otherwise the number of anisotropy
    /// blocks, otherwise one past the highest site id in the interaction tables. The
    /// store is validated against it.
    pub fn load(&self, num_sites: Option<usize>) -> Result<UppasdDataset, UppasdError> {
        let store = self.load_interactions()?;
        let num_sites = match num_sites {
            Some(n) => n,
            None => infer_num_sites(&store).ok_or_else(|| {
                UppasdError::Inconsistency(
                    "cannot infer the atom count from empty interaction tables".to_string(),
                )
            })?,
        };
        info!("Number of atoms: {}", num_sites);
        store.validate(num_sites)?;

        let moment_path = self.moment_path();
        if !moment_path.exists() {
            return Err(UppasdError::MissingFile(moment_path));
        }
        let snapshots = read_moments_from_path(&moment_path, num_sites)?;
        let num_snapshots = snapshots.len();
        let spins = snapshots
            .into_iter()
            .last()
            .map(|s| s.projected())
            .ok_or_else(|| UppasdError::Inconsistency("moment file is empty".to_string()))?;
        debug!(
            "Using the final snapshot of {} from {:?}",
            num_snapshots, moment_path
        );

        Ok(UppasdDataset {
            spins,
            store,
            num_snapshots,
        })
    }
}

/// Atom count implied by an interaction store: the anisotropy block count when present,
/// otherwise one past the highest referenced site.
pub fn infer_num_sites(store: &InteractionStore) -> Option<usize> {
    if !store.anisotropy().is_empty() {
        return Some(store.anisotropy().len());
    }
    store.max_site().map(|max| max + 1)
}

fn read_optional<T>(path: &Path) -> Result<Option<Vec<T::Record>>, UppasdError>
where
    T: TableFile<Error = UppasdError>,
{
    if path.exists() {
        debug!("Parsing {:?}", path);
        T::read_from_path(path).map(Some)
    } else {
        warn!("{:?} not found, skipping.", path);
        Ok(None)
    }
}
