use nalgebra::Vector3;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Exchange,
    Dmi,
    Anisotropy,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Exchange => write!(f, "exchange"),
            InteractionKind::Dmi => write!(f, "DMI"),
            InteractionKind::Anisotropy => write!(f, "anisotropy"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InteractionError {
    #[error("{kind} entry {entry}: site column holds {value}, expected a non-negative integer")]
    InvalidSiteColumn {
        kind: InteractionKind,
        entry: usize,
        value: f64,
    },

    #[error("{kind} entry {entry} references site {site}, but the configuration has {num_sites} sites")]
    SiteOutOfRange {
        kind: InteractionKind,
        entry: usize,
        site: usize,
        num_sites: usize,
    },
}

/// Isotropic exchange between sites `i` and `j`, contributing `-J (Si · Sj)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeInteraction {
    pub i: usize,
    pub j: usize,
    pub coupling: f64,
}

impl ExchangeInteraction {
    pub fn new(i: usize, j: usize, coupling: f64) -> Self {
        Self { i, j, coupling }
    }
}

/// Directed DMI pair contributing `-D · (Si × Sj)`. Swapping `i` and `j` flips the sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmiInteraction {
    pub i: usize,
    pub j: usize,
    pub vector: Vector3<f64>,
}

impl DmiInteraction {
    pub fn new(i: usize, j: usize, vector: Vector3<f64>) -> Self {
        Self { i, j, vector }
    }
}

/// Uniaxial single-ion anisotropy contributing `-K (Sa · n)²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnisotropyTerm {
    pub site: usize,
    pub constant: f64,
    pub axis: Vector3<f64>,
}

impl AnisotropyTerm {
    pub fn new(site: usize, constant: f64, axis: Vector3<f64>) -> Self {
        Self {
            site,
            constant,
            axis,
        }
    }
}

/// Read-only sparse interaction topology of a spin lattice.
///
/// Each list is optional in the sense that an empty list is a valid input whose energy
/// contribution is exactly zero. Whether a symmetric exchange pair appears once or twice
/// is decided by whoever produced the data; the store sums exactly what it is given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionStore {
    exchange: Vec<ExchangeInteraction>,
    dmi: Vec<DmiInteraction>,
    anisotropy: Vec<AnisotropyTerm>,
}

impl InteractionStore {
    pub fn new(
        exchange: Vec<ExchangeInteraction>,
        dmi: Vec<DmiInteraction>,
        anisotropy: Vec<AnisotropyTerm>,
    ) -> Self {
        Self {
            exchange,
            dmi,
            anisotropy,
        }
    }

    /// Builds a store from the flat numeric rows produced by table-oriented parsers:
    /// `[i, j, J]`, `[i, j, Dx, Dy, Dz]` and `[a, K, nx, ny, nz]`. Site columns must hold
    /// non-negative integers.
    pub fn from_rows(
        exchange: Option<&[[f64; 3]]>,
        dmi: Option<&[[f64; 5]]>,
        anisotropy: Option<&[[f64; 5]]>,
    ) -> Result<Self, InteractionError> {
        let exchange = exchange
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(entry, row)| {
                let site = |value| site_from_column(InteractionKind::Exchange, entry, value);
                Ok(ExchangeInteraction::new(site(row[0])?, site(row[1])?, row[2]))
            })
            .collect::<Result<Vec<_>, InteractionError>>()?;

        let dmi = dmi
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(entry, row)| {
                let site = |value| site_from_column(InteractionKind::Dmi, entry, value);
                Ok(DmiInteraction::new(
                    site(row[0])?,
                    site(row[1])?,
                    Vector3::new(row[2], row[3], row[4]),
                ))
            })
            .collect::<Result<Vec<_>, InteractionError>>()?;

        let anisotropy = anisotropy
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(entry, row)| {
                let site = site_from_column(InteractionKind::Anisotropy, entry, row[0])?;
                Ok(AnisotropyTerm::new(
                    site,
                    row[1],
                    Vector3::new(row[2], row[3], row[4]),
                ))
            })
            .collect::<Result<Vec<_>, InteractionError>>()?;

        Ok(Self::new(exchange, dmi, anisotropy))
    }

    #[inline]
    pub fn exchange(&self) -> &[ExchangeInteraction] {
        &self.exchange
    }

    #[inline]
    pub fn dmi(&self) -> &[DmiInteraction] {
        &self.dmi
    }

    #[inline]
    pub fn anisotropy(&self) -> &[AnisotropyTerm] {
        &self.anisotropy
    }

    pub fn is_empty(&self) -> bool {
        self.exchange.is_empty() && self.dmi.is_empty() && self.anisotropy.is_empty()
    }

    /// Highest site id referenced by any interaction.
    pub fn max_site(&self) -> Option<usize> {
        let exchange = self.exchange.iter().map(|e| e.i.max(e.j));
        let dmi = self.dmi.iter().map(|d| d.i.max(d.j));
        let anisotropy = self.anisotropy.iter().map(|a| a.site);
        exchange.chain(dmi).chain(anisotropy).max()
    }

    /// Checks that every referenced site lies in `[0, num_sites)`. Reports the first
    /// offending entry in list order (exchange, then DMI, then anisotropy).
    pub fn validate(&self, num_sites: usize) -> Result<(), InteractionError> {
        let out_of_range = |kind, entry, site: usize| {
            if site >= num_sites {
                Err(InteractionError::SiteOutOfRange {
                    kind,
                    entry,
                    site,
                    num_sites,
                })
            } else {
                Ok(())
            }
        };

        for (entry, e) in self.exchange.iter().enumerate() {
            out_of_range(InteractionKind::Exchange, entry, e.i)?;
            out_of_range(InteractionKind::Exchange, entry, e.j)?;
        }
        for (entry, d) in self.dmi.iter().enumerate() {
            out_of_range(InteractionKind::Dmi, entry, d.i)?;
            out_of_range(InteractionKind::Dmi, entry, d.j)?;
        }
        for (entry, a) in self.anisotropy.iter().enumerate() {
            out_of_range(InteractionKind::Anisotropy, entry, a.site)?;
        }
        Ok(())
    }
}

fn site_from_column(
    kind: InteractionKind,
    entry: usize,
    value: f64,
) -> Result<usize, InteractionError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(InteractionError::InvalidSiteColumn { kind, entry, value })
    }
}
