//! # Hamiltonian Module
//!
//! Energy of a spin configuration under exchange, Dzyaloshinskii–Moriya and uniaxial
//! anisotropy interactions, together with its exact gradient.
//!
//! ## Key Components
//!
//! - [`term`] - The per-interaction energy breakdown
//! - [`potentials`] - Closed-form energy and gradient of a single interaction
//! - [`evaluator`] - Gather-and-reduce evaluation over the sparse interaction lists
//!
//! ## Usage
//!
//! ```ignore
//! use spinopt::core::hamiltonian::evaluator::Hamiltonian;
//!
//! let hamiltonian = Hamiltonian::new(&store, spins.len())?;
//! let (energy, gradient) = hamiltonian.energy_and_gradient(spins.as_slice())?;
//! ```

pub mod evaluator;
pub(crate) mod potentials;
pub mod term;
