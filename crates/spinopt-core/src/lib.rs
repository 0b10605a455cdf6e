//! # spinopt Core Library
//!
//! Energy minimization of classical spin lattices under a Heisenberg + Dzyaloshinskii–Moriya +
//! uniaxial anisotropy Hamiltonian, using projected-gradient optimization on the product of
//! unit spheres.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`SpinConfiguration`,
//!   `InteractionStore`), the Hamiltonian with its analytic gradient, and I/O for the
//!   UppASD output formats and CSV tables.
//!
//! - **[`engine`]: The Logic Core.** Run configuration, the evaluation callback that
//!   differentiates through the unit-sphere projection, the update rules (Adam, SGD,
//!   L-BFGS) and the energy history log.
//!
//! - **[`workflows`]: The Public API.** The optimization driver that ties `engine` and
//!   `core` together into a complete minimization run.

pub mod core;
pub mod engine;
pub mod workflows;
