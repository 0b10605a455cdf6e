//! # Core Module
//!
//! Fundamental building blocks for spin-lattice energy minimization.
//!
//! - **Lattice Representation** ([`models`]) - Spin configurations, the unit-sphere
//!   projection, and the sparse interaction store
//! - **Energy Model** ([`hamiltonian`]) - Heisenberg, DMI and anisotropy energies with
//!   closed-form gradients
//! - **File I/O** ([`io`]) - UppASD output parsers and CSV tables
//!
//! ## Energy Convention
//!
//! Every listed interaction contributes exactly one term:
//!
//! - exchange `(i, j, J)`: `-J (Si · Sj)`
//! - DMI `(i, j, D)`: `-D · (Si × Sj)`
//! - anisotropy `(a, K, n)`: `-K (Sa · n)²`
//!
//! The counting convention for symmetric pairs (listed once or twice) belongs to the
//! dataset producer and is never inferred here.

pub mod hamiltonian;
pub mod io;
pub mod models;
