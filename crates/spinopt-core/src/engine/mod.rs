//! # Engine Module
//!
//! The optimization machinery behind a minimization run.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run identifier, update rule, learning rate, step count
//! - **Objective** ([`objective`]) - Evaluation callback that projects the working variable,
//!   evaluates the Hamiltonian and back-propagates through the projection
//! - **Update Rules** ([`optimizers`]) - Adam, plain gradient descent and L-BFGS behind a
//!   common [`optimizers::UpdateRule`] trait
//! - **History** ([`history`]) - Per-step energy snapshots and their CSV export
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod error;
pub mod history;
pub mod objective;
pub mod optimizers;
pub mod progress;
