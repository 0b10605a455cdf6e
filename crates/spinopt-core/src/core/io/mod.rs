//! Input/output for spin-lattice data.
//!
//! [`uppasd`] reads the output files of the UppASD atomistic spin-dynamics code
//! (exchange, DMI and anisotropy tables, moment trajectories and magnetization averages)
//! and assembles them into the in-memory models. [`tables`] persists spin
//! configurations as CSV.

pub mod tables;
pub mod traits;
pub mod uppasd;
