//! Data models for spin lattices: the optimizable spin configuration and the read-only
//! interaction topology.

pub mod interactions;
pub mod spins;
