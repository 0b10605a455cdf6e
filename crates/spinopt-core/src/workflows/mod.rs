//! # Workflows Module
//!
//! Top-level entry points of the library. A workflow takes parsed inputs and a
//! validated configuration, drives the engine to completion, and returns everything a
//! caller needs to persist or report the outcome.
//!
//! - **Minimization** ([`minimize`]): energy minimization of a spin configuration under
//!   a fixed Hamiltonian with a selectable update rule, plus a parallel driver that
//!   compares several update rules on the same input.

pub mod minimize;
