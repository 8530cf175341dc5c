//! Simulator command implementations.

pub mod programs;
pub mod run;
