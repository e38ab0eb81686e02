//! Built-in machine implementations.

pub mod describe;
pub mod sid_synth;
