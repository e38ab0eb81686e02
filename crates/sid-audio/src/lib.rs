//! Audio output backends for the sidsyn SID synthesizer.
//!
//! The synthesizer renders mono 16-bit samples; backends take them through
//! a lock-free ring buffer to the device callback.

mod cpal_backend;
mod traits;

pub use cpal_backend::CpalOutput;
pub use traits::{AudioError, AudioOutput};
