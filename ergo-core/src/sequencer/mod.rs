//! Step sequencer
//!
//! Walks a workout plan on a fixed time quantum and tracks both the time
//! left in the current step and the overall elapsed time.

pub mod machine;
pub mod playback;

pub use machine::{Sequencer, DEFAULT_QUANTUM_MS};
pub use playback::{Phase, PlaybackState};
