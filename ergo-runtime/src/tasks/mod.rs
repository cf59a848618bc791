//! Embassy async tasks
//!
//! Each task runs independently and communicates via the [`Bus`].
//!
//! [`Bus`]: crate::channels::Bus

pub mod console;
pub mod erg;
pub mod session;
pub mod telemetry;

pub use console::console_task;
pub use erg::erg_task;
pub use session::{session_task, SessionOptions};
pub use telemetry::telemetry_task;
