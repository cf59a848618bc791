//! ERG command dispatch
//!
//! Decides when a computed target becomes a trainer command. Commands are
//! deduplicated on `(device, step, watts)`; the key is updated as soon as a
//! command is issued, not when it completes, so repeated ticks inside one
//! step never queue a second command. Each command carries a generation so
//! transports can abort work that a newer command superseded.

pub mod dispatch;
pub mod key;

pub use dispatch::{DispatchStats, ErgCommand, ErgDispatcher, TargetUpdate};
pub use key::DedupKey;
