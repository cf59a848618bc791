//! Target computation
//!
//! Pure functions turning a step, an FTP baseline and a position within
//! the step into a wattage, and a wattage into an intensity zone.

pub mod power;
pub mod zone;

pub use power::{
    effective_ftp, preview_watts, round_half_up, target_watts, FallbackPolicy, DEFAULT_FTP_WATTS,
    PROGRESSIVE_INTERVAL_MS, PROGRESSIVE_STEP_WATTS,
};
pub use zone::{classify, Zone, ZoneTier, ZONES};
