//! Intensity zone classifier

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::power::effective_ftp;

/// Display tier associated with a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ZoneTier {
    Success,
    Primary,
    Warning,
    Danger,
}

/// Intensity zone relative to FTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Zone {
    /// Up to 55% FTP
    Z1,
    /// Up to 75% FTP
    Z2,
    /// Up to 90% FTP
    Z3,
    /// Up to 105% FTP
    Z4,
    /// Above 105% FTP
    Z5,
}

/// All zones in ascending order
pub const ZONES: [Zone; 5] = [Zone::Z1, Zone::Z2, Zone::Z3, Zone::Z4, Zone::Z5];

impl Zone {
    /// Inclusive upper bound as a ratio of FTP
    ///
    /// The last zone is open-ended.
    pub fn upper_bound(&self) -> f64 {
        match self {
            Zone::Z1 => 0.55,
            Zone::Z2 => 0.75,
            Zone::Z3 => 0.90,
            Zone::Z4 => 1.05,
            Zone::Z5 => f64::INFINITY,
        }
    }

    /// Zone number, 1 to 5
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    /// Display tier
    pub fn tier(&self) -> ZoneTier {
        match self {
            Zone::Z1 => ZoneTier::Success,
            Zone::Z2 => ZoneTier::Primary,
            Zone::Z3 => ZoneTier::Warning,
            Zone::Z4 | Zone::Z5 => ZoneTier::Danger,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zone {}", self.number())
    }
}

/// Classify a wattage against an FTP baseline
///
/// Returns the first zone whose upper bound is at or above the ratio. This
/// is total: anything beyond the finite bounds lands in [`Zone::Z5`], and a
/// degenerate baseline is replaced before dividing.
pub fn classify(watts: u16, ftp: f64) -> Zone {
    let ratio = watts as f64 / effective_ftp(ftp);

    ZONES
        .iter()
        .copied()
        .find(|zone| ratio <= zone.upper_bound())
        .unwrap_or(Zone::Z5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_in_zone_two() {
        assert_eq!(classify(130, 200.0), Zone::Z2);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(classify(110, 200.0), Zone::Z1); // 0.55
        assert_eq!(classify(150, 200.0), Zone::Z2); // 0.75
        assert_eq!(classify(180, 200.0), Zone::Z3); // 0.90
        assert_eq!(classify(210, 200.0), Zone::Z4); // 1.05
        assert_eq!(classify(211, 200.0), Zone::Z5);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify(0, 250.0), Zone::Z1);
        assert_eq!(classify(u16::MAX, 250.0), Zone::Z5);
    }

    #[test]
    fn test_degenerate_ftp_does_not_fault() {
        assert_eq!(classify(125, 0.0), Zone::Z1); // 125 / 250
        assert_eq!(classify(200, -5.0), Zone::Z3); // 200 / 250
    }

    #[test]
    fn test_numbers_and_tiers() {
        assert_eq!(Zone::Z1.number(), 1);
        assert_eq!(Zone::Z5.number(), 5);
        assert_eq!(Zone::Z1.tier(), ZoneTier::Success);
        assert_eq!(Zone::Z2.tier(), ZoneTier::Primary);
        assert_eq!(Zone::Z3.tier(), ZoneTier::Warning);
        assert_eq!(Zone::Z4.tier(), ZoneTier::Danger);
        assert_eq!(Zone::Z5.tier(), ZoneTier::Danger);
    }
}
