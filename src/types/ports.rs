//! Port selections for a scan.
//!
//! A scan either probes a fixed list of well-known ports (quick scan) or the
//! full range `1..65535`. Port 65535 itself is not part of the full range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Well-known ports probed by a quick scan.
pub const COMMON_PORTS: [u16; 15] = [
    20, 21, 22, 23, 25, 53, 80, 110, 143, 161, 443, 445, 3389, 8080, 8090,
];

/// Ports probed by a full scan (upper bound excluded).
pub const FULL_RANGE: Range<u16> = 1..65535;

/// Which ports every address is probed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortSet {
    /// The [`COMMON_PORTS`] list.
    Common,
    /// Every port in [`FULL_RANGE`].
    #[default]
    Full,
}

impl PortSet {
    /// Select the port set for the quick-scan flag.
    pub fn from_quick(quick_scan: bool) -> Self {
        if quick_scan {
            Self::Common
        } else {
            Self::Full
        }
    }

    /// All ports in ascending order.
    pub fn to_ports(self) -> Vec<u16> {
        match self {
            Self::Common => COMMON_PORTS.to_vec(),
            Self::Full => FULL_RANGE.collect(),
        }
    }

    pub fn len(self) -> usize {
        match self {
            Self::Common => COMMON_PORTS.len(),
            Self::Full => FULL_RANGE.len(),
        }
    }

    pub fn is_empty(self) -> bool {
        false
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Common => write!(f, "common ({} ports)", COMMON_PORTS.len()),
            Self::Full => write!(f, "full ({}-{})", FULL_RANGE.start, FULL_RANGE.end - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_ports() {
        let ports = PortSet::Common.to_ports();
        assert_eq!(ports.len(), 15);
        assert!(ports.contains(&8080));
        assert!(ports.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_full_range_excludes_65535() {
        let ports = PortSet::Full.to_ports();
        assert_eq!(ports.first(), Some(&1));
        assert_eq!(ports.last(), Some(&65534));
        assert_eq!(ports.len(), 65534);
        assert_eq!(PortSet::Full.len(), 65534);
    }

    #[test]
    fn test_from_quick() {
        assert_eq!(PortSet::from_quick(true), PortSet::Common);
        assert_eq!(PortSet::from_quick(false), PortSet::Full);
    }
}
