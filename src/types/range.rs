//! IPv4 address range specifications.
//!
//! Two notations are accepted:
//! - CIDR with a `/16` or `/24` prefix, written as the exact network address
//!   (`10.1.0.0/16`, `192.168.7.0/24`)
//! - Dashed octet ranges where every octet is either a single value or a
//!   `lo-hi` span (`10.10.10.10-254`, `192.168.1-5.0-255`)
//!
//! A dashed range is an octet box, not a linear span: `10.0.1-2.250-251`
//! covers `10.0.1.250`, `10.0.1.251`, `10.0.2.250` and `10.0.2.251`. No value
//! carries from one octet into the next.

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Error type for address range parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("empty address specification")]
    Empty,
    #[error("invalid address specification '{0}' (use 10.0.0.0/24 or 10.0.0.1-254)")]
    InvalidFormat(String),
    #[error("'{0}' is not the network address of its subnet")]
    NotSubnetBase(String),
}

/// An inclusive, per-octet IPv4 range.
///
/// Invariant: `begin[i] <= end[i]` for every octet. Serialized in dashed
/// notation and re-parsed on deserialization, so the invariant holds for
/// deserialized values too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressRange {
    begin: [u8; 4],
    end: [u8; 4],
}

impl AddressRange {
    /// Build a range from raw octets, swapping any reversed octet bounds.
    pub fn new(begin: [u8; 4], end: [u8; 4]) -> Self {
        let mut begin = begin;
        let mut end = end;
        for i in 0..4 {
            if begin[i] > end[i] {
                std::mem::swap(&mut begin[i], &mut end[i]);
            }
        }
        Self { begin, end }
    }

    /// A range holding exactly one address.
    pub fn single(addr: Ipv4Addr) -> Self {
        let octets = addr.octets();
        Self {
            begin: octets,
            end: octets,
        }
    }

    /// Parse an address specification in CIDR or dashed notation.
    pub fn parse(s: &str) -> Result<Self, RangeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RangeError::Empty);
        }

        match s.split_once('/') {
            Some((addr, prefix)) => Self::parse_cidr(s, addr, prefix),
            None => Self::parse_dashed(s),
        }
    }

    /// Check the shape of a specification without requiring a subnet base.
    ///
    /// `1.1.1.1/24` is well formed even though [`AddressRange::parse`]
    /// rejects it for not being the network address.
    pub fn is_well_formed(s: &str) -> bool {
        matches!(Self::parse(s), Ok(_) | Err(RangeError::NotSubnetBase(_)))
    }

    fn parse_cidr(input: &str, addr: &str, prefix: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::InvalidFormat(input.to_string());

        // Exact suffix text only: no sign, no leading zeros.
        let prefix: u8 = match prefix {
            "16" => 16,
            "24" => 24,
            _ => return Err(invalid()),
        };

        let ip = Ipv4Addr::from(parse_quad(addr).ok_or_else(invalid)?);
        let network = Ipv4Network::new(ip, prefix).map_err(|_| invalid())?;

        if network.network() != ip {
            return Err(RangeError::NotSubnetBase(input.to_string()));
        }

        Ok(Self {
            begin: network.network().octets(),
            end: network.broadcast().octets(),
        })
    }

    fn parse_dashed(input: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::InvalidFormat(input.to_string());

        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut begin = [0u8; 4];
        let mut end = [0u8; 4];
        for (i, part) in parts.iter().enumerate() {
            let (lo, hi) = match part.split_once('-') {
                Some((lo, hi)) => (parse_octet(lo), parse_octet(hi)),
                None => {
                    let value = parse_octet(part);
                    (value, value)
                }
            };
            begin[i] = lo.ok_or_else(invalid)?;
            end[i] = hi.ok_or_else(invalid)?;
        }

        Ok(Self::new(begin, end))
    }

    /// First address of the range.
    pub fn begin(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.begin)
    }

    /// Last address of the range.
    pub fn end(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.end)
    }

    pub fn begin_octets(&self) -> [u8; 4] {
        self.begin
    }

    pub fn end_octets(&self) -> [u8; 4] {
        self.end
    }

    /// Number of addresses: the product of every octet's span.
    pub fn len(&self) -> usize {
        self.begin
            .iter()
            .zip(self.end.iter())
            .map(|(&b, &e)| usize::from(e - b) + 1)
            .product()
    }

    /// Always false; a range covers at least one address.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Materialize every address, most significant octet outermost.
    ///
    /// The result is in ascending dotted-decimal order and is recomputed on
    /// every call.
    pub fn all_addresses(&self) -> Vec<Ipv4Addr> {
        let [b0, b1, b2, b3] = self.begin;
        let [e0, e1, e2, e3] = self.end;

        let mut addresses = Vec::with_capacity(self.len());
        for o0 in b0..=e0 {
            for o1 in b1..=e1 {
                for o2 in b2..=e2 {
                    for o3 in b3..=e3 {
                        addresses.push(Ipv4Addr::new(o0, o1, o2, o3));
                    }
                }
            }
        }

        tracing::debug!(count = addresses.len(), range = %self, "expanded address range");
        addresses
    }
}

impl FromStr for AddressRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AddressRange {
    type Error = RangeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AddressRange> for String {
    fn from(range: AddressRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .begin
            .iter()
            .zip(self.end.iter())
            .map(|(b, e)| {
                if b == e {
                    b.to_string()
                } else {
                    format!("{}-{}", b, e)
                }
            })
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Parse a plain dotted quad.
fn parse_quad(s: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return None;
    }

    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(parts) {
        *slot = parse_octet(part)?;
    }
    Some(octets)
}

/// Parse one to three decimal digits into an octet.
fn parse_octet(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cidr_24() {
        let range = AddressRange::parse("1.1.1.0/24").unwrap();
        assert_eq!(range.begin(), Ipv4Addr::new(1, 1, 1, 0));
        assert_eq!(range.end(), Ipv4Addr::new(1, 1, 1, 255));
        assert_eq!(range.len(), 256);
    }

    #[test]
    fn test_parse_cidr_16() {
        let range = AddressRange::parse("10.20.0.0/16").unwrap();
        assert_eq!(range.begin(), Ipv4Addr::new(10, 20, 0, 0));
        assert_eq!(range.end(), Ipv4Addr::new(10, 20, 255, 255));
        assert_eq!(range.len(), 65536);
    }

    #[test]
    fn test_cidr_span_matches_prefix() {
        for (spec, prefix) in [
            ("192.168.4.0/24", 24u32),
            ("172.16.0.0/16", 16),
            ("255.255.254.0/24", 24),
            ("0.0.0.0/16", 16),
        ] {
            let range = AddressRange::parse(spec).unwrap();
            let begin = u32::from(range.begin());
            let end = u32::from(range.end());
            assert_eq!(end - begin, (1u32 << (32 - prefix)) - 1, "{}", spec);
        }
    }

    #[test]
    fn test_unsupported_prefix() {
        assert!(matches!(
            AddressRange::parse("1.1.1.0/23"),
            Err(RangeError::InvalidFormat(_))
        ));
        assert!(matches!(
            AddressRange::parse("1.1.1.1/23"),
            Err(RangeError::InvalidFormat(_))
        ));
        assert!(matches!(
            AddressRange::parse("10.0.0.0/8"),
            Err(RangeError::InvalidFormat(_))
        ));
        assert!(!AddressRange::is_well_formed("1.1.1.1/23"));
    }

    #[test]
    fn test_host_address_with_mask() {
        assert!(AddressRange::is_well_formed("1.1.1.1/24"));
        assert!(AddressRange::is_well_formed("255.255.254.1/24"));
        assert_eq!(
            AddressRange::parse("1.1.1.1/24"),
            Err(RangeError::NotSubnetBase("1.1.1.1/24".to_string()))
        );
        assert!(matches!(
            AddressRange::parse("10.1.2.0/16"),
            Err(RangeError::NotSubnetBase(_))
        ));
    }

    #[test]
    fn test_parse_dashed_last_octet() {
        let range = AddressRange::parse("10.10.10.10-254").unwrap();
        assert_eq!(range.begin_octets(), [10, 10, 10, 10]);
        assert_eq!(range.end_octets(), [10, 10, 10, 254]);
        assert_eq!(range.len(), 245);
    }

    #[test]
    fn test_parse_single_address() {
        let range = AddressRange::parse("127.0.0.1").unwrap();
        assert_eq!(range, AddressRange::single(Ipv4Addr::LOCALHOST));
        assert_eq!(range.all_addresses(), vec![Ipv4Addr::LOCALHOST]);
    }

    #[test]
    fn test_reversed_span_is_normalized() {
        let range = AddressRange::parse("1.1.1.200-100").unwrap();
        assert_eq!(range.begin(), Ipv4Addr::new(1, 1, 1, 100));
        assert_eq!(range.end(), Ipv4Addr::new(1, 1, 1, 200));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(AddressRange::parse(""), Err(RangeError::Empty));
        assert_eq!(AddressRange::parse("   "), Err(RangeError::Empty));
        assert_eq!(AddressRange::parse("\t\n"), Err(RangeError::Empty));
        assert!(!AddressRange::is_well_formed(" "));
    }

    #[test]
    fn test_invalid_format() {
        for input in [
            "invalidIp",
            "1.1.1.1- 243",
            "1.1.1",
            "1.1.1.1.1",
            "1.1.1.256",
            "1.1.1.1-2-3",
            "1.1.1.1000",
            "1.1.1.-5",
            "a.b.c.d/24",
            "1.1.1.0/",
            "1.1.1.0/+24",
            "1.1.1.0/024",
            "10.0.0.0/016",
            "1.1.1.0/ 24",
        ] {
            assert!(
                matches!(AddressRange::parse(input), Err(RangeError::InvalidFormat(_))),
                "{} should be rejected",
                input
            );
        }
        assert!(AddressRange::is_well_formed("1.1.1.1-223"));
    }

    #[test]
    fn test_octet_box_enumeration() {
        let range: AddressRange = "10.0.1-2.250-251".parse().unwrap();
        assert_eq!(
            range.all_addresses(),
            vec![
                Ipv4Addr::new(10, 0, 1, 250),
                Ipv4Addr::new(10, 0, 1, 251),
                Ipv4Addr::new(10, 0, 2, 250),
                Ipv4Addr::new(10, 0, 2, 251),
            ]
        );
    }

    #[test]
    fn test_enumeration_count_and_order() {
        let range = AddressRange::parse("192.168.1-5.0-255").unwrap();
        let addresses = range.all_addresses();

        assert_eq!(range.len(), 5 * 256);
        assert_eq!(addresses.len(), range.len());
        assert!(addresses.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(addresses.first(), Some(&Ipv4Addr::new(192, 168, 1, 0)));
        assert_eq!(addresses.last(), Some(&Ipv4Addr::new(192, 168, 5, 255)));
    }

    #[test]
    fn test_enumeration_is_restartable() {
        let range = AddressRange::parse("10.1.0.0/24").unwrap();
        assert_eq!(range.all_addresses(), range.all_addresses());
    }

    #[test]
    fn test_display() {
        let range = AddressRange::parse("10.0.0.0/16").unwrap();
        assert_eq!(range.to_string(), "10.0.0-255.0-255");
        let parsed: AddressRange = range.to_string().parse().unwrap();
        assert_eq!(parsed, range);
    }

    #[test]
    fn test_serde_goes_through_parse() {
        let range = AddressRange::parse("10.0.1-2.0-255").unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "\"10.0.1-2.0-255\"");
        assert_eq!(serde_json::from_str::<AddressRange>(&json).unwrap(), range);

        let reversed: AddressRange = serde_json::from_str("\"1.1.1.200-100\"").unwrap();
        assert_eq!(reversed.begin(), Ipv4Addr::new(1, 1, 1, 100));
        assert_eq!(reversed.len(), 101);

        assert!(serde_json::from_str::<AddressRange>(r#"{"begin":[1,1,1,9],"end":[1,1,1,1]}"#).is_err());
        assert!(serde_json::from_str::<AddressRange>("\"1.1.1.1/24\"").is_err());
    }
}
