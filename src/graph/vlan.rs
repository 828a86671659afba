//! VLAN identifiers and sets of them.
//!
//! Trunk ports carry a set of allowed VLANs, usually written as a
//! comma-separated list of ranges (`"1-100,200,300-310"`). [`VlanSet`]
//! stores that list as sorted, merged ranges.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A VLAN identifier.
pub type Vlan = u16;

/// Highest VLAN id accepted anywhere in a snapshot.
pub const MAX_VLAN: Vlan = 4095;

/// Errors that can occur while parsing a VLAN set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VlanSetError {
    #[error("Invalid VLAN id '{0}'")]
    InvalidVlan(String),

    #[error("VLAN {0} is above the maximum of 4095")]
    OutOfRange(u32),

    #[error("Inverted VLAN range {start}-{end}")]
    InvertedRange { start: Vlan, end: Vlan },
}

/// A set of VLAN ids stored as sorted, non-overlapping, non-adjacent ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VlanSet {
    ranges: Vec<RangeInclusive<Vlan>>,
}

impl VlanSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every VLAN from 1 to 4094, the usual default for a trunk.
    pub fn all() -> Self {
        Self::from_ranges([1..=4094])
    }

    /// Build a set from arbitrary (possibly overlapping) ranges.
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = RangeInclusive<Vlan>>,
    {
        let mut sorted: Vec<RangeInclusive<Vlan>> =
            ranges.into_iter().filter(|r| !r.is_empty()).collect();
        sorted.sort_by_key(|r| *r.start());

        let mut merged: Vec<RangeInclusive<Vlan>> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if u32::from(*range.start()) <= u32::from(*last.end()) + 1 => {
                    if range.end() > last.end() {
                        *last = *last.start()..=*range.end();
                    }
                }
                _ => merged.push(range),
            }
        }
        Self { ranges: merged }
    }

    /// Build a set from individual VLAN ids.
    pub fn of<I>(vlans: I) -> Self
    where
        I: IntoIterator<Item = Vlan>,
    {
        Self::from_ranges(vlans.into_iter().map(|v| v..=v))
    }

    pub fn contains(&self, vlan: Vlan) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if *r.end() < vlan {
                    std::cmp::Ordering::Less
                } else if *r.start() > vlan {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of VLAN ids in the set.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|r| usize::from(*r.end()) - usize::from(*r.start()) + 1)
            .sum()
    }

    pub fn ranges(&self) -> &[RangeInclusive<Vlan>] {
        &self.ranges
    }
}

fn parse_vlan(s: &str) -> Result<Vlan, VlanSetError> {
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|_| VlanSetError::InvalidVlan(s.trim().to_string()))?;
    if value > u32::from(MAX_VLAN) {
        return Err(VlanSetError::OutOfRange(value));
    }
    Ok(value as Vlan)
}

impl FromStr for VlanSet {
    type Err = VlanSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let range = match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (parse_vlan(start)?, parse_vlan(end)?);
                    if start > end {
                        return Err(VlanSetError::InvertedRange { start, end });
                    }
                    start..=end
                }
                None => {
                    let vlan = parse_vlan(part)?;
                    vlan..=vlan
                }
            };
            ranges.push(range);
        }
        Ok(Self::from_ranges(ranges))
    }
}

impl TryFrom<String> for VlanSet {
    type Error = VlanSetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VlanSet> for String {
    fn from(set: VlanSet) -> Self {
        set.to_string()
    }
}

impl fmt::Display for VlanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .ranges
            .iter()
            .map(|r| {
                if r.start() == r.end() {
                    r.start().to_string()
                } else {
                    format!("{}-{}", r.start(), r.end())
                }
            })
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges() {
        let set: VlanSet = "1-10, 20,30-31".parse().unwrap();
        assert!(set.contains(1));
        assert!(set.contains(10));
        assert!(!set.contains(11));
        assert!(set.contains(20));
        assert!(set.contains(31));
        assert!(!set.contains(32));
        assert_eq!(set.len(), 13);
    }

    #[test]
    fn test_overlapping_and_adjacent_ranges_merge() {
        let set = VlanSet::from_ranges([5..=10, 1..=4, 8..=12, 20..=20]);
        assert_eq!(set.ranges(), &[1..=12, 20..=20]);
        assert_eq!(set.to_string(), "1-12,20");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "abc".parse::<VlanSet>(),
            Err(VlanSetError::InvalidVlan("abc".to_string()))
        );
        assert_eq!("4096".parse::<VlanSet>(), Err(VlanSetError::OutOfRange(4096)));
        assert_eq!(
            "10-5".parse::<VlanSet>(),
            Err(VlanSetError::InvertedRange { start: 10, end: 5 })
        );
    }

    #[test]
    fn test_empty_string_is_empty_set() {
        let set: VlanSet = "".parse().unwrap();
        assert!(set.is_empty());
        assert!(!set.contains(1));
    }

    #[test]
    fn test_all_excludes_reserved() {
        let all = VlanSet::all();
        assert!(!all.contains(0));
        assert!(all.contains(1));
        assert!(all.contains(4094));
        assert!(!all.contains(4095));
    }
}
