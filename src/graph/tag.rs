//! 802.1Q tag carried on an Ethernet wire.

use std::fmt;

use serde::Serialize;

use super::vlan::Vlan;

/// Largest value a 12-bit 802.1Q VLAN identifier can hold.
pub const MAX_TAG_VALUE: Vlan = 4095;

/// Errors produced when constructing or reading a [`Tag`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("802.1Q tag {0} is out of range [0, 4095]")]
    OutOfRange(u32),

    #[error("Cannot read the VLAN of an untagged frame")]
    Untagged,
}

/// An optional 802.1Q tag: either untagged or a VLAN id in `[0, 4095]`.
///
/// The inner value is private so a tagged value can only come from
/// [`Tag::tagged`], which enforces the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tag(Option<Vlan>);

impl Tag {
    /// A frame with no 802.1Q header.
    pub const UNTAGGED: Tag = Tag(None);

    /// Build a tagged value, failing for anything outside `[0, 4095]`.
    pub fn tagged(vlan: u32) -> Result<Self, TagError> {
        if vlan > u32::from(MAX_TAG_VALUE) {
            return Err(TagError::OutOfRange(vlan));
        }
        // Range checked above, the cast is lossless.
        Ok(Tag(Some(vlan as Vlan)))
    }

    pub fn is_tagged(&self) -> bool {
        self.0.is_some()
    }

    /// The VLAN carried by this tag.
    ///
    /// Returns [`TagError::Untagged`] for an untagged frame.
    pub fn value(&self) -> Result<Vlan, TagError> {
        self.0.ok_or(TagError::Untagged)
    }

    /// The VLAN carried by this tag, if any.
    pub fn vlan(&self) -> Option<Vlan> {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(vlan) => write!(f, "tag({})", vlan),
            None => write!(f, "untagged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_bounds() {
        assert_eq!(Tag::tagged(0).unwrap().value(), Ok(0));
        assert_eq!(Tag::tagged(4095).unwrap().value(), Ok(4095));
        assert_eq!(Tag::tagged(4096), Err(TagError::OutOfRange(4096)));
        assert_eq!(Tag::tagged(u32::MAX), Err(TagError::OutOfRange(u32::MAX)));
    }

    #[test]
    fn test_untagged_has_no_value() {
        assert!(!Tag::UNTAGGED.is_tagged());
        assert_eq!(Tag::UNTAGGED.value(), Err(TagError::Untagged));
        assert_eq!(Tag::UNTAGGED.vlan(), None);
    }

    #[test]
    fn test_equality() {
        assert_eq!(Tag::UNTAGGED, Tag::UNTAGGED);
        assert_eq!(Tag::tagged(10).unwrap(), Tag::tagged(10).unwrap());
        assert_ne!(Tag::tagged(10).unwrap(), Tag::tagged(11).unwrap());
        assert_ne!(Tag::tagged(0).unwrap(), Tag::UNTAGGED);
    }

    #[test]
    fn test_display() {
        assert_eq!(Tag::UNTAGGED.to_string(), "untagged");
        assert_eq!(Tag::tagged(20).unwrap().to_string(), "tag(20)");
    }
}
