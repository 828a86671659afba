//! Edge transforms.
//!
//! An edge is a pure function from the data flowing out of one vertex to the
//! data arriving at the next. Returning `None` means the frame does not make
//! it across (wrong VLAN, tagged frame on an access port, ...). Edges own no
//! vertices and hold no mutable state.

use super::tag::Tag;
use super::vlan::{Vlan, VlanSet};

/// A pure, total transform from `In` to an optional `Out`.
pub trait Edge<In, Out> {
    fn transform(&self, input: In) -> Option<Out>;
}

/// Passes data through unchanged. Used for plain wires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> Edge<T, T> for Identity {
    fn transform(&self, input: T) -> Option<T> {
        Some(input)
    }
}

/// Always emits a fixed value: traffic originated by an IP interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Originate<D>(pub D);

impl<D: Copy> Edge<(), D> for Originate<D> {
    fn transform(&self, _input: ()) -> Option<D> {
        Some(self.0)
    }
}

/// Accepts only the fixed value it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deliver<D>(pub D);

impl<D: PartialEq> Edge<D, ()> for Deliver<D> {
    fn transform(&self, input: D) -> Option<()> {
        (input == self.0).then_some(())
    }
}

/// SVI/IRB origination: an IP interface always sends into its VLAN.
pub type OriginateInVlan = Originate<Vlan>;

/// SVI/IRB delivery: an IP interface only hears flooding in its own VLAN.
pub type DeliverFromVlan = Deliver<Vlan>;

/// How a switchport maps between wire tags and fabric VLANs.
pub trait SwitchportCodec {
    /// Wire → fabric.
    fn receive(&self, tag: Tag) -> Option<Vlan>;

    /// Fabric → wire.
    fn send(&self, vlan: Vlan) -> Option<Tag>;
}

/// Access port carrying a single untagged VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessMode {
    pub vlan: Vlan,
}

impl AccessMode {
    pub fn new(vlan: Vlan) -> Self {
        Self { vlan }
    }
}

impl SwitchportCodec for AccessMode {
    fn receive(&self, tag: Tag) -> Option<Vlan> {
        (!tag.is_tagged()).then_some(self.vlan)
    }

    fn send(&self, vlan: Vlan) -> Option<Tag> {
        (vlan == self.vlan).then_some(Tag::UNTAGGED)
    }
}

/// 802.1Q trunk carrying a set of VLANs, one of which may be native.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrunkMode {
    pub allowed: VlanSet,
    pub native: Option<Vlan>,
}

impl TrunkMode {
    pub fn new(allowed: VlanSet, native: Option<Vlan>) -> Self {
        Self { allowed, native }
    }
}

impl SwitchportCodec for TrunkMode {
    fn receive(&self, tag: Tag) -> Option<Vlan> {
        // A frame explicitly tagged with the native VLAN is ambiguous on the wire.
        if tag.is_tagged() && tag.vlan() == self.native {
            return None;
        }
        let effective = tag.vlan().or(self.native)?;
        self.allowed.contains(effective).then_some(effective)
    }

    fn send(&self, vlan: Vlan) -> Option<Tag> {
        if !self.allowed.contains(vlan) {
            return None;
        }
        if self.native == Some(vlan) {
            return Some(Tag::UNTAGGED);
        }
        Tag::tagged(u32::from(vlan)).ok()
    }
}

/// The codec a fabric uses on one of its physical ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Switchport {
    Access(AccessMode),
    Trunk(TrunkMode),
}

impl SwitchportCodec for Switchport {
    fn receive(&self, tag: Tag) -> Option<Vlan> {
        match self {
            Switchport::Access(access) => access.receive(tag),
            Switchport::Trunk(trunk) => trunk.receive(tag),
        }
    }

    fn send(&self, vlan: Vlan) -> Option<Tag> {
        match self {
            Switchport::Access(access) => access.send(vlan),
            Switchport::Trunk(trunk) => trunk.send(vlan),
        }
    }
}

/// Binds a VXLAN layer-2 VNI to a local VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VniVlanCodec {
    pub vlan: Vlan,
}

impl VniVlanCodec {
    pub fn new(vlan: Vlan) -> Self {
        Self { vlan }
    }

    /// Traffic decapsulated from the VNI enters the bound VLAN.
    pub fn to_vlan(&self, _input: ()) -> Option<Vlan> {
        Some(self.vlan)
    }

    /// Only the bound VLAN is encapsulated into the VNI.
    pub fn from_vlan(&self, vlan: Vlan) -> Option<()> {
        (vlan == self.vlan).then_some(())
    }
}
