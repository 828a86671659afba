//! Graph primitives shared by every vertex kind.
//!
//! This module contains the pieces that carry no topology of their own:
//! the [`Vertex`] marker, the [`Edge`] transform abstraction with its
//! concrete 802.1Q and VXLAN codecs, the optional 802.1Q [`Tag`], VLAN sets,
//! and the [`VisitKey`] used to deduplicate work within one flood.

pub mod edge;
pub mod tag;
pub mod visit;
pub mod vlan;

pub use edge::{
    AccessMode, Deliver, DeliverFromVlan, Edge, Identity, Originate, OriginateInVlan, Switchport,
    SwitchportCodec, TrunkMode, VniVlanCodec,
};
pub use tag::{Tag, TagError, MAX_TAG_VALUE};
pub use visit::VisitKey;
pub use vlan::{Vlan, VlanSet, VlanSetError, MAX_VLAN};

/// A node of the flood graph.
///
/// Identity is the [`Vertex::key`] alone, never the vertex's outgoing
/// bindings, so a vertex compares equal to itself however its edges were
/// added. `Data` is the type of the value that flows through the vertex.
pub trait Vertex {
    type Key: Ord + Clone;
    type Data;

    fn key(&self) -> &Self::Key;
}
