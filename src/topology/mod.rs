//! Network topology module.
//!
//! This module contains the flood graph of one snapshot: the concrete vertex
//! kinds, the [`Topology`] arena that owns them, and the symmetry check run
//! after construction.

pub mod arena;
pub mod fabric;
pub mod hub;
pub mod ip_interface;
pub mod physical;
pub mod types;
pub mod validation;
pub mod vni;

// Re-export key types for easier access
pub use arena::{Topology, TopologyError};
pub use fabric::SwitchingFabric;
pub use hub::Hub;
pub use ip_interface::{IpBinding, IpInterface};
pub use physical::{HubAttachment, PhysicalBinding, PhysicalInterface};
pub use types::{FabricId, HubId, IpId, NodeInterfacePair, PhysicalId, VniHubId, VniId, VxlanNode};
pub use vni::{FabricAttachment, L2Vni, VniHub};
