//! Topology key and handle types.
//!
//! Vertices are identified by stable keys (hostname, interface name, hub id)
//! and referenced inside the arena by small typed handles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A (hostname, interface name) pair naming one interface in the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeInterfacePair {
    pub hostname: String,
    pub interface: String,
}

impl NodeInterfacePair {
    pub fn new(hostname: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            interface: interface.into(),
        }
    }
}

impl fmt::Display for NodeInterfacePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hostname, self.interface)
    }
}

impl FromStr for NodeInterfacePair {
    type Err = String;

    /// Parses `HOST:IFACE`. The split happens at the first colon, so
    /// interface names may themselves contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((hostname, interface)) if !hostname.is_empty() && !interface.is_empty() => {
                Ok(Self::new(hostname, interface))
            }
            _ => Err(format!("Expected HOST:INTERFACE, got '{}'", s)),
        }
    }
}

/// A layer-2 VNI on one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VxlanNode {
    pub hostname: String,
    pub vni: u32,
}

impl VxlanNode {
    pub fn new(hostname: impl Into<String>, vni: u32) -> Self {
        Self {
            hostname: hostname.into(),
            vni,
        }
    }
}

impl fmt::Display for VxlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:vni-{}", self.hostname, self.vni)
    }
}

macro_rules! arena_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the vertex in its arena.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_handle!(
    /// Handle to a [`PhysicalInterface`](super::PhysicalInterface).
    PhysicalId
);
arena_handle!(
    /// Handle to an [`IpInterface`](super::IpInterface).
    IpId
);
arena_handle!(
    /// Handle to a [`SwitchingFabric`](super::SwitchingFabric).
    FabricId
);
arena_handle!(
    /// Handle to a [`Hub`](super::Hub).
    HubId
);
arena_handle!(
    /// Handle to an [`L2Vni`](super::L2Vni).
    VniId
);
arena_handle!(
    /// Handle to a [`VniHub`](super::VniHub).
    VniHubId
);
