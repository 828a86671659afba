//! IP-bearing (layer-3) interfaces.

use crate::domain::flood::{Flood, Step};
use crate::graph::{Edge, Originate, OriginateInVlan, Tag, Vertex};

use super::arena::TopologyError;
use super::types::{FabricId, IpId, NodeInterfacePair, PhysicalId};

/// Where an IP interface sends the traffic it originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpBinding {
    #[default]
    Unbound,
    /// Directly on a physical port, untagged or with a fixed 802.1Q tag.
    Physical { physical: PhysicalId, edge: Originate<Tag> },
    /// An SVI/IRB in one VLAN of the device's switching fabric.
    Fabric { fabric: FabricId, edge: OriginateInVlan },
}

impl IpBinding {
    fn describe(&self) -> &'static str {
        match self {
            IpBinding::Unbound => "nothing",
            IpBinding::Physical { .. } => "a physical interface",
            IpBinding::Fabric { .. } => "a switching fabric",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IpInterface {
    id: IpId,
    iface: NodeInterfacePair,
    binding: IpBinding,
}

impl IpInterface {
    pub(crate) fn new(id: IpId, iface: NodeInterfacePair) -> Self {
        Self {
            id,
            iface,
            binding: IpBinding::Unbound,
        }
    }

    pub fn id(&self) -> IpId {
        self.id
    }

    pub fn iface(&self) -> &NodeInterfacePair {
        &self.iface
    }

    pub fn binding(&self) -> &IpBinding {
        &self.binding
    }

    pub(crate) fn check_bind(&self, binding: &IpBinding) -> Result<(), TopologyError> {
        if self.binding != IpBinding::Unbound {
            return Err(TopologyError::AlreadyBound {
                vertex: self.iface.to_string(),
                role: binding.describe(),
                existing: self.binding.describe(),
            });
        }
        Ok(())
    }

    pub(crate) fn bind(&mut self, binding: IpBinding) -> Result<(), TopologyError> {
        self.check_bind(&binding)?;
        self.binding = binding;
        Ok(())
    }

    /// Starts a flood from this interface. A flood has exactly one origin, so
    /// this is never deduplicated.
    pub(crate) fn originate(&self, flood: &mut Flood) {
        flood.add_member(self.id);
        match &self.binding {
            IpBinding::Unbound => {}
            IpBinding::Physical { physical, edge } => {
                if let Some(tag) = edge.transform(()) {
                    flood.push(Step::Transmit(*physical, tag));
                }
            }
            IpBinding::Fabric { fabric, edge } => {
                if let Some(vlan) = edge.transform(()) {
                    flood.push(Step::FloodVlan(*fabric, vlan));
                }
            }
        }
    }

    /// A flooded frame arrived here. Terminal: IP interfaces do not forward.
    pub(crate) fn reached(&self, flood: &mut Flood) {
        flood.add_member(self.id);
    }
}

impl Vertex for IpInterface {
    type Key = NodeInterfacePair;
    type Data = ();

    fn key(&self) -> &NodeInterfacePair {
        &self.iface
    }
}

impl PartialEq for IpInterface {
    fn eq(&self, other: &Self) -> bool {
        self.iface == other.iface
    }
}

impl Eq for IpInterface {}
