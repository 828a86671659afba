//! VXLAN layer-2 VNIs and the segments joining them.
//!
//! An [`L2Vni`] bridges one VLAN of a device fabric into a VXLAN segment; a
//! [`VniHub`] is that segment, joining the VNIs of every device that shares
//! it. Together they let a VLAN flood cross the underlay.

use std::collections::BTreeSet;

use crate::domain::flood::{Flood, Step};
use crate::graph::{Vertex, VniVlanCodec};

use super::arena::TopologyError;
use super::types::{FabricId, VniHubId, VniId, VxlanNode};

/// The fabric a VNI is bridged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FabricAttachment {
    pub fabric: FabricId,
    pub edge: VniVlanCodec,
}

#[derive(Debug, Clone)]
pub struct L2Vni {
    id: VniId,
    node: VxlanNode,
    fabric: Option<FabricAttachment>,
    hub: Option<VniHubId>,
}

impl L2Vni {
    pub(crate) fn new(id: VniId, node: VxlanNode) -> Self {
        Self {
            id,
            node,
            fabric: None,
            hub: None,
        }
    }

    pub fn id(&self) -> VniId {
        self.id
    }

    pub fn node(&self) -> &VxlanNode {
        &self.node
    }

    pub fn fabric(&self) -> Option<&FabricAttachment> {
        self.fabric.as_ref()
    }

    pub fn hub(&self) -> Option<VniHubId> {
        self.hub
    }

    pub(crate) fn check_bind_fabric(&self) -> Result<(), TopologyError> {
        if self.fabric.is_some() {
            return Err(TopologyError::AlreadyBound {
                vertex: self.node.to_string(),
                role: "a switching fabric",
                existing: "a switching fabric",
            });
        }
        Ok(())
    }

    pub(crate) fn bind_fabric(
        &mut self,
        fabric: FabricId,
        edge: VniVlanCodec,
    ) -> Result<(), TopologyError> {
        self.check_bind_fabric()?;
        self.fabric = Some(FabricAttachment { fabric, edge });
        Ok(())
    }

    pub(crate) fn check_attach_hub(&self) -> Result<(), TopologyError> {
        if self.hub.is_some() {
            return Err(TopologyError::AlreadyBound {
                vertex: self.node.to_string(),
                role: "a VXLAN segment",
                existing: "a VXLAN segment",
            });
        }
        Ok(())
    }

    pub(crate) fn attach_hub(&mut self, hub: VniHubId) -> Result<(), TopologyError> {
        self.check_attach_hub()?;
        self.hub = Some(hub);
        Ok(())
    }

    /// Encapsulates into the VXLAN segment.
    pub(crate) fn transmit(&self, flood: &mut Flood) {
        if let Some(hub) = self.hub {
            flood.push(Step::FloodVni(hub));
        }
    }

    /// Decapsulates from the VXLAN segment into the bound VLAN.
    pub(crate) fn receive(&self, flood: &mut Flood) {
        if let Some(attachment) = &self.fabric {
            if let Some(vlan) = attachment.edge.to_vlan(()) {
                flood.push(Step::FloodVlan(attachment.fabric, vlan));
            }
        }
    }
}

impl Vertex for L2Vni {
    type Key = VxlanNode;
    type Data = ();

    fn key(&self) -> &VxlanNode {
        &self.node
    }
}

/// One VXLAN layer-2 segment.
#[derive(Debug, Clone)]
pub struct VniHub {
    id: VniHubId,
    name: String,
    members: BTreeSet<VniId>,
}

impl VniHub {
    pub(crate) fn new(id: VniHubId, name: String) -> Self {
        Self {
            id,
            name,
            members: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> VniHubId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &BTreeSet<VniId> {
        &self.members
    }

    pub(crate) fn check_member(&self, vni: VniId, member: &str) -> Result<(), TopologyError> {
        if self.members.contains(&vni) {
            return Err(TopologyError::AlreadyMember {
                container: format!("VXLAN segment {}", self.name),
                member: member.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn attach(&mut self, vni: VniId, member: &str) -> Result<(), TopologyError> {
        self.check_member(vni, member)?;
        self.members.insert(vni);
        Ok(())
    }

    pub(crate) fn flood(&self, flood: &mut Flood) {
        if !flood.first_vni_hub_visit(self.id) {
            return;
        }
        for vni in &self.members {
            flood.push(Step::VniReceive(*vni));
        }
    }
}

impl Vertex for VniHub {
    type Key = String;
    type Data = ();

    fn key(&self) -> &String {
        &self.name
    }
}
