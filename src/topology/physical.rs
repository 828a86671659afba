//! Physical (or aggregated) Ethernet ports.

use std::collections::BTreeMap;

use log::trace;

use crate::domain::flood::{Flood, Step};
use crate::graph::{Deliver, Edge, Identity, Switchport, SwitchportCodec, Tag, Vertex};

use super::arena::TopologyError;
use super::types::{FabricId, HubId, IpId, NodeInterfacePair, PhysicalId};

/// What a physical port hands received frames to.
///
/// A port either terminates L3 directly or is a switchport, never both. A
/// routed port may carry any number of IP interfaces, such as the port
/// itself plus its 802.1Q sub-interfaces, each behind its own tag filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhysicalBinding {
    #[default]
    Unbound,
    /// Frames go straight to IP interfaces (routed port or sub-interfaces).
    Ip(BTreeMap<IpId, Deliver<Tag>>),
    /// Frames enter the device's switching fabric through a switchport codec.
    Fabric { fabric: FabricId, edge: Switchport },
}

impl PhysicalBinding {
    fn describe(&self) -> &'static str {
        match self {
            PhysicalBinding::Unbound => "nothing",
            PhysicalBinding::Ip(_) => "an IP interface",
            PhysicalBinding::Fabric { .. } => "a switching fabric",
        }
    }
}

/// The wire between a port and the hub it is plugged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubAttachment {
    pub hub: HubId,
    pub edge: Identity,
}

#[derive(Debug, Clone)]
pub struct PhysicalInterface {
    id: PhysicalId,
    iface: NodeInterfacePair,
    binding: PhysicalBinding,
    hub: Option<HubAttachment>,
}

impl PhysicalInterface {
    pub(crate) fn new(id: PhysicalId, iface: NodeInterfacePair) -> Self {
        Self {
            id,
            iface,
            binding: PhysicalBinding::Unbound,
            hub: None,
        }
    }

    pub fn id(&self) -> PhysicalId {
        self.id
    }

    pub fn iface(&self) -> &NodeInterfacePair {
        &self.iface
    }

    pub fn binding(&self) -> &PhysicalBinding {
        &self.binding
    }

    pub fn hub(&self) -> Option<&HubAttachment> {
        self.hub.as_ref()
    }

    /// IP interfaces bound directly to this port, with their tag filters.
    pub fn ip_interfaces(&self) -> impl Iterator<Item = (IpId, &Deliver<Tag>)> + '_ {
        let ips = match &self.binding {
            PhysicalBinding::Ip(ips) => Some(ips),
            _ => None,
        };
        ips.into_iter().flatten().map(|(ip, edge)| (*ip, edge))
    }

    pub(crate) fn check_bind_ip(&self, ip: IpId, member: &str) -> Result<(), TopologyError> {
        match &self.binding {
            PhysicalBinding::Unbound => Ok(()),
            PhysicalBinding::Ip(ips) if ips.contains_key(&ip) => {
                Err(TopologyError::AlreadyMember {
                    container: format!("physical interface {}", self.iface),
                    member: member.to_string(),
                })
            }
            PhysicalBinding::Ip(_) => Ok(()),
            existing @ PhysicalBinding::Fabric { .. } => Err(TopologyError::AlreadyBound {
                vertex: self.iface.to_string(),
                role: "an IP interface",
                existing: existing.describe(),
            }),
        }
    }

    pub(crate) fn bind_ip(
        &mut self,
        ip: IpId,
        member: &str,
        edge: Deliver<Tag>,
    ) -> Result<(), TopologyError> {
        self.check_bind_ip(ip, member)?;
        match &mut self.binding {
            PhysicalBinding::Ip(ips) => {
                ips.insert(ip, edge);
            }
            binding => *binding = PhysicalBinding::Ip(BTreeMap::from([(ip, edge)])),
        }
        Ok(())
    }

    pub(crate) fn check_bind_fabric(&self) -> Result<(), TopologyError> {
        if self.binding != PhysicalBinding::Unbound {
            return Err(TopologyError::AlreadyBound {
                vertex: self.iface.to_string(),
                role: "a switching fabric",
                existing: self.binding.describe(),
            });
        }
        Ok(())
    }

    pub(crate) fn bind_fabric(
        &mut self,
        fabric: FabricId,
        edge: Switchport,
    ) -> Result<(), TopologyError> {
        self.check_bind_fabric()?;
        self.binding = PhysicalBinding::Fabric { fabric, edge };
        Ok(())
    }

    pub(crate) fn check_attach_hub(&self) -> Result<(), TopologyError> {
        if self.hub.is_some() {
            return Err(TopologyError::AlreadyBound {
                vertex: self.iface.to_string(),
                role: "a hub",
                existing: "a hub",
            });
        }
        Ok(())
    }

    pub(crate) fn attach_hub(&mut self, hub: HubId, edge: Identity) -> Result<(), TopologyError> {
        self.check_attach_hub()?;
        self.hub = Some(HubAttachment { hub, edge });
        Ok(())
    }

    /// Puts a frame on the wire towards the attached hub, if any.
    pub(crate) fn transmit(&self, tag: Tag, flood: &mut Flood) {
        if let Some(attachment) = &self.hub {
            if let Some(out) = attachment.edge.transform(tag) {
                flood.push(Step::FloodTag(attachment.hub, out));
            }
        }
    }

    /// Hands a frame from the wire to whatever this port is bound to.
    pub(crate) fn receive(&self, tag: Tag, flood: &mut Flood) {
        match &self.binding {
            PhysicalBinding::Unbound => {
                trace!("Frame {} dropped at unbound port {}", tag, self.iface);
            }
            PhysicalBinding::Ip(ips) => {
                for (ip, edge) in ips {
                    if edge.transform(tag).is_some() {
                        flood.push(Step::Reached(*ip));
                    }
                }
            }
            PhysicalBinding::Fabric { fabric, edge } => {
                if let Some(vlan) = edge.receive(tag) {
                    flood.push(Step::FloodVlan(*fabric, vlan));
                }
            }
        }
    }
}

impl Vertex for PhysicalInterface {
    type Key = NodeInterfacePair;
    type Data = Tag;

    fn key(&self) -> &NodeInterfacePair {
        &self.iface
    }
}

impl PartialEq for PhysicalInterface {
    fn eq(&self, other: &Self) -> bool {
        self.iface == other.iface
    }
}

impl Eq for PhysicalInterface {}
