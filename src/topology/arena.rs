//! The per-snapshot vertex arena.
//!
//! Vertices live in typed arenas and refer to each other by handle. Every
//! `connect_*` operation writes both directions of an adjacency at once and
//! checks both sides before mutating either, so a failed connect leaves the
//! topology untouched.

use std::collections::BTreeMap;

use crate::graph::{
    AccessMode, Deliver, Identity, Originate, Switchport, Tag, TagError, TrunkMode, Vlan,
    VlanSet, VniVlanCodec,
};

use super::fabric::SwitchingFabric;
use super::hub::Hub;
use super::ip_interface::{IpBinding, IpInterface};
use super::physical::PhysicalInterface;
use super::types::{
    FabricId, HubId, IpId, NodeInterfacePair, PhysicalId, VniHubId, VniId, VxlanNode,
};
use super::vni::{L2Vni, VniHub};

/// Errors raised while building a topology.
///
/// All of them point at a bug in whatever is wiring the graph, not at bad
/// user data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Duplicate {kind} '{key}'")]
    DuplicateVertex { kind: &'static str, key: String },

    #[error("Cannot bind {vertex} to {role}: already bound to {existing}")]
    AlreadyBound {
        vertex: String,
        role: &'static str,
        existing: &'static str,
    },

    #[error("{member} is already attached to {container}")]
    AlreadyMember { container: String, member: String },

    #[error("Invalid 802.1Q encapsulation on {vertex}: {source}")]
    InvalidTag { vertex: String, source: TagError },

    #[error("Asymmetric adjacency: {from} -> {to} has no matching reverse edge")]
    Asymmetric { from: String, to: String },
}

/// Every vertex and edge of one network snapshot.
///
/// Handles returned by a `Topology` are only meaningful for that same
/// topology; looking up a foreign handle panics.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    physical_interfaces: Vec<PhysicalInterface>,
    physical_index: BTreeMap<NodeInterfacePair, PhysicalId>,
    ip_interfaces: Vec<IpInterface>,
    ip_index: BTreeMap<NodeInterfacePair, IpId>,
    fabrics: Vec<SwitchingFabric>,
    fabric_index: BTreeMap<String, FabricId>,
    hubs: Vec<Hub>,
    hub_index: BTreeMap<String, HubId>,
    l2_vnis: Vec<L2Vni>,
    vni_index: BTreeMap<VxlanNode, VniId>,
    vni_hubs: Vec<VniHub>,
    vni_hub_index: BTreeMap<String, VniHubId>,
}

fn insert_key<K: Ord + ToString, H: Copy>(
    index: &mut BTreeMap<K, H>,
    kind: &'static str,
    key: K,
    handle: H,
) -> Result<(), TopologyError> {
    if index.contains_key(&key) {
        return Err(TopologyError::DuplicateVertex {
            kind,
            key: key.to_string(),
        });
    }
    index.insert(key, handle);
    Ok(())
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- vertex creation ------------------------------------------------

    pub fn add_physical_interface(
        &mut self,
        iface: NodeInterfacePair,
    ) -> Result<PhysicalId, TopologyError> {
        let id = PhysicalId(self.physical_interfaces.len());
        insert_key(&mut self.physical_index, "physical interface", iface.clone(), id)?;
        self.physical_interfaces.push(PhysicalInterface::new(id, iface));
        Ok(id)
    }

    pub fn add_ip_interface(&mut self, iface: NodeInterfacePair) -> Result<IpId, TopologyError> {
        let id = IpId(self.ip_interfaces.len());
        insert_key(&mut self.ip_index, "IP interface", iface.clone(), id)?;
        self.ip_interfaces.push(IpInterface::new(id, iface));
        Ok(id)
    }

    pub fn add_fabric(&mut self, hostname: impl Into<String>) -> Result<FabricId, TopologyError> {
        let hostname = hostname.into();
        let id = FabricId(self.fabrics.len());
        insert_key(&mut self.fabric_index, "switching fabric", hostname.clone(), id)?;
        self.fabrics.push(SwitchingFabric::new(id, hostname));
        Ok(id)
    }

    pub fn add_hub(&mut self, name: impl Into<String>) -> Result<HubId, TopologyError> {
        let name = name.into();
        let id = HubId(self.hubs.len());
        insert_key(&mut self.hub_index, "hub", name.clone(), id)?;
        self.hubs.push(Hub::new(id, name));
        Ok(id)
    }

    pub fn add_l2_vni(&mut self, node: VxlanNode) -> Result<VniId, TopologyError> {
        let id = VniId(self.l2_vnis.len());
        insert_key(&mut self.vni_index, "layer-2 VNI", node.clone(), id)?;
        self.l2_vnis.push(L2Vni::new(id, node));
        Ok(id)
    }

    pub fn add_vni_hub(&mut self, name: impl Into<String>) -> Result<VniHubId, TopologyError> {
        let name = name.into();
        let id = VniHubId(self.vni_hubs.len());
        insert_key(&mut self.vni_hub_index, "VXLAN segment", name.clone(), id)?;
        self.vni_hubs.push(VniHub::new(id, name));
        Ok(id)
    }

    // ---- symmetric wiring -----------------------------------------------

    /// Plugs a physical port into a hub.
    pub fn connect_to_hub(
        &mut self,
        hub: HubId,
        physical: PhysicalId,
    ) -> Result<(), TopologyError> {
        let member = self.physical_interfaces[physical.0].iface().to_string();
        self.physical_interfaces[physical.0].check_attach_hub()?;
        self.hubs[hub.0].check_member(physical, &member)?;

        self.physical_interfaces[physical.0].attach_hub(hub, Identity)?;
        self.hubs[hub.0].attach(physical, &member, Identity)
    }

    /// Binds an IP interface directly onto a physical port with the given tag.
    ///
    /// A port accepts several IP interfaces this way, one per routed
    /// sub-interface, but never alongside a switching fabric.
    pub fn connect_ip_to_physical(
        &mut self,
        ip: IpId,
        physical: PhysicalId,
        tag: Tag,
    ) -> Result<(), TopologyError> {
        let member = self.ip_interfaces[ip.0].iface().to_string();
        let ip_binding = IpBinding::Physical {
            physical,
            edge: Originate(tag),
        };
        self.ip_interfaces[ip.0].check_bind(&ip_binding)?;
        self.physical_interfaces[physical.0].check_bind_ip(ip, &member)?;

        self.ip_interfaces[ip.0].bind(ip_binding)?;
        self.physical_interfaces[physical.0].bind_ip(ip, &member, Deliver(tag))
    }

    /// A routed port or sub-interface without 802.1Q encapsulation.
    pub fn connect_ip_untagged(
        &mut self,
        ip: IpId,
        physical: PhysicalId,
    ) -> Result<(), TopologyError> {
        self.connect_ip_to_physical(ip, physical, Tag::UNTAGGED)
    }

    /// A routed sub-interface with 802.1Q encapsulation in `vlan`.
    pub fn connect_ip_dot1q(
        &mut self,
        ip: IpId,
        physical: PhysicalId,
        vlan: Vlan,
    ) -> Result<(), TopologyError> {
        let tag = Tag::tagged(u32::from(vlan)).map_err(|source| TopologyError::InvalidTag {
            vertex: self.ip_interfaces[ip.0].iface().to_string(),
            source,
        })?;
        self.connect_ip_to_physical(ip, physical, tag)
    }

    /// Binds an SVI/IRB to `vlan` of a device fabric.
    pub fn connect_irb(
        &mut self,
        ip: IpId,
        fabric: FabricId,
        vlan: Vlan,
    ) -> Result<(), TopologyError> {
        let member = self.ip_interfaces[ip.0].iface().to_string();
        let ip_binding = IpBinding::Fabric {
            fabric,
            edge: Originate(vlan),
        };
        self.ip_interfaces[ip.0].check_bind(&ip_binding)?;
        self.fabrics[fabric.0].check_ip(ip, &member)?;

        self.ip_interfaces[ip.0].bind(ip_binding)?;
        self.fabrics[fabric.0].bind_ip(ip, &member, Deliver(vlan))
    }

    /// Makes a physical port a switchport of a device fabric.
    pub fn connect_switchport(
        &mut self,
        physical: PhysicalId,
        fabric: FabricId,
        edge: Switchport,
    ) -> Result<(), TopologyError> {
        let member = self.physical_interfaces[physical.0].iface().to_string();
        self.physical_interfaces[physical.0].check_bind_fabric()?;
        self.fabrics[fabric.0].check_physical(physical, &member)?;

        self.physical_interfaces[physical.0].bind_fabric(fabric, edge.clone())?;
        self.fabrics[fabric.0].bind_physical(physical, &member, edge)
    }

    pub fn connect_access(
        &mut self,
        physical: PhysicalId,
        fabric: FabricId,
        vlan: Vlan,
    ) -> Result<(), TopologyError> {
        self.connect_switchport(physical, fabric, Switchport::Access(AccessMode::new(vlan)))
    }

    pub fn connect_trunk(
        &mut self,
        physical: PhysicalId,
        fabric: FabricId,
        allowed: VlanSet,
        native: Option<Vlan>,
    ) -> Result<(), TopologyError> {
        self.connect_switchport(
            physical,
            fabric,
            Switchport::Trunk(TrunkMode::new(allowed, native)),
        )
    }

    /// Bridges a layer-2 VNI into `vlan` of a device fabric.
    pub fn connect_vni_to_fabric(
        &mut self,
        vni: VniId,
        fabric: FabricId,
        vlan: Vlan,
    ) -> Result<(), TopologyError> {
        let member = self.l2_vnis[vni.0].node().to_string();
        let codec = VniVlanCodec::new(vlan);
        self.l2_vnis[vni.0].check_bind_fabric()?;
        self.fabrics[fabric.0].check_vni(vni, &member)?;

        self.l2_vnis[vni.0].bind_fabric(fabric, codec)?;
        self.fabrics[fabric.0].bind_vni(vni, &member, codec)
    }

    /// Joins a layer-2 VNI to a VXLAN segment.
    pub fn connect_to_vni_hub(&mut self, hub: VniHubId, vni: VniId) -> Result<(), TopologyError> {
        let member = self.l2_vnis[vni.0].node().to_string();
        self.l2_vnis[vni.0].check_attach_hub()?;
        self.vni_hubs[hub.0].check_member(vni, &member)?;

        self.l2_vnis[vni.0].attach_hub(hub)?;
        self.vni_hubs[hub.0].attach(vni, &member)
    }

    // ---- lookups --------------------------------------------------------

    pub fn physical_interface(&self, id: PhysicalId) -> &PhysicalInterface {
        &self.physical_interfaces[id.0]
    }

    pub fn physical_id(&self, iface: &NodeInterfacePair) -> Option<PhysicalId> {
        self.physical_index.get(iface).copied()
    }

    pub fn physical_interfaces(&self) -> impl Iterator<Item = &PhysicalInterface> + '_ {
        self.physical_interfaces.iter()
    }

    pub fn ip_interface(&self, id: IpId) -> &IpInterface {
        &self.ip_interfaces[id.0]
    }

    pub fn ip_id(&self, iface: &NodeInterfacePair) -> Option<IpId> {
        self.ip_index.get(iface).copied()
    }

    /// IP interfaces in creation order.
    pub fn ip_interfaces(&self) -> impl Iterator<Item = &IpInterface> + '_ {
        self.ip_interfaces.iter()
    }

    pub fn fabric(&self, id: FabricId) -> &SwitchingFabric {
        &self.fabrics[id.0]
    }

    pub fn fabric_id(&self, hostname: &str) -> Option<FabricId> {
        self.fabric_index.get(hostname).copied()
    }

    pub fn fabrics(&self) -> impl Iterator<Item = &SwitchingFabric> + '_ {
        self.fabrics.iter()
    }

    pub fn hub(&self, id: HubId) -> &Hub {
        &self.hubs[id.0]
    }

    pub fn hub_id(&self, name: &str) -> Option<HubId> {
        self.hub_index.get(name).copied()
    }

    pub fn hubs(&self) -> impl Iterator<Item = &Hub> + '_ {
        self.hubs.iter()
    }

    pub fn l2_vni(&self, id: VniId) -> &L2Vni {
        &self.l2_vnis[id.0]
    }

    pub fn vni_id(&self, node: &VxlanNode) -> Option<VniId> {
        self.vni_index.get(node).copied()
    }

    pub fn l2_vnis(&self) -> impl Iterator<Item = &L2Vni> + '_ {
        self.l2_vnis.iter()
    }

    pub fn vni_hub(&self, id: VniHubId) -> &VniHub {
        &self.vni_hubs[id.0]
    }

    pub fn vni_hubs(&self) -> impl Iterator<Item = &VniHub> + '_ {
        self.vni_hubs.iter()
    }

    pub fn ip_interface_count(&self) -> usize {
        self.ip_interfaces.len()
    }

    #[cfg(test)]
    pub(crate) fn physical_interface_mut(&mut self, id: PhysicalId) -> &mut PhysicalInterface {
        &mut self.physical_interfaces[id.0]
    }

    #[cfg(test)]
    pub(crate) fn hub_mut(&mut self, id: HubId) -> &mut Hub {
        &mut self.hubs[id.0]
    }

    #[cfg(test)]
    pub(crate) fn fabric_mut(&mut self, id: FabricId) -> &mut SwitchingFabric {
        &mut self.fabrics[id.0]
    }
}
