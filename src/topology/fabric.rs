//! The layer-2 switch inside one device.

use std::collections::BTreeMap;

use crate::domain::flood::{Flood, Step};
use crate::graph::{DeliverFromVlan, Edge, Switchport, SwitchportCodec, Vertex, Vlan, VniVlanCodec};

use super::arena::TopologyError;
use super::types::{FabricId, IpId, PhysicalId, VniId};

/// A device's VLAN-aware switching fabric.
///
/// Every member is reached through its own edge: switchport codecs for
/// physical ports, VLAN filters for SVIs/IRBs and VNI codecs for VXLAN.
#[derive(Debug, Clone)]
pub struct SwitchingFabric {
    id: FabricId,
    hostname: String,
    ip_interfaces: BTreeMap<IpId, DeliverFromVlan>,
    physical_interfaces: BTreeMap<PhysicalId, Switchport>,
    l2_vnis: BTreeMap<VniId, VniVlanCodec>,
}

impl SwitchingFabric {
    pub(crate) fn new(id: FabricId, hostname: String) -> Self {
        Self {
            id,
            hostname,
            ip_interfaces: BTreeMap::new(),
            physical_interfaces: BTreeMap::new(),
            l2_vnis: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> FabricId {
        self.id
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn ip_interfaces(&self) -> &BTreeMap<IpId, DeliverFromVlan> {
        &self.ip_interfaces
    }

    pub fn physical_interfaces(&self) -> &BTreeMap<PhysicalId, Switchport> {
        &self.physical_interfaces
    }

    pub fn l2_vnis(&self) -> &BTreeMap<VniId, VniVlanCodec> {
        &self.l2_vnis
    }

    pub(crate) fn check_ip(&self, ip: IpId, member: &str) -> Result<(), TopologyError> {
        if self.ip_interfaces.contains_key(&ip) {
            return Err(self.already_member(member));
        }
        Ok(())
    }

    pub(crate) fn bind_ip(
        &mut self,
        ip: IpId,
        member: &str,
        edge: DeliverFromVlan,
    ) -> Result<(), TopologyError> {
        self.check_ip(ip, member)?;
        self.ip_interfaces.insert(ip, edge);
        Ok(())
    }

    pub(crate) fn check_physical(
        &self,
        physical: PhysicalId,
        member: &str,
    ) -> Result<(), TopologyError> {
        if self.physical_interfaces.contains_key(&physical) {
            return Err(self.already_member(member));
        }
        Ok(())
    }

    pub(crate) fn bind_physical(
        &mut self,
        physical: PhysicalId,
        member: &str,
        edge: Switchport,
    ) -> Result<(), TopologyError> {
        self.check_physical(physical, member)?;
        self.physical_interfaces.insert(physical, edge);
        Ok(())
    }

    pub(crate) fn check_vni(&self, vni: VniId, member: &str) -> Result<(), TopologyError> {
        if self.l2_vnis.contains_key(&vni) {
            return Err(self.already_member(member));
        }
        Ok(())
    }

    pub(crate) fn bind_vni(
        &mut self,
        vni: VniId,
        member: &str,
        edge: VniVlanCodec,
    ) -> Result<(), TopologyError> {
        self.check_vni(vni, member)?;
        self.l2_vnis.insert(vni, edge);
        Ok(())
    }

    fn already_member(&self, member: &str) -> TopologyError {
        TopologyError::AlreadyMember {
            container: format!("switching fabric {}", self.hostname),
            member: member.to_string(),
        }
    }

    /// Floods `vlan` to every member that carries it.
    pub(crate) fn flood_vlan(&self, vlan: Vlan, flood: &mut Flood) {
        if !flood.first_fabric_visit(self.id, vlan) {
            return;
        }
        for (physical, edge) in &self.physical_interfaces {
            if let Some(tag) = edge.send(vlan) {
                flood.push(Step::Transmit(*physical, tag));
            }
        }
        for (ip, edge) in &self.ip_interfaces {
            if edge.transform(vlan).is_some() {
                flood.push(Step::Reached(*ip));
            }
        }
        for (vni, edge) in &self.l2_vnis {
            if edge.from_vlan(vlan).is_some() {
                flood.push(Step::VniTransmit(*vni));
            }
        }
    }
}

impl Vertex for SwitchingFabric {
    type Key = String;
    type Data = Vlan;

    fn key(&self) -> &String {
        &self.hostname
    }
}

impl PartialEq for SwitchingFabric {
    fn eq(&self, other: &Self) -> bool {
        self.hostname == other.hostname
    }
}

impl Eq for SwitchingFabric {}
