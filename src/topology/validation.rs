//! Post-construction consistency checks.
//!
//! The `connect_*` operations on [`Topology`] always write both directions of
//! an adjacency, so a topology built only through them is symmetric. This
//! pass re-derives every reverse edge and reports the first one missing.

use crate::graph::{Deliver, Originate};

use super::arena::{Topology, TopologyError};
use super::ip_interface::IpBinding;
use super::physical::PhysicalBinding;

fn asymmetric(from: impl ToString, to: impl ToString) -> TopologyError {
    TopologyError::Asymmetric {
        from: from.to_string(),
        to: to.to_string(),
    }
}

impl Topology {
    /// Checks that every binding has its matching reverse binding.
    pub fn validate_symmetry(&self) -> Result<(), TopologyError> {
        self.validate_physical_interfaces()?;
        self.validate_ip_interfaces()?;
        self.validate_fabrics()?;
        self.validate_hubs()?;
        self.validate_vnis()?;
        self.validate_vni_hubs()
    }

    fn validate_physical_interfaces(&self) -> Result<(), TopologyError> {
        for physical in self.physical_interfaces() {
            match physical.binding() {
                PhysicalBinding::Unbound => {}
                PhysicalBinding::Ip(ips) => {
                    for (ip, edge) in ips {
                        let ip_interface = self.ip_interface(*ip);
                        let expected = IpBinding::Physical {
                            physical: physical.id(),
                            edge: Originate(edge.0),
                        };
                        if *ip_interface.binding() != expected {
                            return Err(asymmetric(physical.iface(), ip_interface.iface()));
                        }
                    }
                }
                PhysicalBinding::Fabric { fabric, edge } => {
                    let switching_fabric = self.fabric(*fabric);
                    if switching_fabric.physical_interfaces().get(&physical.id()) != Some(edge) {
                        return Err(asymmetric(physical.iface(), switching_fabric.hostname()));
                    }
                }
            }
            if let Some(attachment) = physical.hub() {
                let hub = self.hub(attachment.hub);
                if !hub.attached().contains_key(&physical.id()) {
                    return Err(asymmetric(physical.iface(), hub.name()));
                }
            }
        }
        Ok(())
    }

    fn validate_ip_interfaces(&self) -> Result<(), TopologyError> {
        for ip in self.ip_interfaces() {
            match ip.binding() {
                IpBinding::Unbound => {}
                IpBinding::Physical { physical, edge } => {
                    let port = self.physical_interface(*physical);
                    let reverse = port.ip_interfaces().find(|(id, _)| *id == ip.id());
                    if reverse.map(|(_, deliver)| *deliver) != Some(Deliver(edge.0)) {
                        return Err(asymmetric(ip.iface(), port.iface()));
                    }
                }
                IpBinding::Fabric { fabric, edge } => {
                    let switching_fabric = self.fabric(*fabric);
                    if switching_fabric.ip_interfaces().get(&ip.id()) != Some(&Deliver(edge.0)) {
                        return Err(asymmetric(ip.iface(), switching_fabric.hostname()));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_fabrics(&self) -> Result<(), TopologyError> {
        for fabric in self.fabrics() {
            for (physical, edge) in fabric.physical_interfaces() {
                let port = self.physical_interface(*physical);
                let expected = PhysicalBinding::Fabric {
                    fabric: fabric.id(),
                    edge: edge.clone(),
                };
                if *port.binding() != expected {
                    return Err(asymmetric(fabric.hostname(), port.iface()));
                }
            }
            for (ip, edge) in fabric.ip_interfaces() {
                let ip_interface = self.ip_interface(*ip);
                let expected = IpBinding::Fabric {
                    fabric: fabric.id(),
                    edge: Originate(edge.0),
                };
                if *ip_interface.binding() != expected {
                    return Err(asymmetric(fabric.hostname(), ip_interface.iface()));
                }
            }
            for (vni, edge) in fabric.l2_vnis() {
                let l2_vni = self.l2_vni(*vni);
                let matches = l2_vni
                    .fabric()
                    .is_some_and(|a| a.fabric == fabric.id() && a.edge == *edge);
                if !matches {
                    return Err(asymmetric(fabric.hostname(), l2_vni.node()));
                }
            }
        }
        Ok(())
    }

    fn validate_hubs(&self) -> Result<(), TopologyError> {
        for hub in self.hubs() {
            for physical in hub.attached().keys() {
                let port = self.physical_interface(*physical);
                if port.hub().map(|a| a.hub) != Some(hub.id()) {
                    return Err(asymmetric(hub.name(), port.iface()));
                }
            }
        }
        Ok(())
    }

    fn validate_vnis(&self) -> Result<(), TopologyError> {
        for vni in self.l2_vnis() {
            if let Some(attachment) = vni.fabric() {
                let fabric = self.fabric(attachment.fabric);
                if fabric.l2_vnis().get(&vni.id()) != Some(&attachment.edge) {
                    return Err(asymmetric(vni.node(), fabric.hostname()));
                }
            }
            if let Some(hub) = vni.hub() {
                let segment = self.vni_hub(hub);
                if !segment.members().contains(&vni.id()) {
                    return Err(asymmetric(vni.node(), segment.name()));
                }
            }
        }
        Ok(())
    }

    fn validate_vni_hubs(&self) -> Result<(), TopologyError> {
        for segment in self.vni_hubs() {
            for vni in segment.members() {
                let l2_vni = self.l2_vni(*vni);
                if l2_vni.hub() != Some(segment.id()) {
                    return Err(asymmetric(segment.name(), l2_vni.node()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Deliver, Identity, Tag, VlanSet};
    use crate::topology::{NodeInterfacePair, Topology, TopologyError, VxlanNode};

    fn nip(host: &str, iface: &str) -> NodeInterfacePair {
        NodeInterfacePair::new(host, iface)
    }

    fn wired_topology() -> Topology {
        let mut topology = Topology::new();
        let fabric = topology.add_fabric("sw1").unwrap();
        let hub = topology.add_hub("wire").unwrap();
        let trunk = topology.add_physical_interface(nip("sw1", "swp1")).unwrap();
        let routed = topology.add_physical_interface(nip("r1", "eth0")).unwrap();
        let svi = topology.add_ip_interface(nip("sw1", "vlan10")).unwrap();
        let ip = topology.add_ip_interface(nip("r1", "eth0.10")).unwrap();
        let vni = topology.add_l2_vni(VxlanNode::new("sw1", 10010)).unwrap();
        let segment = topology.add_vni_hub("segment").unwrap();

        topology
            .connect_trunk(trunk, fabric, VlanSet::all(), Some(1))
            .unwrap();
        topology.connect_ip_dot1q(ip, routed, 10).unwrap();
        topology.connect_irb(svi, fabric, 10).unwrap();
        topology.connect_to_hub(hub, trunk).unwrap();
        topology.connect_to_hub(hub, routed).unwrap();
        topology.connect_vni_to_fabric(vni, fabric, 10).unwrap();
        topology.connect_to_vni_hub(segment, vni).unwrap();
        topology
    }

    #[test]
    fn test_connected_topology_is_symmetric() {
        assert_eq!(wired_topology().validate_symmetry(), Ok(()));
        assert_eq!(Topology::new().validate_symmetry(), Ok(()));
    }

    #[test]
    fn test_missing_hub_back_edge_detected() {
        let mut topology = wired_topology();
        let hub = topology.hub_id("wire").unwrap();
        let orphan = topology.add_physical_interface(nip("r2", "eth0")).unwrap();
        // Attach only the hub side.
        topology
            .hub_mut(hub)
            .attach(orphan, "r2:eth0", Identity)
            .unwrap();

        assert_eq!(
            topology.validate_symmetry(),
            Err(TopologyError::Asymmetric {
                from: "wire".to_string(),
                to: "r2:eth0".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_fabric_back_edge_detected() {
        let mut topology = wired_topology();
        let fabric = topology.fabric_id("sw1").unwrap();
        let port = topology.add_physical_interface(nip("sw1", "swp2")).unwrap();
        topology
            .physical_interface_mut(port)
            .bind_fabric(
                fabric,
                crate::graph::Switchport::Access(crate::graph::AccessMode::new(20)),
            )
            .unwrap();

        assert_eq!(
            topology.validate_symmetry(),
            Err(TopologyError::Asymmetric {
                from: "sw1:swp2".to_string(),
                to: "sw1".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_sub_interface_back_edge_detected() {
        let mut topology = wired_topology();
        let routed = topology.physical_id(&nip("r1", "eth0")).unwrap();
        let sub = topology.add_ip_interface(nip("r1", "eth0.20")).unwrap();
        // Only the port side knows about the second sub-interface.
        topology
            .physical_interface_mut(routed)
            .bind_ip(sub, "r1:eth0.20", Deliver(Tag::tagged(20).unwrap()))
            .unwrap();

        assert_eq!(
            topology.validate_symmetry(),
            Err(TopologyError::Asymmetric {
                from: "r1:eth0".to_string(),
                to: "r1:eth0.20".to_string(),
            })
        );
    }

    #[test]
    fn test_mismatched_codec_detected() {
        let mut topology = wired_topology();
        let fabric = topology.fabric_id("sw1").unwrap();
        let port = topology.add_physical_interface(nip("sw1", "swp3")).unwrap();
        topology.connect_access(port, fabric, 30).unwrap();
        // A second physical port claims membership with the first port's codec.
        let other = topology.add_physical_interface(nip("sw1", "swp4")).unwrap();
        topology
            .fabric_mut(fabric)
            .bind_physical(
                other,
                "sw1:swp4",
                crate::graph::Switchport::Access(crate::graph::AccessMode::new(30)),
            )
            .unwrap();

        assert!(matches!(
            topology.validate_symmetry(),
            Err(TopologyError::Asymmetric { .. })
        ));
    }
}
