//! Broadcast domain computation.
//!
//! [`BroadcastDomainComputer`] owns the topology of one snapshot and
//! partitions its IP interfaces into numbered broadcast domains. Each domain
//! is flooded exactly once: the first unassigned interface found in arena
//! order originates a flood, and every interface the flood reaches gets the
//! same id.

pub mod flood;

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::builder;
use crate::config::Snapshot;
use crate::topology::{NodeInterfacePair, Topology, TopologyError};

pub use flood::{Flood, FloodOutcome, FloodStats};

/// Identifier of one broadcast domain within a single computation.
///
/// Ids are dense, start at 0 and follow the order in which domains were
/// discovered. They carry no meaning across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DomainId(pub u32);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The finished interface → domain mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainAssignment {
    domains: BTreeMap<NodeInterfacePair, DomainId>,
    floods: Vec<FloodStats>,
}

impl DomainAssignment {
    pub fn get(&self, iface: &NodeInterfacePair) -> Option<DomainId> {
        self.domains.get(iface).copied()
    }

    /// Number of interfaces with an assigned domain.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Number of distinct domains.
    pub fn domain_count(&self) -> usize {
        self.floods.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeInterfacePair, DomainId)> + '_ {
        self.domains.iter().map(|(iface, id)| (iface, *id))
    }

    /// Members of every domain, grouped by id.
    pub fn domains(&self) -> BTreeMap<DomainId, Vec<NodeInterfacePair>> {
        let mut grouped: BTreeMap<DomainId, Vec<NodeInterfacePair>> = BTreeMap::new();
        for (iface, id) in &self.domains {
            grouped.entry(*id).or_default().push(iface.clone());
        }
        grouped
    }

    /// Statistics of the flood that discovered `id`.
    pub fn flood_stats(&self, id: DomainId) -> Option<&FloodStats> {
        self.floods.get(id.0 as usize)
    }
}

/// Runs the per-snapshot domain computation.
#[derive(Debug)]
pub struct BroadcastDomainComputer {
    topology: Topology,
}

impl BroadcastDomainComputer {
    pub fn new(topology: Topology) -> Self {
        Self { topology }
    }

    /// Builds the topology for `snapshot` and wraps it.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, TopologyError> {
        builder::build_topology(snapshot).map(Self::new)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Partitions every IP interface of the topology into broadcast domains.
    pub fn find_all_broadcast_domains(&self) -> DomainAssignment {
        let mut assignment = DomainAssignment::default();
        let mut next_id: u32 = 0;

        for ip in self.topology.ip_interfaces() {
            if assignment.domains.contains_key(ip.iface()) {
                continue;
            }

            let outcome = Flood::run(&self.topology, ip.id());
            let id = DomainId(next_id);
            next_id += 1;

            debug!(
                "Domain {} from {}: {} members, {} steps, {} revisits skipped",
                id,
                ip.iface(),
                outcome.members.len(),
                outcome.stats.steps,
                outcome.stats.revisits_skipped
            );

            for member in &outcome.members {
                let iface = self.topology.ip_interface(*member).iface().clone();
                assignment.domains.insert(iface, id);
            }
            assignment.floods.push(outcome.stats);
        }

        info!(
            "Assigned {} IP interfaces to {} broadcast domains",
            assignment.len(),
            assignment.domain_count()
        );
        assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VlanSet;
    use crate::topology::VxlanNode;

    fn nip(host: &str, iface: &str) -> NodeInterfacePair {
        NodeInterfacePair::new(host, iface)
    }

    fn domain_of(assignment: &DomainAssignment, host: &str, iface: &str) -> DomainId {
        assignment
            .get(&nip(host, iface))
            .unwrap_or_else(|| panic!("{}:{} has no domain", host, iface))
    }

    /// Three routers with routed ports on one shared segment.
    fn shared_segment() -> Topology {
        let mut topology = Topology::new();
        let hub = topology.add_hub("segment").unwrap();
        for host in ["r1", "r2", "r3"] {
            let port = topology.add_physical_interface(nip(host, "eth0")).unwrap();
            let ip = topology.add_ip_interface(nip(host, "eth0")).unwrap();
            topology.connect_ip_untagged(ip, port).unwrap();
            topology.connect_to_hub(hub, port).unwrap();
        }
        topology
    }

    #[test]
    fn test_hub_fan_out() {
        let computer = BroadcastDomainComputer::new(shared_segment());
        let assignment = computer.find_all_broadcast_domains();

        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment.domain_count(), 1);
        let id = domain_of(&assignment, "r1", "eth0");
        assert_eq!(id, DomainId(0));
        assert_eq!(domain_of(&assignment, "r2", "eth0"), id);
        assert_eq!(domain_of(&assignment, "r3", "eth0"), id);

        // One tag value crossed the hub, so the hub flooded exactly once.
        let stats = assignment.flood_stats(id).unwrap();
        assert_eq!(stats.hub_floods, 1);
        assert_eq!(stats.revisits_skipped, 0);
    }

    #[test]
    fn test_flood_from_any_member_reaches_the_others() {
        let topology = shared_segment();
        for host in ["r1", "r2", "r3"] {
            let origin = topology.ip_id(&nip(host, "eth0")).unwrap();
            let outcome = Flood::run(&topology, origin);
            assert_eq!(outcome.members.len(), 3);
            assert_eq!(outcome.stats.hub_floods, 1);
        }
    }

    #[test]
    fn test_unbound_ip_interface_is_its_own_domain() {
        let mut topology = shared_segment();
        topology.add_ip_interface(nip("r4", "tunnel0")).unwrap();
        let assignment = BroadcastDomainComputer::new(topology).find_all_broadcast_domains();

        assert_eq!(assignment.domain_count(), 2);
        assert_eq!(domain_of(&assignment, "r4", "tunnel0"), DomainId(1));
    }

    #[test]
    fn test_vlans_on_a_trunk_stay_isolated() {
        let mut topology = Topology::new();
        let fabric = topology.add_fabric("sw1").unwrap();
        let hub = topology.add_hub("wire").unwrap();

        let trunk = topology.add_physical_interface(nip("sw1", "swp1")).unwrap();
        topology
            .connect_trunk(trunk, fabric, VlanSet::of([10, 20]), None)
            .unwrap();
        topology.connect_to_hub(hub, trunk).unwrap();

        for (vlan, host) in [(10, "r1"), (20, "r2")] {
            let svi = topology
                .add_ip_interface(nip("sw1", &format!("vlan{}", vlan)))
                .unwrap();
            topology.connect_irb(svi, fabric, vlan).unwrap();

            let port = topology.add_physical_interface(nip(host, "eth0")).unwrap();
            let sub = topology
                .add_ip_interface(nip(host, &format!("eth0.{}", vlan)))
                .unwrap();
            topology.connect_ip_dot1q(sub, port, vlan).unwrap();
            topology.connect_to_hub(hub, port).unwrap();
        }

        let assignment = BroadcastDomainComputer::new(topology).find_all_broadcast_domains();
        assert_eq!(assignment.domain_count(), 2);
        assert_eq!(
            domain_of(&assignment, "sw1", "vlan10"),
            domain_of(&assignment, "r1", "eth0.10")
        );
        assert_eq!(
            domain_of(&assignment, "sw1", "vlan20"),
            domain_of(&assignment, "r2", "eth0.20")
        );
        assert_ne!(
            domain_of(&assignment, "r1", "eth0.10"),
            domain_of(&assignment, "r2", "eth0.20")
        );
    }

    #[test]
    fn test_parallel_trunks_do_not_loop_forever() {
        let mut topology = Topology::new();
        let wires = [
            topology.add_hub("wire-a").unwrap(),
            topology.add_hub("wire-b").unwrap(),
        ];
        for host in ["sw1", "sw2"] {
            let fabric = topology.add_fabric(host).unwrap();
            for (port_name, hub) in ["swp1", "swp2"].into_iter().zip(wires) {
                let port = topology.add_physical_interface(nip(host, port_name)).unwrap();
                topology
                    .connect_trunk(port, fabric, VlanSet::all(), Some(1))
                    .unwrap();
                topology.connect_to_hub(hub, port).unwrap();
            }
            let svi = topology.add_ip_interface(nip(host, "vlan10")).unwrap();
            topology.connect_irb(svi, fabric, 10).unwrap();
        }

        let assignment = BroadcastDomainComputer::new(topology).find_all_broadcast_domains();
        assert_eq!(assignment.domain_count(), 1);
        let stats = assignment.flood_stats(DomainId(0)).unwrap();
        assert_eq!(stats.fabric_floods, 2);
        assert_eq!(stats.hub_floods, 2);
        assert!(stats.revisits_skipped > 0);
    }

    #[test]
    fn test_vxlan_bridges_different_local_vlans() {
        let mut topology = Topology::new();
        let segment = topology.add_vni_hub("vni-10010").unwrap();
        for (host, vlan) in [("leaf1", 10), ("leaf2", 20)] {
            let fabric = topology.add_fabric(host).unwrap();
            let vni = topology.add_l2_vni(VxlanNode::new(host, 10010)).unwrap();
            topology.connect_vni_to_fabric(vni, fabric, vlan).unwrap();
            topology.connect_to_vni_hub(segment, vni).unwrap();
            let irb = topology
                .add_ip_interface(nip(host, &format!("vlan{}", vlan)))
                .unwrap();
            topology.connect_irb(irb, fabric, vlan).unwrap();
        }
        let leaf2 = topology.fabric_id("leaf2").unwrap();
        let local = topology.add_ip_interface(nip("leaf2", "vlan10")).unwrap();
        topology.connect_irb(local, leaf2, 10).unwrap();

        let assignment = BroadcastDomainComputer::new(topology).find_all_broadcast_domains();
        assert_eq!(
            domain_of(&assignment, "leaf1", "vlan10"),
            domain_of(&assignment, "leaf2", "vlan20")
        );
        assert_ne!(
            domain_of(&assignment, "leaf1", "vlan10"),
            domain_of(&assignment, "leaf2", "vlan10")
        );
        let stats = assignment
            .flood_stats(domain_of(&assignment, "leaf1", "vlan10"))
            .unwrap();
        assert_eq!(stats.vni_hub_floods, 1);
    }

    #[test]
    fn test_irb_over_access_port_to_routed_port() {
        let mut topology = Topology::new();
        let fabric = topology.add_fabric("D1").unwrap();
        let irb = topology.add_ip_interface(nip("D1", "irb.10")).unwrap();
        topology.connect_irb(irb, fabric, 10).unwrap();
        let d1_port = topology.add_physical_interface(nip("D1", "swp1")).unwrap();
        topology.connect_access(d1_port, fabric, 10).unwrap();

        let d2_port = topology.add_physical_interface(nip("D2", "swp1")).unwrap();
        let d2_ip = topology.add_ip_interface(nip("D2", "swp1")).unwrap();
        topology.connect_ip_untagged(d2_ip, d2_port).unwrap();

        // A point-to-point cable is a hub with two ports.
        let wire = topology.add_hub("D1:swp1 <-> D2:swp1").unwrap();
        topology.connect_to_hub(wire, d1_port).unwrap();
        topology.connect_to_hub(wire, d2_port).unwrap();
        topology.validate_symmetry().unwrap();

        let assignment = BroadcastDomainComputer::new(topology).find_all_broadcast_domains();
        assert_eq!(assignment.len(), 2);
        assert_eq!(
            domain_of(&assignment, "D1", "irb.10"),
            domain_of(&assignment, "D2", "swp1")
        );
        assert_eq!(assignment.get(&nip("D3", "lo0")), None);
    }

    #[test]
    fn test_long_switch_chain_floods_without_recursion() {
        const CHAIN: usize = 100_000;
        let mut topology = Topology::new();
        let mut previous = None;
        for i in 0..CHAIN {
            let host = format!("sw{}", i);
            let fabric = topology.add_fabric(host.as_str()).unwrap();
            let up = topology.add_physical_interface(nip(&host, "up")).unwrap();
            let down = topology.add_physical_interface(nip(&host, "down")).unwrap();
            topology.connect_access(up, fabric, 10).unwrap();
            topology.connect_access(down, fabric, 10).unwrap();
            if let Some(prev_down) = previous {
                let link = topology.add_hub(format!("link{}", i)).unwrap();
                topology.connect_to_hub(link, prev_down).unwrap();
                topology.connect_to_hub(link, up).unwrap();
            }
            previous = Some(down);
        }
        for host in ["sw0".to_string(), format!("sw{}", CHAIN - 1)] {
            let fabric = topology.fabric_id(&host).unwrap();
            let irb = topology.add_ip_interface(nip(&host, "vlan10")).unwrap();
            topology.connect_irb(irb, fabric, 10).unwrap();
        }

        let assignment = BroadcastDomainComputer::new(topology).find_all_broadcast_domains();
        assert_eq!(assignment.domain_count(), 1);
        assert_eq!(
            domain_of(&assignment, "sw0", "vlan10"),
            domain_of(&assignment, &format!("sw{}", CHAIN - 1), "vlan10")
        );
        let stats = assignment.flood_stats(DomainId(0)).unwrap();
        assert_eq!(stats.fabric_floods, CHAIN);
        assert_eq!(stats.hub_floods, CHAIN - 1);
    }

    #[test]
    fn test_ids_follow_arena_order() {
        let mut topology = Topology::new();
        for host in ["a", "b", "c"] {
            topology.add_ip_interface(nip(host, "eth0")).unwrap();
        }
        let assignment = BroadcastDomainComputer::new(topology).find_all_broadcast_domains();
        assert_eq!(domain_of(&assignment, "a", "eth0"), DomainId(0));
        assert_eq!(domain_of(&assignment, "b", "eth0"), DomainId(1));
        assert_eq!(domain_of(&assignment, "c", "eth0"), DomainId(2));

        let grouped = assignment.domains();
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[&DomainId(1)], vec![nip("b", "eth0")]);
    }
}
