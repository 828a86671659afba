//! Ethernet hubs from the layer-1 topology.
//!
//! Interfaces that appear in the layer-1 edge list are clustered with
//! union-find and each cluster becomes one hub. Every other physical
//! interface is plugged into a single global hub, which models "cabling
//! unknown" as "everything may hear everything".

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};
use petgraph::unionfind::UnionFind;

use crate::config::Snapshot;
use crate::topology::{NodeInterfacePair, Topology, TopologyError};

/// Name of the hub collecting physical interfaces absent from layer 1.
pub const GLOBAL_HUB: &str = "Global Ethernet Hub";

fn is_switchport(snapshot: &Snapshot, nip: &NodeInterfacePair) -> bool {
    snapshot
        .device(&nip.hostname)
        .and_then(|d| d.interface(&nip.interface))
        .is_some_and(|i| i.is_switchport())
}

/// Groups `members` into clusters joined by `edges`. Edges with an endpoint
/// outside `members` are ignored. Clusters come back ordered by their
/// smallest member, each sorted.
pub(crate) fn cluster<K: Ord + Clone + std::hash::Hash>(
    members: &BTreeSet<K>,
    edges: impl IntoIterator<Item = (K, K)>,
) -> Vec<Vec<K>> {
    let index: HashMap<&K, usize> = members.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let mut clusters: UnionFind<usize> = UnionFind::new(members.len());
    for (a, b) in edges {
        if let (Some(&a), Some(&b)) = (index.get(&a), index.get(&b)) {
            clusters.union(a, b);
        }
    }

    let mut groups: Vec<Vec<K>> = Vec::new();
    let mut position: HashMap<usize, usize> = HashMap::new();
    for (i, member) in members.iter().enumerate() {
        let root = clusters.find(i);
        let slot = *position.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(member.clone());
    }
    groups
}

/// Creates every Ethernet hub and plugs the physical interfaces into them.
pub fn connect_ethernet_hubs(
    topology: &mut Topology,
    snapshot: &Snapshot,
) -> Result<(), TopologyError> {
    let mentioned_in_l1: BTreeSet<NodeInterfacePair> = snapshot
        .layer1_edges
        .iter()
        .flat_map(|edge| [edge.0.clone(), edge.1.clone()])
        .collect();
    let physical: BTreeSet<NodeInterfacePair> = topology
        .physical_interfaces()
        .map(|p| p.iface().clone())
        .collect();

    let global: Vec<NodeInterfacePair> = physical.difference(&mentioned_in_l1).cloned().collect();
    if global.is_empty() {
        debug!("Not creating a global Ethernet hub: all physical interfaces have layer-1 edges");
    } else {
        debug!(
            "Creating a global Ethernet hub with {} physical interfaces",
            global.len()
        );
        let hub = topology.add_hub(GLOBAL_HUB)?;
        for nip in &global {
            if let Some(id) = topology.physical_id(nip) {
                topology.connect_to_hub(hub, id)?;
            }
        }
    }

    if mentioned_in_l1.is_empty() {
        debug!("Layer-1 topology is empty, so only the global hub exists");
    } else {
        let existing: BTreeSet<NodeInterfacePair> =
            physical.intersection(&mentioned_in_l1).cloned().collect();
        let edges = snapshot
            .layer1_edges
            .iter()
            .map(|edge| (edge.0.clone(), edge.1.clone()));

        // The group index keeps names unique even when hostnames contain ':'.
        for (index, group) in cluster(&existing, edges).into_iter().enumerate() {
            let Some(representative) = group.first() else {
                continue;
            };
            let hub = topology.add_hub(format!("Hub {} for {}", index, representative))?;
            for nip in &group {
                if let Some(id) = topology.physical_id(nip) {
                    topology.connect_to_hub(hub, id)?;
                }
            }
        }
    }

    let l2_on_global: Vec<&NodeInterfacePair> = global
        .iter()
        .filter(|nip| is_switchport(snapshot, nip))
        .collect();
    let l2_in_l1 = mentioned_in_l1
        .iter()
        .filter(|nip| is_switchport(snapshot, nip))
        .count();
    if !l2_on_global.is_empty() && l2_in_l1 > 0 {
        warn!(
            "Some layer-2 interfaces are in the layer-1 topology ({}) but not all ({}): {:?} are not",
            l2_in_l1,
            l2_on_global.len(),
            l2_on_global.iter().map(|nip| nip.to_string()).collect::<Vec<_>>()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layer1Edge;

    fn nip(host: &str, iface: &str) -> NodeInterfacePair {
        NodeInterfacePair::new(host, iface)
    }

    fn three_ports() -> Topology {
        let mut topology = Topology::new();
        for name in ["i1", "i2", "i3"] {
            topology.add_physical_interface(nip("c", name)).unwrap();
        }
        topology
    }

    fn hub_members(topology: &Topology, name: &str) -> Vec<String> {
        let hub = topology.hub(topology.hub_id(name).unwrap());
        hub.attached()
            .keys()
            .map(|p| topology.physical_interface(*p).iface().to_string())
            .collect()
    }

    fn with_edges(edges: Vec<Layer1Edge>) -> Snapshot {
        Snapshot {
            layer1_edges: edges,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_layer1_uses_global_hub() {
        let mut topology = three_ports();
        connect_ethernet_hubs(&mut topology, &Snapshot::default()).unwrap();

        assert_eq!(topology.hubs().count(), 1);
        assert_eq!(hub_members(&topology, GLOBAL_HUB), vec!["c:i1", "c:i2", "c:i3"]);
    }

    #[test]
    fn test_one_edge() {
        let mut topology = three_ports();
        let snapshot = with_edges(vec![Layer1Edge(nip("c", "i1"), nip("c", "i2"))]);
        connect_ethernet_hubs(&mut topology, &snapshot).unwrap();

        assert_eq!(topology.hubs().count(), 2);
        assert_eq!(hub_members(&topology, GLOBAL_HUB), vec!["c:i3"]);
        assert_eq!(hub_members(&topology, "Hub 0 for c:i1"), vec!["c:i1", "c:i2"]);
    }

    #[test]
    fn test_dangling_edge_gets_its_own_hub() {
        let mut topology = three_ports();
        let snapshot = with_edges(vec![Layer1Edge(
            nip("c", "i1"),
            nip("no-such-host", "no-such-iface"),
        )]);
        connect_ethernet_hubs(&mut topology, &snapshot).unwrap();

        assert_eq!(topology.hubs().count(), 2);
        assert_eq!(hub_members(&topology, GLOBAL_HUB), vec!["c:i2", "c:i3"]);
        assert_eq!(hub_members(&topology, "Hub 0 for c:i1"), vec!["c:i1"]);
    }

    #[test]
    fn test_line_collapses_to_one_hub() {
        let mut topology = three_ports();
        let snapshot = with_edges(vec![
            Layer1Edge(nip("c", "i1"), nip("c", "i2")),
            Layer1Edge(nip("c", "i3"), nip("c", "i2")),
        ]);
        connect_ethernet_hubs(&mut topology, &snapshot).unwrap();

        assert_eq!(topology.hubs().count(), 1);
        assert!(topology.hub_id(GLOBAL_HUB).is_none());
        assert_eq!(
            hub_members(&topology, "Hub 0 for c:i1"),
            vec!["c:i1", "c:i2", "c:i3"]
        );
    }

    #[test]
    fn test_hub_names_survive_colons_in_hostnames() {
        // Both representatives display as "a:b:c".
        let mut topology = Topology::new();
        for (host, iface) in [("a:b", "c"), ("a", "b:c"), ("x", "1"), ("y", "1")] {
            topology.add_physical_interface(nip(host, iface)).unwrap();
        }
        let snapshot = with_edges(vec![
            Layer1Edge(nip("a:b", "c"), nip("x", "1")),
            Layer1Edge(nip("a", "b:c"), nip("y", "1")),
        ]);
        connect_ethernet_hubs(&mut topology, &snapshot).unwrap();

        assert_eq!(topology.hubs().count(), 2);
        assert_eq!(hub_members(&topology, "Hub 0 for a:b:c"), vec!["a:b:c", "y:1"]);
        assert_eq!(hub_members(&topology, "Hub 1 for a:b:c"), vec!["a:b:c", "x:1"]);
        assert_eq!(topology.validate_symmetry(), Ok(()));
    }

    #[test]
    fn test_cluster_orders_by_smallest_member() {
        let members: BTreeSet<u32> = [1, 2, 3, 4, 5].into_iter().collect();
        let groups = cluster(&members, vec![(5, 2), (3, 4), (9, 1)]);
        assert_eq!(groups, vec![vec![1], vec![2, 5], vec![3, 4]]);
    }
}
