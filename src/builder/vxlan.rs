//! Layer-2 VNIs and VXLAN segments.

use std::collections::BTreeSet;

use log::debug;

use crate::config::{DeviceConfig, VxlanEdge};
use crate::topology::{Topology, TopologyError, VxlanNode};

use super::hubs::cluster;

/// Creates one layer-2 VNI per device binding and bridges it into the
/// device fabric.
pub fn add_layer2_vnis(
    topology: &mut Topology,
    devices: &[&DeviceConfig],
) -> Result<(), TopologyError> {
    for device in devices {
        let Some(fabric) = topology.fabric_id(&device.hostname) else {
            continue;
        };
        let mut bindings: Vec<_> = device.layer2_vnis.iter().collect();
        bindings.sort_by_key(|b| b.vni);
        for binding in bindings {
            let vni = topology.add_l2_vni(VxlanNode::new(&device.hostname, binding.vni))?;
            topology.connect_vni_to_fabric(vni, fabric, binding.vlan)?;
        }
    }
    Ok(())
}

/// Joins layer-2 VNIs connected by VXLAN edges into segments.
pub fn connect_vni_hubs(topology: &mut Topology, edges: &[VxlanEdge]) -> Result<(), TopologyError> {
    if edges.is_empty() || topology.l2_vnis().next().is_none() {
        return Ok(());
    }

    let nodes: BTreeSet<VxlanNode> = edges
        .iter()
        .flat_map(|edge| [edge.0.clone(), edge.1.clone()])
        .collect();
    let pairs = edges.iter().map(|edge| (edge.0.clone(), edge.1.clone()));

    for (index, group) in cluster(&nodes, pairs).into_iter().enumerate() {
        let members: Vec<_> = group
            .iter()
            .filter_map(|node| {
                let id = topology.vni_id(node);
                if id.is_none() {
                    debug!("VXLAN edge endpoint {} has no layer-2 VNI", node);
                }
                id
            })
            .collect();
        let Some(&first) = members.first() else {
            continue;
        };
        let name = format!("Hub {} for {}", index, topology.l2_vni(first).node());
        let hub = topology.add_vni_hub(name)?;
        for vni in members {
            topology.connect_to_vni_hub(hub, vni)?;
        }
    }
    Ok(())
}
