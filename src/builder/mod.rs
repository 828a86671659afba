//! Snapshot → topology builder.
//!
//! This module decides, device by device, which vertices a snapshot needs
//! and how they are wired:
//!
//! - `interfaces`: which interfaces become physical or IP vertices, and how
//!   switchports and layer-3 interfaces attach to ports and fabrics
//! - `hubs`: the Ethernet hubs derived from the layer-1 topology, plus the
//!   global hub for ports with no known cabling
//! - `vxlan`: layer-2 VNIs and the VXLAN segments joining them
//!
//! Devices are processed sorted by hostname and interfaces sorted by name,
//! so arena order (and therefore domain numbering) only depends on the
//! snapshot's content.

pub mod hubs;
pub mod interfaces;
pub mod vxlan;

use log::{debug, info};

use crate::config::{DeviceConfig, InterfaceConfig, Snapshot};
use crate::topology::{NodeInterfacePair, Topology, TopologyError};

/// A device's interfaces in build order.
fn sorted_interfaces(device: &DeviceConfig) -> Vec<&InterfaceConfig> {
    let mut interfaces: Vec<&InterfaceConfig> = device.interfaces.iter().collect();
    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    interfaces
}

/// Builds and validates the flood graph for `snapshot`.
pub fn build_topology(snapshot: &Snapshot) -> Result<Topology, TopologyError> {
    let mut devices: Vec<&DeviceConfig> = snapshot.devices.iter().collect();
    devices.sort_by(|a, b| a.hostname.cmp(&b.hostname));

    let mut topology = Topology::new();

    for device in &devices {
        for iface in sorted_interfaces(device) {
            let nip = NodeInterfacePair::new(&device.hostname, &iface.name);
            if interfaces::should_create_physical_interface(iface, &nip) {
                topology.add_physical_interface(nip)?;
            }
        }
    }
    debug!(
        "Created {} physical interfaces",
        topology.physical_interfaces().count()
    );

    hubs::connect_ethernet_hubs(&mut topology, snapshot)?;

    for device in &devices {
        let fabric = topology.add_fabric(device.hostname.as_str())?;
        for iface in sorted_interfaces(device) {
            interfaces::connect_switchport(&mut topology, device, iface, fabric)?;
        }
    }

    vxlan::add_layer2_vnis(&mut topology, &devices)?;
    vxlan::connect_vni_hubs(&mut topology, &snapshot.vxlan_edges)?;

    for device in &devices {
        for iface in sorted_interfaces(device) {
            let nip = NodeInterfacePair::new(&device.hostname, &iface.name);
            if !interfaces::should_create_l3_interface(iface, &nip) {
                continue;
            }
            let ip = topology.add_ip_interface(nip)?;
            interfaces::connect_l3_interface(&mut topology, device, iface, ip)?;
        }
    }

    topology.validate_symmetry()?;

    info!(
        "Built topology: {} physical interfaces, {} IP interfaces, {} hubs, {} VXLAN segments",
        topology.physical_interfaces().count(),
        topology.ip_interface_count(),
        topology.hubs().count(),
        topology.vni_hubs().count()
    );
    Ok(topology)
}
