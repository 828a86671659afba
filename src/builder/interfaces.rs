//! Interface-level builder rules.

use log::{debug, warn};

use crate::config::{DeviceConfig, InterfaceConfig, InterfaceType, SwitchportMode};
use crate::graph::{AccessMode, Switchport, TrunkMode};
use crate::topology::{FabricId, IpId, NodeInterfacePair, PhysicalId, Topology, TopologyError};

/// Whether `iface` gets a physical interface vertex: active physical or
/// aggregated interfaces that are not themselves members of an aggregate.
pub fn should_create_physical_interface(iface: &InterfaceConfig, nip: &NodeInterfacePair) -> bool {
    if !iface.is_physical() {
        debug!("Not creating physical interface {}: not a physical interface", nip);
        false
    } else if iface.channel_group.is_some() {
        debug!("Not creating physical interface {}: member of an aggregate", nip);
        false
    } else if !iface.active {
        debug!("Not creating physical interface {}: not active", nip);
        false
    } else {
        true
    }
}

/// Whether `iface` gets an IP interface vertex.
pub fn should_create_l3_interface(iface: &InterfaceConfig, nip: &NodeInterfacePair) -> bool {
    if iface.addresses.is_empty() {
        debug!("Not creating IP interface {}: no addresses", nip);
        false
    } else if !iface.active {
        debug!("Not creating IP interface {}: not active", nip);
        false
    } else if iface.interface_type == InterfaceType::Loopback {
        debug!("Skipping IP interface {}: loopback", nip);
        false
    } else if iface.is_switchport() {
        warn!("Skipping IP interface {}: it is also a switchport", nip);
        false
    } else {
        debug!("Created IP interface {} with addresses {:?}", nip, iface.addresses);
        true
    }
}

/// The physical interface carrying `iface`'s frames: itself, or for a
/// sub-interface, its parent.
pub fn find_corresponding_physical_interface(
    topology: &Topology,
    device: &DeviceConfig,
    iface: &InterfaceConfig,
) -> Option<PhysicalId> {
    let nip = NodeInterfacePair::new(&device.hostname, &iface.name);
    if let Some(id) = topology.physical_id(&nip) {
        return Some(id);
    }
    let Some(parent) = iface.parent.as_deref() else {
        debug!("No corresponding physical interface found for {}", nip);
        return None;
    };
    let parent_nip = NodeInterfacePair::new(&device.hostname, parent);
    if device.interface(parent).is_none() {
        warn!("Sub-interface {}: missing parent {}, skipping", nip, parent_nip);
        return None;
    }
    let id = topology.physical_id(&parent_nip);
    if id.is_none() {
        debug!("Sub-interface {}: parent {} has no physical interface", nip, parent_nip);
    }
    id
}

/// Turns an already-bound error into a warning; anything else is a real
/// builder failure.
fn skip_if_bound(result: Result<(), TopologyError>) -> Result<(), TopologyError> {
    match result {
        Err(err @ TopologyError::AlreadyBound { .. }) => {
            warn!("Skipping connection: {}", err);
            Ok(())
        }
        other => other,
    }
}

/// Makes the physical interface behind a switchport a member of the device
/// fabric.
pub fn connect_switchport(
    topology: &mut Topology,
    device: &DeviceConfig,
    iface: &InterfaceConfig,
    fabric: FabricId,
) -> Result<(), TopologyError> {
    let nip = NodeInterfacePair::new(&device.hostname, &iface.name);
    let Some(switchport) = iface.switchport.as_ref().filter(|_| iface.is_switchport()) else {
        debug!("Skipping non-layer-2 interface {}: not a switchport", nip);
        return Ok(());
    };
    let Some(physical) = find_corresponding_physical_interface(topology, device, iface) else {
        return Ok(());
    };
    if topology.physical_interface(physical).iface() != &nip {
        warn!(
            "Faking layer-2 connection for sub-interface {} to parent {}",
            nip,
            topology.physical_interface(physical).iface()
        );
    }

    let edge = match switchport.mode {
        SwitchportMode::Access => match switchport.access_vlan {
            Some(vlan) => Switchport::Access(AccessMode::new(vlan)),
            None => {
                warn!("Skipping layer-2 connection for {}: access VLAN is missing", nip);
                return Ok(());
            }
        },
        SwitchportMode::Trunk => Switchport::Trunk(TrunkMode::new(
            switchport.allowed_vlans(),
            Some(switchport.native_vlan()),
        )),
        SwitchportMode::None => {
            warn!("Unexpected layer-2 interface {}: unsure how to connect", nip);
            return Ok(());
        }
    };
    skip_if_bound(topology.connect_switchport(physical, fabric, edge))
}

/// Binds an IP interface to its physical interface or, for SVIs/IRBs, to
/// its device fabric.
pub fn connect_l3_interface(
    topology: &mut Topology,
    device: &DeviceConfig,
    iface: &InterfaceConfig,
    ip: IpId,
) -> Result<(), TopologyError> {
    let nip = NodeInterfacePair::new(&device.hostname, &iface.name);

    if iface.is_physical() {
        let Some(physical) = topology.physical_id(&nip) else {
            warn!("IP interface {}: no physical interface found; skipping", nip);
            return Ok(());
        };
        return connect_to_physical(topology, ip, physical, iface, &nip, &nip);
    }

    if let Some(parent) = iface.parent.as_deref() {
        let parent_nip = NodeInterfacePair::new(&device.hostname, parent);
        if device.interface(parent).is_none() {
            warn!("Not connecting IP interface {} to parent: {} not found", nip, parent_nip);
            return Ok(());
        }
        let Some(physical) = topology.physical_id(&parent_nip) else {
            warn!(
                "Not connecting IP interface {} to parent {}: physical interface not found",
                nip, parent_nip
            );
            return Ok(());
        };
        return connect_to_physical(topology, ip, physical, iface, &nip, &parent_nip);
    }

    match iface.interface_type {
        // Tunnels do not form adjacencies over layer 2.
        InterfaceType::Tunnel => Ok(()),
        InterfaceType::Vlan => {
            let Some(vlan) = iface.vlan else {
                warn!("Not connecting IP interface {}: VLAN is not set", nip);
                return Ok(());
            };
            let Some(fabric) = topology.fabric_id(&device.hostname) else {
                warn!("Not connecting IP interface {}: device has no switching fabric", nip);
                return Ok(());
            };
            debug!(
                "Connecting IP interface {} to switching fabric {} in VLAN {}",
                nip, device.hostname, vlan
            );
            skip_if_bound(topology.connect_irb(ip, fabric, vlan))
        }
        other => {
            warn!(
                "Unexpected IP interface {} of type {:?}: unsure how to connect",
                nip, other
            );
            Ok(())
        }
    }
}

fn connect_to_physical(
    topology: &mut Topology,
    ip: IpId,
    physical: PhysicalId,
    iface: &InterfaceConfig,
    nip: &NodeInterfacePair,
    physical_nip: &NodeInterfacePair,
) -> Result<(), TopologyError> {
    match iface.encapsulation_vlan {
        None => {
            debug!(
                "IP interface {} connected to physical interface {} untagged",
                nip, physical_nip
            );
            skip_if_bound(topology.connect_ip_untagged(ip, physical))
        }
        Some(vlan) => {
            debug!(
                "IP interface {} connected to physical interface {} in VLAN {}",
                nip, physical_nip, vlan
            );
            skip_if_bound(topology.connect_ip_dot1q(ip, physical, vlan))
        }
    }
}
