//! Vendor-independent snapshot model.
//!
//! A snapshot is everything the builder needs: every device with its
//! interfaces and layer-2 VNIs, the (optional) layer-1 cabling, and the
//! VXLAN layer-2 adjacencies.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{Vlan, VlanSet, MAX_VLAN};
use crate::topology::{NodeInterfacePair, VxlanNode};

/// Native VLAN of a trunk that does not configure one.
pub const DEFAULT_NATIVE_VLAN: Vlan = 1;

/// Top-level structure that mirrors the YAML snapshot file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    /// Known physical cabling. Empty when no layer-1 topology was supplied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layer1_edges: Vec<Layer1Edge>,
    /// VNIs on different devices that share a VXLAN segment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vxlan_edges: Vec<VxlanEdge>,
}

/// Two cabled interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer1Edge(pub NodeInterfacePair, pub NodeInterfacePair);

/// Two VNIs in the same VXLAN segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VxlanEdge(pub VxlanNode, pub VxlanNode);

/// Configuration for a single device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub hostname: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layer2_vnis: Vec<Layer2VniConfig>,
}

impl DeviceConfig {
    pub fn interface(&self, name: &str) -> Option<&InterfaceConfig> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// Interface kinds the builder distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    Physical,
    Aggregated,
    Logical,
    Vlan,
    Loopback,
    Tunnel,
}

/// Configuration for a single interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub interface_type: InterfaceType,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switchport: Option<SwitchportConfig>,
    /// 802.1Q VLAN of a routed sub-interface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encapsulation_vlan: Option<Vlan>,
    /// Physical interface this one depends on (sub-interfaces).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// VLAN of an SVI/IRB interface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<Vlan>,
    /// Aggregate this interface is a member of.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_group: Option<String>,
}

fn default_active() -> bool {
    true
}

impl InterfaceConfig {
    pub fn is_physical(&self) -> bool {
        matches!(
            self.interface_type,
            InterfaceType::Physical | InterfaceType::Aggregated
        )
    }

    pub fn is_switchport(&self) -> bool {
        self.switchport
            .as_ref()
            .is_some_and(|sp| sp.mode != SwitchportMode::None)
    }

    fn vlans(&self) -> impl Iterator<Item = Vlan> + '_ {
        let switchport = self.switchport.iter().flat_map(|sp| {
            sp.access_vlan.into_iter().chain(sp.native_vlan)
        });
        self.encapsulation_vlan
            .into_iter()
            .chain(self.vlan)
            .chain(switchport)
    }
}

/// Layer-2 switchport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchportMode {
    Access,
    Trunk,
    #[default]
    None,
}

/// Switchport settings of an interface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchportConfig {
    #[serde(default)]
    pub mode: SwitchportMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_vlan: Option<Vlan>,
    /// Defaults to every VLAN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_vlans: Option<VlanSet>,
    /// Defaults to [`DEFAULT_NATIVE_VLAN`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_vlan: Option<Vlan>,
}

impl SwitchportConfig {
    pub fn allowed_vlans(&self) -> VlanSet {
        self.allowed_vlans.clone().unwrap_or_else(VlanSet::all)
    }

    pub fn native_vlan(&self) -> Vlan {
        self.native_vlan.unwrap_or(DEFAULT_NATIVE_VLAN)
    }
}

/// A VXLAN VNI bridged to a local VLAN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer2VniConfig {
    pub vni: u32,
    pub vlan: Vlan,
}

/// Snapshot validation errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Duplicate device hostname '{0}'")]
    DuplicateDevice(String),
    #[error("Duplicate interface '{interface}' on device '{hostname}'")]
    DuplicateInterface { hostname: String, interface: String },
    #[error("Duplicate layer-2 VNI {vni} on device '{hostname}'")]
    DuplicateVni { hostname: String, vni: u32 },
    #[error("Invalid VLAN {vlan} on {owner}: must be at most 4095")]
    InvalidVlan { owner: String, vlan: Vlan },
}

impl Snapshot {
    /// Validate the snapshot
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut hostnames = HashSet::new();
        for device in &self.devices {
            if !hostnames.insert(device.hostname.as_str()) {
                return Err(SnapshotError::DuplicateDevice(device.hostname.clone()));
            }
            device.validate()?;
        }
        Ok(())
    }

    pub fn device(&self, hostname: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.hostname == hostname)
    }

    /// Number of interfaces across all devices.
    pub fn interface_count(&self) -> usize {
        self.devices.iter().map(|d| d.interfaces.len()).sum()
    }
}

impl DeviceConfig {
    fn validate(&self) -> Result<(), SnapshotError> {
        let mut names = HashSet::new();
        for iface in &self.interfaces {
            if !names.insert(iface.name.as_str()) {
                return Err(SnapshotError::DuplicateInterface {
                    hostname: self.hostname.clone(),
                    interface: iface.name.clone(),
                });
            }
            if let Some(vlan) = iface.vlans().find(|v| *v > MAX_VLAN) {
                return Err(SnapshotError::InvalidVlan {
                    owner: format!("{}:{}", self.hostname, iface.name),
                    vlan,
                });
            }
        }

        let mut vnis = HashSet::new();
        for binding in &self.layer2_vnis {
            if !vnis.insert(binding.vni) {
                return Err(SnapshotError::DuplicateVni {
                    hostname: self.hostname.clone(),
                    vni: binding.vni,
                });
            }
            if binding.vlan > MAX_VLAN {
                return Err(SnapshotError::InvalidVlan {
                    owner: format!("{}:vni-{}", self.hostname, binding.vni),
                    vlan: binding.vlan,
                });
            }
        }
        Ok(())
    }
}
