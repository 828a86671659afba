//! # broadcast-domains - Layer-2 flooding domains for network snapshots
//!
//! This library determines which layer-3 (IP-bearing) interfaces of a
//! modeled network share a broadcast domain, by simulating layer-1 and
//! layer-2 forwarding: switchports, VLANs, 802.1Q access and trunk
//! encapsulation, shared media and VXLAN layer-2 segments.
//!
//! ## Overview
//!
//! Instead of comparing every pair of interfaces, the library builds an
//! explicit device/wire graph for the snapshot and floods it once per
//! domain. Cost is linear in the size of the graph.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `graph`: vertex marker, edge transforms (802.1Q and VXLAN codecs), tags and VLAN sets
//! - `topology`: the vertex kinds and the per-snapshot [`Topology`](topology::Topology) arena
//! - `domain`: flood execution and the domain partitioning driver
//! - `adjacencies`: the read-only query facade
//! - `config`: vendor-independent snapshot model
//! - `config_loader`: snapshot file loading and validation
//! - `builder`: snapshot → topology wiring rules
//! - `report`: JSON and text reports
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use broadcast_domains::adjacencies::{BroadcastL3Adjacencies, L3Adjacencies};
//! use broadcast_domains::config_loader;
//! use broadcast_domains::domain::BroadcastDomainComputer;
//! use broadcast_domains::topology::NodeInterfacePair;
//!
//! let snapshot = config_loader::load_snapshot(Path::new("snapshot.yaml"))?;
//! let computer = BroadcastDomainComputer::from_snapshot(&snapshot)?;
//! let adjacencies = BroadcastL3Adjacencies::compute(&computer);
//!
//! let same = adjacencies.in_same_broadcast_domain(
//!     &NodeInterfacePair::new("r1", "eth0"),
//!     &NodeInterfacePair::new("r2", "eth0"),
//! )?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Snapshot Format
//!
//! ```yaml
//! devices:
//!   - hostname: sw1
//!     interfaces:
//!       - name: swp1
//!         type: physical
//!         switchport: { mode: access, access_vlan: 10 }
//!       - name: vlan10
//!         type: vlan
//!         vlan: 10
//!         addresses: ["10.0.10.1/24"]
//! layer1_edges:
//!   - [{ hostname: sw1, interface: swp1 }, { hostname: r1, interface: eth0 }]
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed `thiserror` errors (`TopologyError`,
//! `AdjacencyError`, `SnapshotError`, ...). File loading and reporting use
//! `color_eyre` for error reporting with context.

pub mod adjacencies;
pub mod builder;
pub mod config;
pub mod config_loader;
pub mod domain;
pub mod graph;
pub mod report;
pub mod topology;
