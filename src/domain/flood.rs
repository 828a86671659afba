//! One origination flood.
//!
//! A flood starts at a single IP interface and walks the topology until every
//! frame copy has either been dropped by an edge or delivered to an IP
//! interface. Vertices never call each other directly: each dispatch step
//! pushes follow-up [`Step`]s onto an explicit work stack, so the depth of a
//! broadcast domain never turns into call-stack depth.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::graph::{Tag, VisitKey, Vlan};
use crate::topology::{FabricId, HubId, IpId, PhysicalId, Topology, VniHubId, VniId};

/// A pending dispatch on one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// A physical interface puts a frame on its wire.
    Transmit(PhysicalId, Tag),
    /// A physical interface takes a frame off its wire.
    Receive(PhysicalId, Tag),
    /// A frame reaches an IP interface.
    Reached(IpId),
    /// A device fabric floods a VLAN to its members.
    FloodVlan(FabricId, Vlan),
    /// A hub repeats a frame to every attached interface.
    FloodTag(HubId, Tag),
    /// A layer-2 VNI encapsulates a frame into its VXLAN segment.
    VniTransmit(VniId),
    /// A layer-2 VNI decapsulates a frame from its VXLAN segment.
    VniReceive(VniId),
    /// A VXLAN segment delivers a frame to every member VNI.
    FloodVni(VniHubId),
}

/// Counters collected while a flood runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FloodStats {
    /// Dispatch steps processed, including the origination.
    pub steps: usize,
    /// Fabric floods that went ahead (first visit of a fabric/VLAN pair).
    pub fabric_floods: usize,
    /// Hub floods that went ahead (first visit of a hub/tag pair).
    pub hub_floods: usize,
    /// VXLAN segment floods that went ahead.
    pub vni_hub_floods: usize,
    /// Fabric, hub or segment floods cut short because the pair was already visited.
    pub revisits_skipped: usize,
}

#[derive(Debug, Default)]
struct Visited {
    fabrics: HashSet<VisitKey<FabricId, Vlan>>,
    hubs: HashSet<VisitKey<HubId, Tag>>,
    vni_hubs: HashSet<VisitKey<VniHubId, ()>>,
}

/// The call-scoped state of a single flood: the IP interfaces reached so far,
/// the visited set, and the work stack.
#[derive(Debug, Default)]
pub struct Flood {
    members: BTreeSet<IpId>,
    visited: Visited,
    stack: Vec<Step>,
    stats: FloodStats,
}

/// Everything a finished flood produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodOutcome {
    pub members: BTreeSet<IpId>,
    pub stats: FloodStats,
}

impl Flood {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.stack.push(step);
    }

    pub(crate) fn add_member(&mut self, ip: IpId) {
        self.members.insert(ip);
    }

    /// Records a fabric visit; false if this fabric already flooded `vlan`.
    pub(crate) fn first_fabric_visit(&mut self, fabric: FabricId, vlan: Vlan) -> bool {
        let fresh = self.visited.fabrics.insert(VisitKey::new(fabric, vlan));
        self.count(fresh, |stats| stats.fabric_floods += 1);
        fresh
    }

    /// Records a hub visit; false if this hub already repeated `tag`.
    pub(crate) fn first_hub_visit(&mut self, hub: HubId, tag: Tag) -> bool {
        let fresh = self.visited.hubs.insert(VisitKey::new(hub, tag));
        self.count(fresh, |stats| stats.hub_floods += 1);
        fresh
    }

    /// Records a VXLAN segment visit; false if it was already flooded.
    pub(crate) fn first_vni_hub_visit(&mut self, hub: VniHubId) -> bool {
        let fresh = self.visited.vni_hubs.insert(VisitKey::new(hub, ()));
        self.count(fresh, |stats| stats.vni_hub_floods += 1);
        fresh
    }

    fn count(&mut self, fresh: bool, on_fresh: impl FnOnce(&mut FloodStats)) {
        if fresh {
            on_fresh(&mut self.stats);
        } else {
            self.stats.revisits_skipped += 1;
        }
    }

    /// Runs a flood originated by `origin` to completion.
    pub fn run(topology: &Topology, origin: IpId) -> FloodOutcome {
        let mut flood = Flood::new();
        flood.stats.steps += 1;
        topology.ip_interface(origin).originate(&mut flood);

        while let Some(step) = flood.stack.pop() {
            flood.stats.steps += 1;
            match step {
                Step::Transmit(id, tag) => {
                    topology.physical_interface(id).transmit(tag, &mut flood)
                }
                Step::Receive(id, tag) => topology.physical_interface(id).receive(tag, &mut flood),
                Step::Reached(id) => topology.ip_interface(id).reached(&mut flood),
                Step::FloodVlan(id, vlan) => topology.fabric(id).flood_vlan(vlan, &mut flood),
                Step::FloodTag(id, tag) => topology.hub(id).flood_tag(tag, &mut flood),
                Step::VniTransmit(id) => topology.l2_vni(id).transmit(&mut flood),
                Step::VniReceive(id) => topology.l2_vni(id).receive(&mut flood),
                Step::FloodVni(id) => topology.vni_hub(id).flood(&mut flood),
            }
        }

        FloodOutcome {
            members: flood.members,
            stats: flood.stats,
        }
    }
}
