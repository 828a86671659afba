//! Shared-media hubs.
//!
//! A hub stands for one multi-access segment: every attached port hears
//! every frame. Wiring n ports through one hub costs n edges instead of the
//! n² a full mesh of point-to-point wires would.

use std::collections::BTreeMap;

use crate::domain::flood::{Flood, Step};
use crate::graph::{Edge, Identity, Tag, Vertex};

use super::arena::TopologyError;
use super::types::{HubId, PhysicalId};

#[derive(Debug, Clone)]
pub struct Hub {
    id: HubId,
    name: String,
    attached: BTreeMap<PhysicalId, Identity>,
}

impl Hub {
    pub(crate) fn new(id: HubId, name: String) -> Self {
        Self {
            id,
            name,
            attached: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> HubId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attached(&self) -> &BTreeMap<PhysicalId, Identity> {
        &self.attached
    }

    pub(crate) fn check_member(
        &self,
        physical: PhysicalId,
        member: &str,
    ) -> Result<(), TopologyError> {
        if self.attached.contains_key(&physical) {
            return Err(TopologyError::AlreadyMember {
                container: format!("hub {}", self.name),
                member: member.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn attach(
        &mut self,
        physical: PhysicalId,
        member: &str,
        edge: Identity,
    ) -> Result<(), TopologyError> {
        self.check_member(physical, member)?;
        self.attached.insert(physical, edge);
        Ok(())
    }

    /// Repeats `tag` to every attached port, once per tag value.
    pub(crate) fn flood_tag(&self, tag: Tag, flood: &mut Flood) {
        if !flood.first_hub_visit(self.id, tag) {
            return;
        }
        for (physical, edge) in &self.attached {
            if let Some(out) = edge.transform(tag) {
                flood.push(Step::Receive(*physical, out));
            }
        }
    }
}

impl Vertex for Hub {
    type Key = String;
    type Data = Tag;

    fn key(&self) -> &String {
        &self.name
    }
}

impl PartialEq for Hub {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Hub {}
