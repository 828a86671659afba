//! Layer-3 adjacency queries.
//!
//! Downstream consumers only ever see the [`L3Adjacencies`] trait. The
//! broadcast implementation answers from a finished [`DomainAssignment`]
//! and never touches the topology again.

use crate::domain::{BroadcastDomainComputer, DomainAssignment, DomainId};
use crate::topology::NodeInterfacePair;

/// Errors returned by adjacency queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdjacencyError {
    #[error("Interface {0} has no broadcast domain; it may not be an IP interface")]
    NotAnL3Interface(NodeInterfacePair),

    #[error("{0} is not supported by this adjacency model")]
    Unsupported(&'static str),
}

/// Answers which layer-3 interfaces can reach each other at layer 2.
pub trait L3Adjacencies {
    /// Whether `a` and `b` share a broadcast domain.
    fn in_same_broadcast_domain(
        &self,
        a: &NodeInterfacePair,
        b: &NodeInterfacePair,
    ) -> Result<bool, AdjacencyError>;

    /// Whether `a` and `b` are the two ends of one point-to-point domain.
    fn in_same_point_to_point_domain(
        &self,
        a: &NodeInterfacePair,
        b: &NodeInterfacePair,
    ) -> Result<bool, AdjacencyError>;

    /// The interface at the other end of `iface`'s point-to-point domain.
    fn paired_point_to_point_l3_interface(
        &self,
        iface: &NodeInterfacePair,
    ) -> Result<Option<NodeInterfacePair>, AdjacencyError>;
}

/// Adjacencies derived from a flood over the snapshot topology.
#[derive(Debug, Clone)]
pub struct BroadcastL3Adjacencies {
    assignment: DomainAssignment,
}

impl BroadcastL3Adjacencies {
    pub fn new(assignment: DomainAssignment) -> Self {
        Self { assignment }
    }

    /// Runs the domain computation and wraps its result.
    pub fn compute(computer: &BroadcastDomainComputer) -> Self {
        Self::new(computer.find_all_broadcast_domains())
    }

    pub fn assignment(&self) -> &DomainAssignment {
        &self.assignment
    }

    fn domain(&self, iface: &NodeInterfacePair) -> Result<DomainId, AdjacencyError> {
        self.assignment
            .get(iface)
            .ok_or_else(|| AdjacencyError::NotAnL3Interface(iface.clone()))
    }
}

impl L3Adjacencies for BroadcastL3Adjacencies {
    fn in_same_broadcast_domain(
        &self,
        a: &NodeInterfacePair,
        b: &NodeInterfacePair,
    ) -> Result<bool, AdjacencyError> {
        Ok(self.domain(a)? == self.domain(b)?)
    }

    fn in_same_point_to_point_domain(
        &self,
        _a: &NodeInterfacePair,
        _b: &NodeInterfacePair,
    ) -> Result<bool, AdjacencyError> {
        Err(AdjacencyError::Unsupported("Point-to-point domain lookup"))
    }

    fn paired_point_to_point_l3_interface(
        &self,
        _iface: &NodeInterfacePair,
    ) -> Result<Option<NodeInterfacePair>, AdjacencyError> {
        Err(AdjacencyError::Unsupported("Point-to-point pairing"))
    }
}

/// Treats the whole network as one broadcast domain.
///
/// Used when no layer-2 modeling is wanted: every pair of interfaces is
/// considered adjacent.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalBroadcastNoPointToPoint;

impl L3Adjacencies for GlobalBroadcastNoPointToPoint {
    fn in_same_broadcast_domain(
        &self,
        _a: &NodeInterfacePair,
        _b: &NodeInterfacePair,
    ) -> Result<bool, AdjacencyError> {
        Ok(true)
    }

    fn in_same_point_to_point_domain(
        &self,
        _a: &NodeInterfacePair,
        _b: &NodeInterfacePair,
    ) -> Result<bool, AdjacencyError> {
        Ok(false)
    }

    fn paired_point_to_point_l3_interface(
        &self,
        _iface: &NodeInterfacePair,
    ) -> Result<Option<NodeInterfacePair>, AdjacencyError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    fn nip(host: &str, iface: &str) -> NodeInterfacePair {
        NodeInterfacePair::new(host, iface)
    }

    /// r1 and r2 share a wire; r3 is on its own.
    fn adjacencies() -> BroadcastL3Adjacencies {
        let mut topology = Topology::new();
        let wire = topology.add_hub("wire").unwrap();
        for host in ["r1", "r2", "r3"] {
            let port = topology.add_physical_interface(nip(host, "eth0")).unwrap();
            let ip = topology.add_ip_interface(nip(host, "eth0")).unwrap();
            topology.connect_ip_untagged(ip, port).unwrap();
            if host != "r3" {
                topology.connect_to_hub(wire, port).unwrap();
            }
        }
        BroadcastL3Adjacencies::compute(&BroadcastDomainComputer::new(topology))
    }

    #[test]
    fn test_same_domain_is_an_equivalence() {
        let adj = adjacencies();
        let ifaces = [nip("r1", "eth0"), nip("r2", "eth0"), nip("r3", "eth0")];

        for a in &ifaces {
            assert!(adj.in_same_broadcast_domain(a, a).unwrap());
            for b in &ifaces {
                let ab = adj.in_same_broadcast_domain(a, b).unwrap();
                assert_eq!(ab, adj.in_same_broadcast_domain(b, a).unwrap());
                for c in &ifaces {
                    if ab && adj.in_same_broadcast_domain(b, c).unwrap() {
                        assert!(adj.in_same_broadcast_domain(a, c).unwrap());
                    }
                }
            }
        }

        assert!(adj
            .in_same_broadcast_domain(&ifaces[0], &ifaces[1])
            .unwrap());
        assert!(!adj
            .in_same_broadcast_domain(&ifaces[0], &ifaces[2])
            .unwrap());
    }

    #[test]
    fn test_unregistered_interface_fails() {
        let adj = adjacencies();
        let missing = nip("r1", "lo0");

        let err = adj
            .in_same_broadcast_domain(&missing, &nip("r1", "eth0"))
            .unwrap_err();
        assert_eq!(err, AdjacencyError::NotAnL3Interface(missing.clone()));
        assert!(err.to_string().contains("r1:lo0"));
        assert!(err.to_string().contains("may not be an IP interface"));

        assert!(adj
            .in_same_broadcast_domain(&nip("r1", "eth0"), &missing)
            .is_err());
    }

    #[test]
    fn test_point_to_point_queries_are_unsupported() {
        let adj = adjacencies();
        let a = nip("r1", "eth0");
        let b = nip("r2", "eth0");
        assert!(matches!(
            adj.in_same_point_to_point_domain(&a, &b),
            Err(AdjacencyError::Unsupported(_))
        ));
        assert!(matches!(
            adj.paired_point_to_point_l3_interface(&a),
            Err(AdjacencyError::Unsupported(_))
        ));
    }

    #[test]
    fn test_global_broadcast() {
        let adj = GlobalBroadcastNoPointToPoint;
        let a = nip("r1", "eth0");
        let b = nip("r9", "anything");
        assert_eq!(adj.in_same_broadcast_domain(&a, &b), Ok(true));
        assert_eq!(adj.in_same_point_to_point_domain(&a, &b), Ok(false));
        assert_eq!(adj.paired_point_to_point_l3_interface(&a), Ok(None));
    }

    #[test]
    fn test_facade_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BroadcastL3Adjacencies>();
        assert_send_sync::<BroadcastDomainComputer>();
    }
}
