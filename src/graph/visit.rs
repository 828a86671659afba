//! Flood bookkeeping.

use std::hash::Hash;

/// A `(vertex, data)` pair recorded while one flood is in progress.
///
/// Used only as a set element: a vertex that has already seen a given data
/// value does not need to flood it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisitKey<V, D> {
    pub vertex: V,
    pub data: D,
}

impl<V, D> VisitKey<V, D>
where
    V: Copy + Eq + Hash,
    D: Copy + Eq + Hash,
{
    pub fn new(vertex: V, data: D) -> Self {
        Self { vertex, data }
    }
}
