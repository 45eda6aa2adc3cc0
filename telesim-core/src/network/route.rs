use crate::{link::LinkId, node::NodeId};
use serde::Serialize;
use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet},
};

/// The ordered list of nodes a packet travels through, source first.
///
/// An empty route means the destination cannot be reached from the
/// source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Route(Vec<NodeId>);

impl Route {
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    #[cfg(test)]
    pub(crate) fn from_nodes(nodes: Vec<NodeId>) -> Self {
        Self(nodes)
    }

    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// `true` when the route does not contain at least one hop
    #[inline]
    pub fn is_unreachable(&self) -> bool {
        self.0.len() < 2
    }

    /// number of links crossed by the route
    #[inline]
    pub fn hop_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// the directed links crossed by the route, in travel order
    pub fn hops(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.0
            .windows(2)
            .map(|pair| LinkId::new(pair[0].clone(), pair[1].clone()))
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        self.0
    }
}

/// Single-source shortest path by hop count over an undirected adjacency.
///
/// Every edge weighs `1`; link capacities play no part in the choice.
/// The unsettled node with the smallest tentative distance is settled
/// first, ties going to the smallest [`NodeId`]. The search stops as
/// soon as `to` is settled or when no reachable node is left.
///
/// Returns [`Route::empty`] when `to` cannot be reached.
pub(crate) fn shortest_path(
    adjacency: &BTreeMap<NodeId, BTreeSet<NodeId>>,
    from: &NodeId,
    to: &NodeId,
) -> Route {
    if !adjacency.contains_key(from) || !adjacency.contains_key(to) {
        return Route::empty();
    }

    let mut distances: HashMap<&NodeId, u64> = HashMap::new();
    let mut previous: HashMap<&NodeId, &NodeId> = HashMap::new();
    let mut settled: HashSet<&NodeId> = HashSet::new();
    let mut unsettled = BinaryHeap::new();

    distances.insert(from, 0);
    unsettled.push(Reverse((0u64, from)));

    while let Some(Reverse((distance, node))) = unsettled.pop() {
        // stale entry, the node was settled with a shorter distance
        if !settled.insert(node) {
            continue;
        }

        if node == to {
            break;
        }

        let Some(neighbours) = adjacency.get(node) else {
            continue;
        };
        let candidate = distance + 1;
        for neighbour in neighbours {
            if settled.contains(neighbour) {
                continue;
            }
            let known = distances.get(neighbour).copied().unwrap_or(u64::MAX);
            if candidate < known {
                distances.insert(neighbour, candidate);
                previous.insert(neighbour, node);
                unsettled.push(Reverse((candidate, neighbour)));
            }
        }
    }

    let mut path = vec![to.clone()];
    let mut current = to;
    while let Some(&prev) = previous.get(current) {
        path.push(prev.clone());
        current = prev;
    }
    path.reverse();

    // `to` was never reached: the walk back did not end on `from`
    if path.first() != Some(from) {
        return Route::empty();
    }

    Route(path)
}
