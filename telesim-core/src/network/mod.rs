mod route;

use crate::{
    link::{Link, LinkId},
    measure::Capacity,
    node::{Node, NodeId},
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use self::route::Route;

/// The fixed set of [`Node`]s and [`Link`]s of a simulation.
///
/// Nodes and links are kept in configuration order (this is the order
/// used by the statistics) and indexed by identifier. The routing graph
/// is derived once from the links and treats every link as usable in
/// both directions; capacity changes do not affect it.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,

    links: Vec<Link>,
    link_index: HashMap<LinkId, usize>,

    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// routes already computed, by source then destination; the
    /// adjacency never changes so they never go stale
    routes: HashMap<NodeId, HashMap<NodeId, Route>>,
}

impl Topology {
    /// Build the topology from already validated nodes and links.
    ///
    /// Duplicated nodes or links keep their first occurrence and links
    /// referencing unknown nodes are ignored; see
    /// [`SimulationConfig::validate`] for the checked version.
    ///
    /// [`SimulationConfig::validate`]: crate::config::SimulationConfig::validate
    pub fn new<N, L>(nodes: N, links: L) -> Self
    where
        N: IntoIterator<Item = NodeId>,
        L: IntoIterator<Item = (LinkId, Capacity)>,
    {
        let mut topology = Self {
            nodes: Vec::new(),
            node_index: HashMap::new(),
            links: Vec::new(),
            link_index: HashMap::new(),
            adjacency: BTreeMap::new(),
            routes: HashMap::new(),
        };

        for id in nodes {
            if topology.node_index.contains_key(&id) {
                continue;
            }
            topology.node_index.insert(id.clone(), topology.nodes.len());
            topology.adjacency.insert(id.clone(), BTreeSet::new());
            topology.nodes.push(Node::new(id));
        }

        for (id, capacity) in links {
            if topology.link_index.contains_key(&id)
                || !topology.node_index.contains_key(id.from())
                || !topology.node_index.contains_key(id.to())
            {
                continue;
            }
            let (from, to) = (id.from().clone(), id.to().clone());
            topology
                .adjacency
                .entry(from.clone())
                .or_default()
                .insert(to.clone());
            topology.adjacency.entry(to).or_default().insert(from);

            topology.link_index.insert(id.clone(), topology.links.len());
            topology.links.push(Link::new(id, capacity));
        }

        topology
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.node_index
            .get(id)
            .map(|&index| &mut self.nodes[index])
    }

    /// Look up the link configured exactly from `id.from()` to `id.to()`.
    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.link_index.get(id).map(|&index| &self.links[index])
    }

    pub(crate) fn link_mut(&mut self, id: &LinkId) -> Option<&mut Link> {
        self.link_index
            .get(id)
            .map(|&index| &mut self.links[index])
    }

    /// The link billed when a packet travels across `hop`.
    ///
    /// This is the link configured in the direction of travel if there is
    /// one, otherwise the link configured the other way around.
    pub(crate) fn hop_link_mut(&mut self, hop: &LinkId) -> Option<&mut Link> {
        let index = self
            .link_index
            .get(hop)
            .or_else(|| self.link_index.get(&hop.reversed()))
            .copied()?;
        Some(&mut self.links[index])
    }

    /// Compute the shortest route, by hop count, from `from` to `to`.
    ///
    /// Returns an empty [`Route`] if `to` is not reachable.
    pub fn route(&self, from: &NodeId, to: &NodeId) -> Route {
        route::shortest_path(&self.adjacency, from, to)
    }

    /// Same as [`route`](Topology::route), computing the route of a pair
    /// only the first time it is asked for.
    pub(crate) fn cached_route(&mut self, from: &NodeId, to: &NodeId) -> Route {
        if let Some(route) = self.routes.get(from).and_then(|routes| routes.get(to)) {
            return route.clone();
        }

        let route = route::shortest_path(&self.adjacency, from, to);
        self.routes
            .entry(from.clone())
            .or_default()
            .insert(to.clone(), route.clone());
        route
    }

    /// Release every link's backlog by up to one capacity.
    ///
    /// Returns the total number of packets released.
    pub(crate) fn drain_backlog(&mut self) -> u64 {
        self.links
            .iter_mut()
            .map(Link::drain_backlog)
            .fold(0, u64::saturating_add)
    }

    /// forget every node and link load of the previous tick
    pub(crate) fn clear_loads(&mut self) {
        self.links.iter_mut().for_each(Link::clear_load);
        self.nodes.iter_mut().for_each(Node::clear_load);
    }

    /// zero all the runtime counters, keeping the configured capacities
    pub(crate) fn reset(&mut self) {
        self.links.iter_mut().for_each(Link::reset);
        self.nodes.iter_mut().for_each(Node::reset);
    }

    /// average backlog queue length over all the links
    pub fn average_queue(&self) -> f64 {
        if self.links.is_empty() {
            return 0.0;
        }
        let total: u64 = self.links.iter().map(Link::queue).sum();
        total as f64 / self.links.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> NodeId {
        label.parse().unwrap()
    }

    fn link(from: &str, to: &str, capacity: u64) -> (LinkId, Capacity) {
        (
            LinkId::new(id(from), id(to)),
            Capacity::new(capacity).unwrap(),
        )
    }

    fn topology() -> Topology {
        Topology::new(
            ["A", "B", "C"].map(id),
            [link("A", "B", 10), link("B", "C", 5)],
        )
    }

    #[test]
    fn keeps_configuration_order() {
        let topology = Topology::new(["C", "A", "B"].map(id), [link("B", "A", 1)]);
        let labels: Vec<&str> = topology.nodes().iter().map(|n| n.id().as_str()).collect();
        assert_eq!(labels, ["C", "A", "B"]);
    }

    #[test]
    fn ignores_duplicates_and_dangling_links() {
        let topology = Topology::new(
            ["A", "B", "A"].map(id),
            [link("A", "B", 1), link("A", "B", 2), link("A", "Z", 3)],
        );
        assert_eq!(topology.nodes().len(), 2);
        assert_eq!(topology.links().len(), 1);
        assert_eq!(topology.links()[0].capacity().get(), 1);
    }

    #[test]
    fn exact_link_lookup() {
        let topology = topology();
        assert!(topology.link(&"A-B".parse().unwrap()).is_some());
        assert!(topology.link(&"B-A".parse().unwrap()).is_none());
    }

    #[test]
    fn hop_falls_back_to_reverse_link() {
        let mut topology = topology();
        let link = topology.hop_link_mut(&"B-A".parse().unwrap()).unwrap();
        assert_eq!(link.id().to_string(), "A-B");
        assert!(topology.hop_link_mut(&"A-C".parse().unwrap()).is_none());
    }

    #[test]
    fn routes_over_reverse_links() {
        let topology = topology();
        let route = topology.route(&id("C"), &id("A"));
        let labels: Vec<&str> = route.nodes().iter().map(NodeId::as_str).collect();
        assert_eq!(labels, ["C", "B", "A"]);
    }

    #[test]
    fn cached_route_is_computed_once() {
        let mut topology = topology();

        let first = topology.cached_route(&id("C"), &id("A"));
        assert_eq!(first, topology.route(&id("C"), &id("A")));
        assert_eq!(topology.routes.len(), 1);

        let again = topology.cached_route(&id("C"), &id("A"));
        assert_eq!(again, first);
        assert_eq!(topology.routes[&id("C")].len(), 1);

        // unreachable pairs are remembered too
        assert!(topology.cached_route(&id("A"), &id("Z")).is_unreachable());
        assert_eq!(topology.routes.len(), 2);
    }

    #[test]
    fn drain_sums_all_links() {
        let mut topology = topology();
        topology
            .link_mut(&"A-B".parse().unwrap())
            .unwrap()
            .consume_capacity(25);
        topology
            .link_mut(&"B-C".parse().unwrap())
            .unwrap()
            .consume_capacity(7);

        // queues: A-B = 15, B-C = 2
        assert_eq!(topology.average_queue(), 8.5);
        assert_eq!(topology.drain_backlog(), 12);
        assert_eq!(topology.drain_backlog(), 5);
        assert_eq!(topology.drain_backlog(), 0);
        assert_eq!(topology.average_queue(), 0.0);
    }

    #[test]
    fn reset_clears_counters() {
        let mut topology = topology();
        topology.node_mut(&id("A")).unwrap().originate(4);
        topology
            .link_mut(&"A-B".parse().unwrap())
            .unwrap()
            .consume_capacity(25);

        topology.reset();

        assert!(topology.nodes().iter().all(|n| n.packets_generated() == 0));
        assert!(topology.links().iter().all(|l| l.load() == 0 && l.queue() == 0));
        assert_eq!(topology.links()[0].capacity().get(), 10);
    }

    #[test]
    fn empty_topology_average_queue() {
        let topology = Topology::new(Vec::<NodeId>::new(), Vec::<(LinkId, Capacity)>::new());
        assert_eq!(topology.average_queue(), 0.0);
    }
}
