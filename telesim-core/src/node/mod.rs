mod id;

pub use self::id::{EmptyNodeId, NodeId};

/// A simulated switching site managed by the [`Simulation`].
///
/// A `Node` only carries runtime counters. Its traffic rate lives in the
/// active [`TimeSlot`] and its connections are [`Link`]s of the
/// [`Topology`]. Nodes are created when the simulation is built and are
/// never removed: [`Simulation::initialize`] zeroes their counters.
///
/// [`Simulation`]: crate::simulation::Simulation
/// [`Simulation::initialize`]: crate::simulation::Simulation::initialize
/// [`TimeSlot`]: crate::traffic::TimeSlot
/// [`Link`]: crate::link::Link
/// [`Topology`]: crate::network::Topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,

    /// packets originated by this node since the last initialisation
    packets_generated: u64,
    /// packets delivered end-to-end to this node
    packets_received: u64,

    /// packets/s originated during the latest tick
    current_load: u64,
}

impl Node {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            packets_generated: 0,
            packets_received: 0,
            current_load: 0,
        }
    }

    /// Returns the unique identifier of this node.
    #[inline]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[inline]
    pub fn packets_generated(&self) -> u64 {
        self.packets_generated
    }

    #[inline]
    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    #[inline]
    pub fn current_load(&self) -> u64 {
        self.current_load
    }

    /// Start a new tick: the node originated `rate` packets.
    pub(crate) fn originate(&mut self, rate: u64) {
        self.current_load = rate;
        self.packets_generated = self.packets_generated.saturating_add(rate);
    }

    pub(crate) fn clear_load(&mut self) {
        self.current_load = 0;
    }

    pub(crate) fn receive(&mut self) {
        self.packets_received = self.packets_received.saturating_add(1);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.id.clone());
    }
}
