mod id;

use crate::measure::Capacity;

pub use self::id::{LinkId, LinkIdParseError};

/// A directed link of the [`Topology`] with its capacity limit and
/// backlog queue.
///
/// During a tick every packet crossing the link applies one unit of load
/// with [`Link::consume_capacity`]. The load never goes above the
/// [`Capacity`]: the excess is diverted to the backlog queue, which is
/// then released, at most one capacity's worth per tick, by
/// [`Link::drain_backlog`].
///
/// ```text
///                 consume_capacity(n)
///                        │
///          load + n ≤ capacity ? ──yes──► load += n
///                        │no
///                        ▼
///       load = capacity, queue += overflow
///
///  next tick: drain_backlog() releases min(queue, capacity)
/// ```
///
/// [`Topology`]: crate::network::Topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    id: LinkId,
    capacity: Capacity,

    /// load applied during the current tick, always `<= capacity`
    load: u64,

    /// packets waiting to be released in later ticks
    queue: u64,
}

impl Link {
    pub fn new(id: LinkId, capacity: Capacity) -> Self {
        Self {
            id,
            capacity,
            load: 0,
            queue: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> &LinkId {
        &self.id
    }

    #[inline]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Update the capacity of the link.
    ///
    /// The current tick's load is left as is; the new limit applies from
    /// the next tick's load computations.
    pub fn set_capacity(&mut self, capacity: Capacity) {
        self.capacity = capacity;
    }

    #[inline]
    pub fn load(&self) -> u64 {
        self.load
    }

    #[inline]
    pub fn queue(&self) -> u64 {
        self.queue
    }

    /// current load as a percentage of the capacity
    pub fn utilization(&self) -> f64 {
        self.load as f64 / self.capacity.get() as f64 * 100.0
    }

    /// the link is saturated for this tick or has packets waiting
    pub fn congested(&self) -> bool {
        self.load >= self.capacity.get() || self.queue > 0
    }

    /// Apply `amount` units of load to this tick's usage.
    ///
    /// Returns `true` if the whole amount fits in the remaining capacity.
    /// Otherwise the load is capped at the capacity, the overflow is added
    /// to the backlog queue and `false` is returned.
    pub fn consume_capacity(&mut self, amount: u64) -> bool {
        let capacity = self.capacity.get();
        let requested = self.load.saturating_add(amount);

        if requested <= capacity {
            self.load = requested;
            true
        } else {
            // a capacity reduced mid-tick can leave `load` above the new
            // limit: only the part of `amount` above the limit is queued
            let overflow = requested - capacity.max(self.load);
            self.load = self.load.max(capacity);
            self.queue = self.queue.saturating_add(overflow.min(amount));
            false
        }
    }

    /// Release up to one capacity's worth of the backlog queue.
    ///
    /// Returns the number of packets released.
    pub fn drain_backlog(&mut self) -> u64 {
        let released = self.queue.min(self.capacity.get());
        self.queue -= released;
        released
    }

    /// forget this tick's load
    pub(crate) fn clear_load(&mut self) {
        self.load = 0;
    }

    /// clear the load and the backlog, keeping the capacity
    pub(crate) fn reset(&mut self) {
        self.load = 0;
        self.queue = 0;
    }
}
