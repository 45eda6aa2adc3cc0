use crate::{measure::PacketRate, node::NodeId};
use std::collections::BTreeMap;

/// A named period of the day (e.g. `"08:00"`) with its own traffic table.
///
/// Nodes missing from the table do not originate any traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    label: String,
    rates: BTreeMap<NodeId, PacketRate>,
}

impl TimeSlot {
    pub fn new(label: impl Into<String>, rates: BTreeMap<NodeId, PacketRate>) -> Self {
        Self {
            label: label.into(),
            rates,
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// the rate of `node` in this slot, zero if not listed
    pub fn rate(&self, node: &NodeId) -> PacketRate {
        self.rates.get(node).copied().unwrap_or_default()
    }

    pub fn rates(&self) -> &BTreeMap<NodeId, PacketRate> {
        &self.rates
    }

    pub(crate) fn set_rate(&mut self, node: NodeId, rate: PacketRate) {
        self.rates.insert(node, rate);
    }
}

/// The ordered sequence of [`TimeSlot`]s and the active one.
///
/// Advancing past the last slot has no effect: the schedule saturates, it
/// never wraps around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    slots: Vec<TimeSlot>,
    current: usize,
}

impl Schedule {
    /// Create a schedule starting on the first slot.
    ///
    /// `slots` is expected to hold at least one slot; with none, the
    /// active slot is an empty table labelled `""`.
    pub fn new(slots: Vec<TimeSlot>) -> Self {
        let slots = if slots.is_empty() {
            vec![TimeSlot::new("", BTreeMap::new())]
        } else {
            slots
        };
        Self { slots, current: 0 }
    }

    pub fn current(&self) -> &TimeSlot {
        &self.slots[self.current]
    }

    pub(crate) fn current_mut(&mut self) -> &mut TimeSlot {
        &mut self.slots[self.current]
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.slots.len()
    }

    /// Move to the next slot.
    ///
    /// Returns `false` (and does nothing) on the last slot.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// go back to the first slot
    pub fn rewind(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> NodeId {
        label.parse().unwrap()
    }

    fn schedule() -> Schedule {
        Schedule::new(
            ["00:00", "08:00", "16:00"]
                .into_iter()
                .map(|label| {
                    TimeSlot::new(label, BTreeMap::from([(id("A"), PacketRate::new(5))]))
                })
                .collect(),
        )
    }

    #[test]
    fn starts_on_first_slot() {
        let schedule = schedule();
        assert_eq!(schedule.current().label(), "00:00");
        assert_eq!(schedule.current_index(), 0);
    }

    #[test]
    fn advance_saturates() {
        let mut schedule = schedule();
        assert!(schedule.advance());
        assert!(schedule.advance());
        assert!(schedule.is_last());

        for _ in 0..10 {
            assert!(!schedule.advance());
        }
        assert_eq!(schedule.current().label(), "16:00");
    }

    #[test]
    fn rewind() {
        let mut schedule = schedule();
        schedule.advance();
        schedule.rewind();
        assert_eq!(schedule.current().label(), "00:00");
    }

    #[test]
    fn set_rate_only_touches_current_slot() {
        let mut schedule = schedule();
        schedule.advance();
        schedule.current_mut().set_rate(id("A"), PacketRate::ZERO);

        assert_eq!(schedule.slots()[0].rate(&id("A")), PacketRate::new(5));
        assert_eq!(schedule.slots()[1].rate(&id("A")), PacketRate::ZERO);
        assert_eq!(schedule.slots()[2].rate(&id("A")), PacketRate::new(5));
    }

    #[test]
    fn missing_node_has_zero_rate() {
        assert_eq!(schedule().current().rate(&id("Z")), PacketRate::ZERO);
    }

    #[test]
    fn empty_schedule_has_a_placeholder_slot() {
        let mut schedule = Schedule::new(Vec::new());
        assert_eq!(schedule.current().label(), "");
        assert!(!schedule.advance());
    }
}
