//! Traffic generation.
//!
//! Every tick, each node of the active [`TimeSlot`] with a non-zero rate
//! emits exactly `rate` packet draws. Each draw picks a destination
//! uniformly among the other nodes. This is the only place the
//! simulation consumes randomness, through a [`RandomSource`].

mod schedule;

use crate::{measure::PacketRate, node::Node, node::NodeId};
use rand_core::Rng;

pub use self::schedule::{Schedule, TimeSlot};

/// The source of randomness used to pick packet destinations.
///
/// Every [`rand_core::Rng`] is a `RandomSource`; the simulation uses a
/// seeded [`ChaChaRng`] by default. Tests can inject a [`FixedSequence`]
/// to control exactly where each packet goes.
///
/// [`ChaChaRng`]: rand_chacha::ChaChaRng
pub trait RandomSource {
    /// Returns an index in `0..upper`. `upper` is never `0`.
    fn next_index(&mut self, upper: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn next_index(&mut self, upper: usize) -> usize {
        // multiply-shift: maps the 64 random bits onto `0..upper`
        ((u128::from(self.next_u64()) * upper as u128) >> 64) as usize
    }
}

/// A [`RandomSource`] replaying a fixed list of indices, in a loop.
///
/// Each value is reduced modulo the requested bound.
///
/// ```
/// use telesim_core::traffic::{FixedSequence, RandomSource};
///
/// let mut source = FixedSequence::new([0, 3]);
/// assert_eq!(source.next_index(4), 0);
/// assert_eq!(source.next_index(2), 1);
/// assert_eq!(source.next_index(4), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixedSequence {
    values: Vec<usize>,
    position: usize,
}

impl FixedSequence {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Self {
        Self {
            values: values.into_iter().collect(),
            position: 0,
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_index(&mut self, upper: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position = self.position.wrapping_add(1);
        value % upper
    }
}

/// One packet draw of a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub source: NodeId,
    /// `None` when the source has no other node to send to
    pub destination: Option<NodeId>,
}

/// What the traffic generator produced for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficBatch {
    /// per node rate for this tick, in node order, zero rates included
    pub demands: Vec<(NodeId, PacketRate)>,
    /// the individual packet draws, grouped by source in node order
    pub draws: Vec<Draw>,
}

impl TrafficBatch {
    /// sum of the rates requested this tick
    pub fn requested(&self) -> u64 {
        self.demands
            .iter()
            .map(|(_, rate)| rate.packets_per_sec())
            .fold(0, u64::saturating_add)
    }
}

/// Produce this tick's traffic for `nodes` under `slot`.
pub fn generate<R>(slot: &TimeSlot, nodes: &[Node], source: &mut R) -> TrafficBatch
where
    R: RandomSource + ?Sized,
{
    let mut batch = TrafficBatch::default();

    for (index, node) in nodes.iter().enumerate() {
        let rate = slot.rate(node.id());
        batch.demands.push((node.id().clone(), rate));

        for _ in 0..rate.packets_per_sec() {
            let destination = if nodes.len() < 2 {
                None
            } else {
                // skip over the source itself
                let mut pick = source.next_index(nodes.len() - 1);
                if pick >= index {
                    pick += 1;
                }
                Some(nodes[pick].id().clone())
            };

            batch.draws.push(Draw {
                source: node.id().clone(),
                destination,
            });
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng as _;
    use std::collections::BTreeMap;

    fn id(label: &str) -> NodeId {
        label.parse().unwrap()
    }

    fn nodes(labels: &[&str]) -> Vec<Node> {
        labels.iter().map(|label| Node::new(id(label))).collect()
    }

    fn slot(rates: &[(&str, u64)]) -> TimeSlot {
        TimeSlot::new(
            "08:00",
            rates
                .iter()
                .map(|(node, rate)| (id(node), PacketRate::new(*rate)))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn emits_exactly_rate_draws_per_node() {
        let nodes = nodes(&["A", "B", "C"]);
        let slot = slot(&[("A", 3), ("B", 0), ("C", 2)]);
        let mut rng = ChaChaRng::seed_from_u64(7);

        let batch = generate(&slot, &nodes, &mut rng);

        assert_eq!(batch.requested(), 5);
        assert_eq!(batch.draws.len(), 5);
        assert_eq!(
            batch.draws.iter().filter(|d| d.source == id("A")).count(),
            3
        );
        assert_eq!(
            batch.draws.iter().filter(|d| d.source == id("B")).count(),
            0
        );
        assert_eq!(
            batch.demands,
            vec![
                (id("A"), PacketRate::new(3)),
                (id("B"), PacketRate::ZERO),
                (id("C"), PacketRate::new(2)),
            ]
        );
    }

    #[test]
    fn destination_is_never_the_source() {
        let nodes = nodes(&["A", "B", "C", "D", "E"]);
        let slot = slot(&[("A", 200), ("C", 200), ("E", 200)]);
        let mut rng = ChaChaRng::seed_from_u64(42);

        let batch = generate(&slot, &nodes, &mut rng);

        assert!(
            batch
                .draws
                .iter()
                .all(|draw| draw.destination.as_ref() != Some(&draw.source))
        );
    }

    #[test]
    fn every_other_node_can_be_picked() {
        let nodes = nodes(&["A", "B", "C", "D", "E"]);
        let slot = slot(&[("C", 400)]);
        let mut rng = ChaChaRng::seed_from_u64(1);

        let batch = generate(&slot, &nodes, &mut rng);

        for other in ["A", "B", "D", "E"] {
            assert!(
                batch
                    .draws
                    .iter()
                    .any(|draw| draw.destination == Some(id(other))),
                "{other} never picked"
            );
        }
    }

    #[test]
    fn fixed_sequence_skips_the_source() {
        let nodes = nodes(&["A", "B", "C"]);
        let slot = slot(&[("B", 2)]);
        let mut source = FixedSequence::new([0, 1]);

        let batch = generate(&slot, &nodes, &mut source);

        let destinations: Vec<_> = batch.draws.into_iter().map(|d| d.destination).collect();
        assert_eq!(destinations, [Some(id("A")), Some(id("C"))]);
    }

    #[test]
    fn same_seed_same_traffic() {
        let nodes = nodes(&["A", "B", "C", "D"]);
        let slot = slot(&[("A", 20), ("D", 20)]);

        let first = generate(&slot, &nodes, &mut ChaChaRng::seed_from_u64(3));
        let second = generate(&slot, &nodes, &mut ChaChaRng::seed_from_u64(3));
        assert_eq!(first, second);
    }

    #[test]
    fn lonely_node_has_no_destination() {
        let nodes = nodes(&["A"]);
        let slot = slot(&[("A", 2)]);

        let batch = generate(&slot, &nodes, &mut FixedSequence::default());

        assert_eq!(batch.requested(), 2);
        assert!(batch.draws.iter().all(|draw| draw.destination.is_none()));
    }

    #[test]
    fn random_index_is_in_bounds() {
        let mut rng = ChaChaRng::seed_from_u64(9);
        for upper in 1..50 {
            assert!(rng.next_index(upper) < upper);
        }
    }
}
