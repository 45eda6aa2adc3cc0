//! Default values used by [`SimulationConfig::default`].
//!
//! [`SimulationConfig::default`]: crate::config::SimulationConfig

/// Default node identifiers
pub const DEFAULT_NODES: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Default links, as `(from, to, capacity in packets/s)`
///
/// ```text
///        B ──70── D
///       /        / \
///     100      90   60
///     /        /     \
///    A ──80── C ─100─ E
/// ```
pub const DEFAULT_LINKS: [(&str, &str, u64); 6] = [
    ("A", "B", 100),
    ("A", "C", 80),
    ("B", "D", 70),
    ("C", "D", 90),
    ("C", "E", 100),
    ("D", "E", 60),
];

/// Default capacity of a link configured without an explicit one
///
/// See [`LinkBuilder::set_capacity`].
///
/// [`LinkBuilder::set_capacity`]: crate::config::LinkBuilder::set_capacity
pub const DEFAULT_LINK_CAPACITY: u64 = 100;

/// Default time slots: a label and the rate of each of the
/// [`DEFAULT_NODES`], in the same order.
///
/// The day starts quiet, peaks over the working hours and calms down in
/// the evening.
pub const DEFAULT_TIME_SLOTS: [(&str, [u64; 5]); 6] = [
    ("00:00", [5, 3, 4, 3, 2]),
    ("04:00", [3, 2, 2, 2, 1]),
    ("08:00", [30, 20, 25, 20, 15]),
    ("12:00", [40, 30, 35, 25, 20]),
    ("16:00", [35, 25, 30, 25, 20]),
    ("20:00", [15, 10, 12, 10, 8]),
];

/// Highest rate a node can be given, in packets/s.
///
/// Every packet of a tick is drawn, routed and billed one by one: the
/// rates bound the work of a single tick.
pub const MAX_NODE_RATE: u64 = 10_000;

/// Default number of packets returned by [`Simulation::stats`].
///
/// [`Simulation::stats`]: crate::simulation::Simulation::stats
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default seed of the destination picker.
///
/// ```
/// # use telesim_core::defaults::*;
/// assert_eq!(DEFAULT_SEED, 0);
/// ```
pub const DEFAULT_SEED: u64 = 0;
