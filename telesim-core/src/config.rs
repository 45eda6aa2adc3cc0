//! Initialization input of a [`Simulation`].
//!
//! A [`SimulationConfig`] describes the static topology (node
//! identifiers, directed links and their capacity) and the ordered time
//! slots with their per-node traffic rates. It can be built in code:
//!
//! ```
//! use telesim_core::{
//!     config::SimulationConfig,
//!     measure::{Capacity, PacketRate},
//!     node::NodeId,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let a: NodeId = "A".parse()?;
//! let b: NodeId = "B".parse()?;
//!
//! let mut config = SimulationConfig::empty();
//! config.add_node(a.clone()).add_node(b.clone());
//! config
//!     .configure_link(a.clone(), b.clone())
//!     .set_capacity(Capacity::new(60)?)
//!     .apply();
//! config
//!     .add_time_slot("08:00")
//!     .set_rate(a, PacketRate::new(10))
//!     .apply();
//!
//! config.validate()?;
//! # Ok(()) }
//! ```
//!
//! or loaded from JSON (see [`SimulationConfig`] for the shape).
//!
//! [`Simulation`]: crate::simulation::Simulation

use crate::{
    defaults::{
        DEFAULT_HISTORY_LIMIT, DEFAULT_LINK_CAPACITY, DEFAULT_LINKS, DEFAULT_NODES, DEFAULT_SEED,
        DEFAULT_TIME_SLOTS, MAX_NODE_RATE,
    },
    link::LinkId,
    measure::{Capacity, PacketRate},
    node::NodeId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Complete configuration of a simulation.
///
/// ```json
/// {
///   "nodes": ["A", "B"],
///   "links": [{ "from": "A", "to": "B", "capacity": 60 }],
///   "timeSlots": [{ "label": "08:00", "rates": { "A": 10, "B": 5 } }],
///   "historyLimit": 50,
///   "seed": 0
/// }
/// ```
///
/// `historyLimit` and `seed` are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkConfig>,
    pub time_slots: Vec<TimeSlotConfig>,

    /// maximum number of packets listed by the statistics
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// seed of the default random source
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: Capacity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotConfig {
    pub label: String,
    #[serde(default)]
    pub rates: BTreeMap<NodeId, PacketRate>,
}

/// Error returned by [`SimulationConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the network needs at least one node")]
    NoNodes,
    #[error("node ({node}) is declared more than once")]
    DuplicateNode { node: NodeId },
    #[error("link ({link}) references an unknown node ({node})")]
    UnknownLinkEndpoint { link: LinkId, node: NodeId },
    #[error("link ({link}) connects a node to itself")]
    SelfLink { link: LinkId },
    #[error("link ({link}) is declared more than once")]
    DuplicateLink { link: LinkId },
    #[error("the simulation needs at least one time slot")]
    NoTimeSlots,
    #[error("time slot ({label}) is declared more than once")]
    DuplicateTimeSlot { label: String },
    #[error("time slot ({label}) sets a rate for an unknown node ({node})")]
    UnknownRateNode { label: String, node: NodeId },
    #[error("time slot ({label}) sets the rate of node ({node}) to {rate}, above {max}pps")]
    RateTooHigh {
        label: String,
        node: NodeId,
        rate: PacketRate,
        max: u64,
    },
}

/// Builder for a link of a [`SimulationConfig`].
///
/// Obtained via [`SimulationConfig::configure_link`]. Call
/// [`LinkBuilder::apply`] to commit the link.
pub struct LinkBuilder<'a> {
    from: NodeId,
    to: NodeId,
    capacity: Capacity,
    config: &'a mut SimulationConfig,
}

/// Builder for a time slot of a [`SimulationConfig`].
///
/// Obtained via [`SimulationConfig::add_time_slot`]. Call
/// [`TimeSlotBuilder::apply`] to commit the slot.
pub struct TimeSlotBuilder<'a> {
    label: String,
    rates: BTreeMap<NodeId, PacketRate>,
    config: &'a mut SimulationConfig,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl LinkBuilder<'_> {
    /// Set the capacity of the link.
    ///
    /// Defaults to [`DEFAULT_LINK_CAPACITY`].
    pub fn set_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Commit the link to the configuration.
    ///
    /// A link already declared in the same direction is replaced.
    pub fn apply(self) {
        let Self {
            from,
            to,
            capacity,
            config,
        } = self;

        if let Some(link) = config
            .links
            .iter_mut()
            .find(|link| link.from == from && link.to == to)
        {
            link.capacity = capacity;
        } else {
            config.links.push(LinkConfig { from, to, capacity });
        }
    }
}

impl TimeSlotBuilder<'_> {
    /// Set the rate of `node` for this slot. Unlisted nodes are silent.
    pub fn set_rate(mut self, node: NodeId, rate: PacketRate) -> Self {
        self.rates.insert(node, rate);
        self
    }

    /// Commit the time slot, after the ones already declared.
    pub fn apply(self) {
        let Self {
            label,
            rates,
            config,
        } = self;
        config.time_slots.push(TimeSlotConfig { label, rates });
    }
}

impl SimulationConfig {
    /// A configuration without any node, link or time slot.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            time_slots: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            seed: DEFAULT_SEED,
        }
    }

    pub fn add_node(&mut self, id: NodeId) -> &mut Self {
        self.nodes.push(id);
        self
    }

    pub fn configure_link(&mut self, from: NodeId, to: NodeId) -> LinkBuilder<'_> {
        let capacity = Capacity::new(DEFAULT_LINK_CAPACITY)
            .expect("the default link capacity is strictly positive");
        LinkBuilder {
            from,
            to,
            capacity,
            config: self,
        }
    }

    pub fn add_time_slot(&mut self, label: impl Into<String>) -> TimeSlotBuilder<'_> {
        TimeSlotBuilder {
            label: label.into(),
            rates: BTreeMap::new(),
            config: self,
        }
    }

    pub fn set_history_limit(&mut self, history_limit: usize) -> &mut Self {
        self.history_limit = history_limit;
        self
    }

    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Check the configuration is consistent.
    ///
    /// # Errors
    ///
    /// See [`ConfigError`] for the list of rejected configurations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }
        let mut nodes = HashSet::new();
        for node in &self.nodes {
            if !nodes.insert(node) {
                return Err(ConfigError::DuplicateNode { node: node.clone() });
            }
        }

        let mut links = HashSet::new();
        for link in &self.links {
            let id = LinkId::new(link.from.clone(), link.to.clone());
            for endpoint in [&link.from, &link.to] {
                if !nodes.contains(endpoint) {
                    return Err(ConfigError::UnknownLinkEndpoint {
                        link: id,
                        node: endpoint.clone(),
                    });
                }
            }
            if link.from == link.to {
                return Err(ConfigError::SelfLink { link: id });
            }
            if !links.insert(id.clone()) {
                return Err(ConfigError::DuplicateLink { link: id });
            }
        }

        if self.time_slots.is_empty() {
            return Err(ConfigError::NoTimeSlots);
        }
        let mut labels = HashSet::new();
        for slot in &self.time_slots {
            if !labels.insert(slot.label.as_str()) {
                return Err(ConfigError::DuplicateTimeSlot {
                    label: slot.label.clone(),
                });
            }
            if let Some(node) = slot.rates.keys().find(|node| !nodes.contains(node)) {
                return Err(ConfigError::UnknownRateNode {
                    label: slot.label.clone(),
                    node: node.clone(),
                });
            }
            if let Some((node, rate)) = slot
                .rates
                .iter()
                .find(|(_, rate)| rate.packets_per_sec() > MAX_NODE_RATE)
            {
                return Err(ConfigError::RateTooHigh {
                    label: slot.label.clone(),
                    node: node.clone(),
                    rate: *rate,
                    max: MAX_NODE_RATE,
                });
            }
        }

        Ok(())
    }
}

impl Default for SimulationConfig {
    /// The five nodes network of [`DEFAULT_NODES`] and [`DEFAULT_LINKS`]
    /// with the day of [`DEFAULT_TIME_SLOTS`].
    fn default() -> Self {
        fn node(label: &str) -> NodeId {
            NodeId::new(label).expect("default node labels are not empty")
        }

        let mut config = Self::empty();
        for label in DEFAULT_NODES {
            config.add_node(node(label));
        }
        for (from, to, capacity) in DEFAULT_LINKS {
            config
                .configure_link(node(from), node(to))
                .set_capacity(
                    Capacity::new(capacity).expect("default capacities are strictly positive"),
                )
                .apply();
        }
        for (label, rates) in DEFAULT_TIME_SLOTS {
            let mut slot = config.add_time_slot(label);
            for (node_label, rate) in DEFAULT_NODES.into_iter().zip(rates) {
                slot = slot.set_rate(node(node_label), PacketRate::new(rate));
            }
            slot.apply();
        }
        config
    }
}
