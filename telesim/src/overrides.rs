//! Command line overrides of a [`SimulationConfig`].
//!
//! * `NODE=RATE` sets the rate of a node in every time slot, e.g. `A=40`
//!   or `A=40pps`;
//! * `FROM-TO=CAPACITY` sets the capacity of an existing link, e.g.
//!   `D-E=20`.

use std::str::FromStr;
use telesim_core::{
    config::SimulationConfig,
    defaults::MAX_NODE_RATE,
    link::{LinkId, LinkIdParseError},
    measure::{Capacity, CapacityError, PacketRate, PacketRateParseError},
    node::{EmptyNodeId, NodeId},
    simulation::{Simulation, SimulationError},
    traffic::RandomSource,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateOverride {
    pub node: NodeId,
    pub rate: PacketRate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityOverride {
    pub link: LinkId,
    pub capacity: Capacity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideParseError {
    #[error("expecting `{expected}`")]
    MissingValue { expected: &'static str },
    #[error("invalid node: {0}")]
    Node(#[from] EmptyNodeId),
    #[error("invalid rate: {0}")]
    Rate(#[from] PacketRateParseError),
    #[error("rate {rate} is above {max}pps")]
    RateTooHigh { rate: PacketRate, max: u64 },
    #[error("invalid link: {0}")]
    Link(#[from] LinkIdParseError),
    #[error("invalid capacity: {0}")]
    Capacity(#[from] CapacityError),
}

impl RateOverride {
    /// Set the rate in every time slot of `config`.
    ///
    /// Unknown nodes are left for [`SimulationConfig::validate`] to
    /// report.
    pub fn apply(&self, config: &mut SimulationConfig) {
        for slot in &mut config.time_slots {
            slot.rates.insert(self.node.clone(), self.rate);
        }
    }
}

impl CapacityOverride {
    pub fn apply<R>(&self, simulation: &mut Simulation<R>) -> Result<(), SimulationError>
    where
        R: RandomSource,
    {
        simulation.set_link_capacity(self.link.from(), self.link.to(), self.capacity.get())
    }
}

impl FromStr for RateOverride {
    type Err = OverrideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node, rate) = s
            .rsplit_once('=')
            .ok_or(OverrideParseError::MissingValue {
                expected: "NODE=RATE",
            })?;
        let node: NodeId = node.parse()?;
        let rate: PacketRate = rate.parse()?;
        if rate.packets_per_sec() > MAX_NODE_RATE {
            return Err(OverrideParseError::RateTooHigh {
                rate,
                max: MAX_NODE_RATE,
            });
        }
        Ok(Self { node, rate })
    }
}

impl FromStr for CapacityOverride {
    type Err = OverrideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (link, capacity) = s
            .rsplit_once('=')
            .ok_or(OverrideParseError::MissingValue {
                expected: "FROM-TO=CAPACITY",
            })?;
        Ok(Self {
            link: link.trim().parse()?,
            capacity: capacity.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> NodeId {
        label.parse().unwrap()
    }

    #[test]
    fn parse_rate() {
        assert_eq!(
            "A=40".parse::<RateOverride>().unwrap(),
            RateOverride {
                node: id("A"),
                rate: PacketRate::new(40)
            }
        );
        assert_eq!(
            "B = 0pps".parse::<RateOverride>().unwrap().rate,
            PacketRate::ZERO
        );
    }

    #[test]
    fn parse_invalid_rate() {
        assert!(matches!(
            "A40".parse::<RateOverride>(),
            Err(OverrideParseError::MissingValue { .. })
        ));
        assert!(matches!(
            "A=-1".parse::<RateOverride>(),
            Err(OverrideParseError::Rate(PacketRateParseError::Negative))
        ));
        assert!(matches!(
            "=1".parse::<RateOverride>(),
            Err(OverrideParseError::Node(_))
        ));
    }

    #[test]
    fn parse_rate_above_the_maximum() {
        let at_max = format!("A={MAX_NODE_RATE}");
        assert_eq!(
            at_max.parse::<RateOverride>().unwrap().rate,
            PacketRate::new(MAX_NODE_RATE)
        );

        let above = format!("A={}", MAX_NODE_RATE + 1);
        assert_eq!(
            above.parse::<RateOverride>(),
            Err(OverrideParseError::RateTooHigh {
                rate: PacketRate::new(MAX_NODE_RATE + 1),
                max: MAX_NODE_RATE,
            })
        );
        assert!(matches!(
            format!("A={}", u64::MAX).parse::<RateOverride>(),
            Err(OverrideParseError::RateTooHigh { .. })
        ));
    }

    #[test]
    fn parse_capacity() {
        let parsed: CapacityOverride = "D-E=20".parse().unwrap();
        assert_eq!(parsed.link, LinkId::new(id("D"), id("E")));
        assert_eq!(parsed.capacity.get(), 20);

        let parsed: CapacityOverride = "A->B=5pps".parse().unwrap();
        assert_eq!(parsed.link.to(), &id("B"));
    }

    #[test]
    fn parse_invalid_capacity() {
        assert!(matches!(
            "D-E=0".parse::<CapacityOverride>(),
            Err(OverrideParseError::Capacity(CapacityError::Zero))
        ));
        assert!(matches!(
            "DE=10".parse::<CapacityOverride>(),
            Err(OverrideParseError::Link(LinkIdParseError::MissingSeparator))
        ));
    }

    #[test]
    fn rate_applies_to_every_slot() {
        let mut config = SimulationConfig::default();
        "C=1".parse::<RateOverride>().unwrap().apply(&mut config);

        assert!(
            config
                .time_slots
                .iter()
                .all(|slot| slot.rates[&id("C")] == PacketRate::new(1))
        );
    }

    #[test]
    fn capacity_needs_an_existing_link() {
        let mut simulation = Simulation::new(SimulationConfig::default()).unwrap();

        let known: CapacityOverride = "D-E=20".parse().unwrap();
        known.apply(&mut simulation).unwrap();
        assert_eq!(
            simulation.link(&id("D"), &id("E")).unwrap().capacity().get(),
            20
        );

        let unknown: CapacityOverride = "E-D=20".parse().unwrap();
        assert!(matches!(
            unknown.apply(&mut simulation),
            Err(SimulationError::LinkNotFound { .. })
        ));
    }
}
