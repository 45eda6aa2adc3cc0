mod packet;
mod step;

use crate::{
    config::{ConfigError, SimulationConfig},
    defaults::MAX_NODE_RATE,
    link::{Link, LinkId},
    measure::{Capacity, CapacityError, PacketRate},
    network::{Route, Topology},
    node::{Node, NodeId},
    stats::{LinkStats, NodeStats, SimulationStats, Summary},
    traffic::{self, RandomSource, Schedule, TimeSlot},
};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

pub(crate) use self::packet::PacketIdGenerator;
pub use self::{
    packet::{Hop, PacketId, PacketRecord},
    step::Step,
};

/// This is the entry point for all activities with [`telesim_core`].
///
/// The [`Simulation`] owns the whole state of one simulation run: the
/// [`Topology`] with its per-node and per-link counters, the [`Schedule`]
/// of time slots, the step counter, the run flag and the cumulative
/// totals. Every operation goes through `&self` / `&mut self`, so two
/// ticks can never interleave and a [`stats`](Simulation::stats) snapshot
/// always reflects a completed tick.
///
/// The only source of randomness is the destination picker `R`, a seeded
/// [`ChaChaRng`] by default.
///
/// ```
/// use telesim_core::{config::SimulationConfig, simulation::Simulation};
///
/// let mut simulation = Simulation::new(SimulationConfig::default()).unwrap();
/// simulation.advance_time_slot();
/// simulation.tick();
///
/// let stats = simulation.stats();
/// assert_eq!(stats.current_time, "04:00");
/// assert_eq!(stats.simulation_step.into_u64(), 1);
/// assert!(stats.summary.total_packets_transmitted <= stats.summary.total_packets_generated);
/// ```
///
/// [`telesim_core`]: crate
pub struct Simulation<R = ChaChaRng> {
    topology: Topology,
    schedule: Schedule,

    status: Status,
    step: Step,
    totals: Totals,

    /// the last `history_limit` packets of the latest tick
    packets: VecDeque<PacketRecord>,
    packet_ids: PacketIdGenerator,
    history_limit: usize,

    rng: R,
}

/// Whether an external driver should keep calling [`Simulation::tick`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[default]
    Stopped,
    Running,
}

/// Cumulative counters, since the last [`Simulation::reset`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// sum of the rates requested by every tick
    pub generated: u64,
    /// packets delivered end-to-end, plus backlog released afterwards
    pub transmitted: u64,
    /// draws discarded because no route existed
    pub unreachable: u64,
    /// packets queued on at least one saturated link
    pub congested: u64,
}

/// What a single [`Simulation::tick`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// the step counter once the tick completed
    pub step: Step,
    /// sum of the rates of the active time slot
    pub requested: u64,
    /// packets that crossed every link of their route
    pub delivered: u64,
    /// backlog released at the beginning of the tick and counted as
    /// transmitted
    pub released: u64,
    pub unreachable: u64,
    pub congested: u64,
}

/// Error returned by the administrative operations of a [`Simulation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("Node ({node}) Not Found")]
    NodeNotFound { node: NodeId },
    #[error("Link ({link}) Not Found")]
    LinkNotFound { link: LinkId },
    #[error("{0}")]
    InvalidCapacity(#[from] CapacityError),
    #[error("Rate ({rate}) of node ({node}) is above {max}pps")]
    InvalidRate {
        node: NodeId,
        rate: PacketRate,
        max: u64,
    },
}

impl Simulation<ChaChaRng> {
    /// Create a new simulation, picking destinations with a [`ChaChaRng`]
    /// seeded from [`SimulationConfig::seed`].
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found by
    /// [`SimulationConfig::validate`].
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let rng = ChaChaRng::seed_from_u64(config.seed);
        Self::with_random_source(config, rng)
    }

    /// Re-seed the destination picker.
    ///
    /// Two simulations built from the same configuration and seeded with
    /// the same value produce the exact same traffic.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = ChaChaRng::seed_from_u64(seed);
    }
}

impl<R> Simulation<R>
where
    R: RandomSource,
{
    /// Create a new simulation with the given destination picker.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found by
    /// [`SimulationConfig::validate`].
    pub fn with_random_source(config: SimulationConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let SimulationConfig {
            nodes,
            links,
            time_slots,
            history_limit,
            seed: _,
        } = config;

        let topology = Topology::new(
            nodes,
            links
                .into_iter()
                .map(|link| (LinkId::new(link.from, link.to), link.capacity)),
        );
        let schedule = Schedule::new(
            time_slots
                .into_iter()
                .map(|slot| TimeSlot::new(slot.label, slot.rates))
                .collect(),
        );

        Ok(Self {
            topology,
            schedule,
            status: Status::Stopped,
            step: Step::ZERO,
            totals: Totals::default(),
            packets: VecDeque::new(),
            packet_ids: PacketIdGenerator::new(),
            history_limit,
            rng,
        })
    }

    /// Zero every node and link counter (generated, received, loads and
    /// backlog queues).
    ///
    /// Capacities and rates are left as they are: a value changed with
    /// [`set_link_capacity`](Simulation::set_link_capacity) or
    /// [`set_node_rate`](Simulation::set_node_rate) is not restored to the
    /// one of the [`SimulationConfig`].
    ///
    /// Calling it twice in a row is the same as calling it once.
    pub fn initialize(&mut self) {
        self.topology.reset();
        self.packets.clear();
    }

    /// Start (or restart) a run session.
    ///
    /// The node and link state starts again from a clean baseline, see
    /// [`initialize`](Simulation::initialize), but the cumulative totals,
    /// the step counter and the active time slot are preserved.
    pub fn start(&mut self) {
        self.initialize();
        self.status = Status::Running;
        info!(step = %self.step, time_slot = self.schedule.current().label(), "simulation started");
    }

    /// Stop the run session. Nothing but the flag changes.
    pub fn pause(&mut self) {
        self.status = Status::Stopped;
        info!(step = %self.step, "simulation paused");
    }

    /// Go back to the initial state: stopped, step zero, first time slot,
    /// zero totals and clean nodes and links.
    ///
    /// Administrative changes are kept: a capacity changed with
    /// [`set_link_capacity`](Simulation::set_link_capacity) or a rate
    /// changed with [`set_node_rate`](Simulation::set_node_rate) is not
    /// restored to its configured value. Build a new [`Simulation`] from
    /// the [`SimulationConfig`] to get those back.
    pub fn reset(&mut self) {
        self.initialize();
        self.status = Status::Stopped;
        self.step = Step::ZERO;
        self.totals = Totals::default();
        self.schedule.rewind();
        self.packet_ids = PacketIdGenerator::new();
        info!("simulation reset");
    }

    /// Execute one simulation step, whatever the run flag.
    ///
    /// 1. release up to one capacity of every link's backlog;
    /// 2. forget the previous tick's loads and packets;
    /// 3. draw this tick's packets from the active time slot;
    /// 4. route every packet and apply one unit of load on each link of
    ///    its route, queueing what does not fit;
    /// 5. update the counters and move the step forward.
    ///
    /// Draws without a route are discarded but their source's rate still
    /// counts toward the generated total.
    pub fn tick(&mut self) -> TickReport {
        let step = self.step;

        // released backlog belongs to packets already counted as generated:
        // the credit never lets transmitted overtake generated
        let released = self.topology.drain_backlog();
        let pending = self.totals.generated - self.totals.transmitted;
        let released = released.min(pending);

        self.topology.clear_loads();
        self.packets.clear();

        let batch = traffic::generate(
            self.schedule.current(),
            self.topology.nodes(),
            &mut self.rng,
        );
        for (node, rate) in &batch.demands {
            if let Some(node) = self.topology.node_mut(node) {
                node.originate(rate.packets_per_sec());
            }
        }

        let mut report = TickReport {
            requested: batch.requested(),
            released,
            ..TickReport::default()
        };

        for draw in batch.draws {
            let Some(destination) = draw.destination else {
                report.unreachable += 1;
                continue;
            };

            let route = self.topology.cached_route(&draw.source, &destination);
            if route.is_unreachable() {
                trace!(source = %draw.source, destination = %destination, "no route, draw discarded");
                report.unreachable += 1;
                continue;
            }

            let hops = self.transmit(&route);
            let record = PacketRecord::new(
                self.packet_ids.generate(),
                draw.source,
                destination,
                route,
                hops,
                step,
            );

            if record.transmitted() {
                if let Some(node) = self.topology.node_mut(record.destination()) {
                    node.receive();
                }
                report.delivered += 1;
            } else {
                report.congested += 1;
            }
            self.remember(record);
        }

        self.totals.generated = self.totals.generated.saturating_add(report.requested);
        self.totals.transmitted = self
            .totals
            .transmitted
            .saturating_add(report.delivered + report.released);
        self.totals.unreachable = self.totals.unreachable.saturating_add(report.unreachable);
        self.totals.congested = self.totals.congested.saturating_add(report.congested);

        self.step = self.step.next();
        report.step = self.step;

        debug!(
            step = %self.step,
            time_slot = self.schedule.current().label(),
            requested = report.requested,
            delivered = report.delivered,
            released = report.released,
            congested = report.congested,
            unreachable = report.unreachable,
            "tick"
        );

        report
    }

    /// keep `record` in the packet view, dropping the oldest one when full
    fn remember(&mut self, record: PacketRecord) {
        if self.history_limit == 0 {
            return;
        }
        if self.packets.len() == self.history_limit {
            self.packets.pop_front();
        }
        self.packets.push_back(record);
    }

    /// apply one unit of load on every link of `route`
    fn transmit(&mut self, route: &Route) -> Vec<Hop> {
        route
            .hops()
            .map(|hop| {
                let transmitted = match self.topology.hop_link_mut(&hop) {
                    Some(link) => link.consume_capacity(1),
                    None => {
                        // routes only follow configured links
                        warn!(%hop, "no link to bill for this hop");
                        false
                    }
                };
                let (from, to) = hop.into_nodes();
                Hop {
                    from,
                    to,
                    transmitted,
                }
            })
            .collect()
    }

    /// Returns a point-in-time snapshot of the simulation.
    ///
    /// This does not modify anything: two calls without a tick or an
    /// administrative operation in between return equal snapshots.
    pub fn stats(&self) -> SimulationStats {
        let nodes = self
            .topology
            .nodes()
            .iter()
            .map(|node| NodeStats {
                id: node.id().clone(),
                packets_generated: node.packets_generated(),
                packets_received: node.packets_received(),
                current_load: node.current_load(),
            })
            .collect();

        let links = self
            .topology
            .links()
            .iter()
            .map(|link| LinkStats {
                from: link.id().from().clone(),
                to: link.id().to().clone(),
                capacity: link.capacity().get(),
                current_load: link.load(),
                utilization: link.utilization(),
                queue_size: link.queue(),
                congested: link.congested(),
            })
            .collect();

        let packets = self.packets.iter().cloned().collect();

        let summary = Summary {
            total_packets_generated: self.totals.generated,
            total_packets_transmitted: self.totals.transmitted,
            packet_loss: Summary::packet_loss(self.totals.generated, self.totals.transmitted),
            average_queue_size: self.topology.average_queue(),
            unreachable_draws: self.totals.unreachable,
            congested_packets: self.totals.congested,
        };

        SimulationStats {
            current_time: self.schedule.current().label().to_owned(),
            simulation_step: self.step,
            is_running: self.is_running(),
            nodes,
            links,
            packets,
            summary,
        }
    }

    /// Set the rate of `node` in the active time slot only.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidRate`] if `rate` is above
    ///   [`MAX_NODE_RATE`];
    /// - [`SimulationError::NodeNotFound`] if `node` is not part of the
    ///   topology.
    ///
    /// Nothing is modified on error.
    pub fn set_node_rate(&mut self, node: &NodeId, rate: PacketRate) -> Result<(), SimulationError> {
        if rate.packets_per_sec() > MAX_NODE_RATE {
            warn!(%node, %rate, max = MAX_NODE_RATE, "rate update rejected, too high");
            return Err(SimulationError::InvalidRate {
                node: node.clone(),
                rate,
                max: MAX_NODE_RATE,
            });
        }
        if self.topology.node(node).is_none() {
            warn!(%node, %rate, "rate update rejected, unknown node");
            return Err(SimulationError::NodeNotFound { node: node.clone() });
        }

        self.schedule.current_mut().set_rate(node.clone(), rate);
        info!(%node, %rate, time_slot = self.schedule.current().label(), "node rate updated");
        Ok(())
    }

    /// Set the capacity of the link configured from `from` to `to`.
    ///
    /// The link must be matched exactly: the link `to -> from` is a
    /// different link. The new capacity applies from the next tick.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidCapacity`] if `capacity` is `0`;
    /// - [`SimulationError::LinkNotFound`] if there is no such link.
    ///
    /// Nothing is modified on error.
    pub fn set_link_capacity(
        &mut self,
        from: &NodeId,
        to: &NodeId,
        capacity: u64,
    ) -> Result<(), SimulationError> {
        let link = LinkId::new(from.clone(), to.clone());

        let capacity = Capacity::new(capacity).inspect_err(|error| {
            warn!(%link, %error, "capacity update rejected");
        })?;

        let Some(target) = self.topology.link_mut(&link) else {
            warn!(%link, "capacity update rejected, unknown link");
            return Err(SimulationError::LinkNotFound { link });
        };

        target.set_capacity(capacity);
        info!(%link, %capacity, "link capacity updated");
        Ok(())
    }

    /// Move to the next time slot.
    ///
    /// Returns `false`, and does nothing, on the last slot.
    pub fn advance_time_slot(&mut self) -> bool {
        let advanced = self.schedule.advance();
        if advanced {
            info!(time_slot = self.schedule.current().label(), "time slot advanced");
        }
        advanced
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    /// number of ticks executed since the last reset
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn current_time_slot(&self) -> &TimeSlot {
        self.schedule.current()
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        self.schedule.slots()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.topology.node(id)
    }

    pub fn link(&self, from: &NodeId, to: &NodeId) -> Option<&Link> {
        self.topology.link(&LinkId::new(from.clone(), to.clone()))
    }

    /// the route a packet from `from` to `to` would take
    pub fn route(&self, from: &NodeId, to: &NodeId) -> Route {
        self.topology.route(from, to)
    }

    /// the most recent packets of the latest tick, oldest first, at most
    /// `history_limit` of them
    pub fn packets(&self) -> &VecDeque<PacketRecord> {
        &self.packets
    }
}
