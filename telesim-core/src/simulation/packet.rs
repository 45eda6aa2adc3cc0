use super::Step;
use crate::{link::LinkId, network::Route, node::NodeId};
use serde::Serialize;
use std::fmt;

/// a generator for monotonically increasing **unique** [`PacketId`]
#[derive(Debug, Clone)]
pub(crate) struct PacketIdGenerator(u64);

/// # [`PacketRecord`] Identifier
///
/// Unique within one simulation run (until [`Simulation::reset`]).
///
/// [`Simulation::reset`]: crate::simulation::Simulation::reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PacketId(u64);

impl PacketIdGenerator {
    pub(crate) fn new() -> Self {
        Self(1)
    }

    pub(crate) fn generate(&mut self) -> PacketId {
        let id = self.0;
        self.0 = self.0.wrapping_add(1);
        PacketId(id)
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

/// Outcome of a packet crossing one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub from: NodeId,
    pub to: NodeId,
    /// `false` when the link was saturated and the packet was queued
    pub transmitted: bool,
}

/// What happened to one packet generated during a tick.
///
/// Records are created by [`Simulation::tick`] and never modified
/// afterwards.
///
/// [`Simulation::tick`]: crate::simulation::Simulation::tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketRecord {
    id: PacketId,
    source: NodeId,
    destination: NodeId,
    path: Route,
    hops: Vec<Hop>,
    transmitted: bool,
    step: Step,
}

impl PacketRecord {
    pub(crate) fn new(
        id: PacketId,
        source: NodeId,
        destination: NodeId,
        route: Route,
        hops: Vec<Hop>,
        step: Step,
    ) -> Self {
        let transmitted = hops.iter().all(|hop| hop.transmitted);
        Self {
            id,
            source,
            destination,
            path: route,
            hops,
            transmitted,
            step,
        }
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn destination(&self) -> &NodeId {
        &self.destination
    }

    pub fn path(&self) -> &Route {
        &self.path
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// `true` if every link of the path accepted the packet
    pub fn transmitted(&self) -> bool {
        self.transmitted
    }

    /// the step at which the packet was generated
    pub fn step(&self) -> Step {
        self.step
    }

    /// the first link that could not take the packet, if any
    pub fn congested_link(&self) -> Option<LinkId> {
        self.hops
            .iter()
            .find(|hop| !hop.transmitted)
            .map(|hop| LinkId::new(hop.from.clone(), hop.to.clone()))
    }
}
