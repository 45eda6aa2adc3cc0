/*!
# Telecommunication traffic simulation

A discrete, deterministic packet-traffic simulation over a small
network of nodes joined by capacity-limited links.

Every [`tick`](simulation::Simulation::tick) of the [`Simulation`]:

1. releases part of each link's backlog queue;
2. draws packets from every node, at the rate of the active
   [time slot](traffic::TimeSlot), to random destinations;
3. routes every packet on the shortest path by hop count;
4. bills one unit of load on each link of the route, queueing what
   does not fit in the link's capacity.

```
use telesim_core::{config::SimulationConfig, simulation::Simulation};

let mut simulation = Simulation::new(SimulationConfig::default()).unwrap();

simulation.start();
for _ in 0..10 {
    simulation.tick();
}

let stats = simulation.stats();
assert_eq!(stats.simulation_step.into_u64(), 10);
assert!(stats.summary.packet_loss >= 0.0);
```

There is no clock in this crate: the owner of the [`Simulation`]
decides when to tick, whatever the [`Status`].
*/

pub mod config;
pub mod defaults;
pub mod link;
pub mod measure;
pub mod network;
pub mod node;
pub mod simulation;
pub mod stats;
pub mod traffic;

pub use self::{
    config::{ConfigError, SimulationConfig},
    link::{Link, LinkId},
    measure::{Capacity, PacketRate},
    network::{Route, Topology},
    node::{Node, NodeId},
    simulation::{Simulation, SimulationError, Status, Step, TickReport},
    stats::SimulationStats,
};
