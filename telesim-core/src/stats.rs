//! Simulation statistics.
//!
//! [`SimulationStats`] is a point-in-time snapshot of the simulation.
//! Obtain one via [`Simulation::stats`](crate::simulation::Simulation::stats).
//!
//! Every type serialises to the camelCase JSON expected by the service
//! layer, e.g. for the summary:
//!
//! ```json
//! {
//!   "totalPacketsGenerated": 120,
//!   "totalPacketsTransmitted": 110,
//!   "packetLoss": 8.333333333333332,
//!   "averageQueueSize": 1.5,
//!   "unreachableDraws": 0,
//!   "congestedPackets": 10
//! }
//! ```

use crate::{
    node::NodeId,
    simulation::{PacketRecord, Step},
};
use serde::Serialize;

/// Snapshot of statistics for a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub id: NodeId,
    /// packets originated by the node since the last (re)initialisation
    pub packets_generated: u64,
    /// packets delivered end-to-end to the node
    pub packets_received: u64,
    /// packets/s originated during the latest tick
    pub current_load: u64,
}

/// Snapshot of statistics for a single directed link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: u64,
    pub current_load: u64,
    /// `current_load / capacity`, as a percentage
    pub utilization: f64,
    pub queue_size: u64,
    /// load at or above capacity, or a non-empty queue
    pub congested: bool,
}

/// Cumulative counters of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_packets_generated: u64,
    pub total_packets_transmitted: u64,
    /// `(generated - transmitted) / generated`, as a percentage; `0` when
    /// nothing was generated
    pub packet_loss: f64,
    pub average_queue_size: f64,
    /// draws discarded because the destination could not be reached
    pub unreachable_draws: u64,
    /// packets that met a saturated link on their path
    pub congested_packets: u64,
}

/// Point-in-time snapshot of the entire simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    /// label of the active time slot
    pub current_time: String,
    pub simulation_step: Step,
    pub is_running: bool,
    pub nodes: Vec<NodeStats>,
    pub links: Vec<LinkStats>,
    /// the most recent packets of the latest tick
    pub packets: Vec<PacketRecord>,
    pub summary: Summary,
}

impl Summary {
    /// Percentage of generated packets that were not transmitted.
    ///
    /// ```
    /// # use telesim_core::stats::Summary;
    /// assert_eq!(Summary::packet_loss(0, 0), 0.0);
    /// assert_eq!(Summary::packet_loss(200, 150), 25.0);
    /// ```
    pub fn packet_loss(generated: u64, transmitted: u64) -> f64 {
        if generated == 0 {
            return 0.0;
        }
        generated.saturating_sub(transmitted) as f64 / generated as f64 * 100.0
    }
}
