/*!
# Telesim driver

Runs a [`Simulation`] on its own thread, ticking it at a fixed wall-clock
interval while it is running, and serializes every other operation on
that same thread.

```no_run
use std::time::Duration;
use telesim::{SimContext, SimulationConfig};

# fn main() -> anyhow::Result<()> {
let context = SimContext::new(SimulationConfig::default(), Duration::from_millis(100))?;

context.start()?;
std::thread::sleep(Duration::from_secs(1));
context.pause()?;

let stats = context.stats()?;
println!("{} ticks, {:.2}% loss", stats.simulation_step, stats.summary.packet_loss);

context.shutdown()?;
# Ok(()) }
```
*/

mod driver;
pub mod overrides;

// convenient re-export of `telesim_core` core objects
pub use telesim_core::{
    Capacity, LinkId, NodeId, PacketRate, Simulation, SimulationConfig, SimulationError,
    SimulationStats, TickReport,
};

pub use self::{
    driver::SimContext,
    overrides::{CapacityOverride, OverrideParseError, RateOverride},
};
