mod command;
mod stop;

use self::{
    command::{Command, CommandReceiver, CommandSender, Reply, command_channel},
    stop::Stop,
};
use anyhow::{Context as _, Result, bail};
use std::{
    sync::{Arc, mpsc::RecvTimeoutError},
    thread::JoinHandle,
    time::{Duration, Instant},
};
use telesim_core::{
    config::SimulationConfig,
    measure::PacketRate,
    node::NodeId,
    simulation::{Simulation, TickReport},
    stats::SimulationStats,
    traffic::RandomSource,
};
use tracing::{debug, info, warn};

/// Longest time the driver waits for a command before checking the stop
/// flag again.
const IDLE_POLL: Duration = Duration::from_millis(20);

/// Handle to a [`Simulation`] running on its own thread.
///
/// Every method is turned into a command processed by the driver thread,
/// one at a time: a [`stats`](SimContext::stats) read never observes a
/// half-executed tick and administrative updates never interleave with
/// one.
///
/// While the simulation is running the driver ticks it every `interval`.
pub struct SimContext {
    commands: CommandSender,

    stop: Arc<Stop>,

    thread: JoinHandle<Result<()>>,
}

struct Driver<R> {
    simulation: Simulation<R>,

    commands: CommandReceiver,

    stop: Arc<Stop>,

    interval: Duration,

    /// when to tick next; `None` while the simulation is stopped
    next_tick: Option<Instant>,
}

impl SimContext {
    /// Spawn a driver for a new [`Simulation`] built from `config`.
    pub fn new(config: SimulationConfig, interval: Duration) -> Result<Self> {
        let simulation = Simulation::new(config).context("Invalid simulation configuration")?;
        Self::with_simulation(simulation, interval)
    }

    /// Spawn a driver for an existing `simulation`.
    ///
    /// The simulation keeps its state: if it is already running, the
    /// driver ticks it right away.
    pub fn with_simulation<R>(simulation: Simulation<R>, interval: Duration) -> Result<Self>
    where
        R: RandomSource + Send + 'static,
    {
        if interval.is_zero() {
            bail!("The tick interval cannot be zero")
        }

        let stop = Arc::new(Stop::new());
        let (commands, receiver) = command_channel();

        let driver = Driver::new(simulation, receiver, Arc::clone(&stop), interval);

        let thread = std::thread::Builder::new()
            .name("telesim-driver".to_owned())
            .spawn(move || driver_run(driver))
            .context("Failed to spawn the driver thread")?;

        Ok(Self {
            commands,
            stop,
            thread,
        })
    }

    /// Start a run session and begin ticking every interval.
    pub fn start(&self) -> Result<()> {
        self.commands.request(Command::Start)
    }

    /// Stop ticking. No tick happens after this returns.
    pub fn pause(&self) -> Result<()> {
        self.commands.request(Command::Pause)
    }

    /// Stop ticking and reset the simulation to its initial state.
    pub fn reset(&self) -> Result<()> {
        self.commands.request(Command::Reset)
    }

    /// Execute one tick now, whether the simulation is running or not.
    pub fn tick(&self) -> Result<TickReport> {
        self.commands.request(Command::Tick)
    }

    pub fn stats(&self) -> Result<SimulationStats> {
        self.commands.request(Command::Stats)
    }

    /// Returns `false` if the simulation already is on its last time slot.
    pub fn advance_time_slot(&self) -> Result<bool> {
        self.commands.request(Command::AdvanceTimeSlot)
    }

    /// See [`Simulation::set_node_rate`]; the engine error is passed
    /// through and can be downcast to a
    /// [`SimulationError`](telesim_core::simulation::SimulationError).
    pub fn set_node_rate(&self, node: NodeId, rate: PacketRate) -> Result<()> {
        self.commands
            .request(|reply| Command::SetNodeRate { node, rate, reply })??;
        Ok(())
    }

    /// See [`Simulation::set_link_capacity`].
    pub fn set_link_capacity(&self, from: NodeId, to: NodeId, capacity: u64) -> Result<()> {
        self.commands.request(|reply| Command::SetLinkCapacity {
            from,
            to,
            capacity,
            reply,
        })??;
        Ok(())
    }

    /// Stop the driver thread and wait for it to finish.
    pub fn shutdown(self) -> Result<()> {
        self.stop.raise();

        match self.thread.join() {
            Err(join_error) => {
                bail!("Driver failed to clean shutdown: {join_error:?}")
            }
            Ok(Err(error)) => Err(error).context("Driver failed with error"),
            Ok(Ok(())) => Ok(()),
        }
    }
}

/// send the answer back, the caller may have given up waiting
fn answer<A>(reply: Reply<A>, value: A) {
    if reply.send(value).is_err() {
        debug!("caller dropped before the driver replied");
    }
}

impl<R> Driver<R>
where
    R: RandomSource,
{
    fn new(
        simulation: Simulation<R>,
        commands: CommandReceiver,
        stop: Arc<Stop>,
        interval: Duration,
    ) -> Self {
        let next_tick = simulation
            .is_running()
            .then(|| Instant::now() + interval);
        Self {
            simulation,
            commands,
            stop,
            interval,
            next_tick,
        }
    }

    fn stopped(&self) -> bool {
        self.stop.is_raised()
    }

    /// how long to wait for a command before the next tick is due
    fn timeout(&self) -> Duration {
        match self.next_tick {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(IDLE_POLL),
            None => IDLE_POLL,
        }
    }

    fn inbound(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                self.simulation.start();
                self.next_tick = Some(Instant::now() + self.interval);
                answer(reply, ());
            }
            Command::Pause(reply) => {
                self.simulation.pause();
                self.next_tick = None;
                answer(reply, ());
            }
            Command::Reset(reply) => {
                self.simulation.reset();
                self.next_tick = None;
                answer(reply, ());
            }
            Command::Tick(reply) => {
                let report = self.simulation.tick();
                answer(reply, report);
            }
            Command::Stats(reply) => answer(reply, self.simulation.stats()),
            Command::AdvanceTimeSlot(reply) => {
                let advanced = self.simulation.advance_time_slot();
                answer(reply, advanced);
            }
            Command::SetNodeRate { node, rate, reply } => {
                let outcome = self.simulation.set_node_rate(&node, rate);
                answer(reply, outcome);
            }
            Command::SetLinkCapacity {
                from,
                to,
                capacity,
                reply,
            } => {
                let outcome = self.simulation.set_link_capacity(&from, &to, capacity);
                answer(reply, outcome);
            }
        }
    }

    fn tick_if_due(&mut self) {
        let Some(deadline) = self.next_tick else {
            return;
        };
        let now = Instant::now();
        if now < deadline {
            return;
        }

        self.simulation.tick();

        // keep the cadence, unless the tick itself took longer than the
        // interval: then the missed ticks are skipped
        let mut next = deadline + self.interval;
        if next <= now {
            warn!(late = ?now.duration_since(deadline), "driver is running behind, skipping ticks");
            next = now + self.interval;
        }
        self.next_tick = Some(next);
    }
}

fn driver_run<R>(mut driver: Driver<R>) -> Result<()>
where
    R: RandomSource,
{
    info!(interval = ?driver.interval, "driver started");

    while !driver.stopped() {
        match driver.commands.recv_timeout(driver.timeout()) {
            Ok(command) => driver.inbound(command),
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => {
                // the `SimContext` is gone, nobody can observe the
                // simulation anymore
                driver.stop.raise();
                break;
            }
        }

        driver.tick_if_due();
    }

    info!(step = %driver.simulation.step(), "driver stopped");

    Ok(())
}
