use anyhow::{Context as _, Result, anyhow};
use std::{
    sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, sync_channel},
    time::Duration,
};
use telesim_core::{
    measure::PacketRate, node::NodeId, simulation::SimulationError, simulation::TickReport,
    stats::SimulationStats,
};

/// Number of commands that can wait for the driver before the callers
/// block.
const COMMAND_BUFFER: usize = 64;

pub(crate) type Reply<A> = SyncSender<A>;

pub(crate) enum Command {
    Start(Reply<()>),
    Pause(Reply<()>),
    Reset(Reply<()>),
    Tick(Reply<TickReport>),
    Stats(Reply<SimulationStats>),
    AdvanceTimeSlot(Reply<bool>),
    SetNodeRate {
        node: NodeId,
        rate: PacketRate,
        reply: Reply<Result<(), SimulationError>>,
    },
    SetLinkCapacity {
        from: NodeId,
        to: NodeId,
        capacity: u64,
        reply: Reply<Result<(), SimulationError>>,
    },
}

pub(crate) struct CommandSender(SyncSender<Command>);

pub(crate) struct CommandReceiver(Receiver<Command>);

pub(crate) fn command_channel() -> (CommandSender, CommandReceiver) {
    let (sender, receiver) = sync_channel(COMMAND_BUFFER);

    (CommandSender(sender), CommandReceiver(receiver))
}

impl Command {
    /// name used in the error messages
    fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Pause(_) => "pause",
            Self::Reset(_) => "reset",
            Self::Tick(_) => "tick",
            Self::Stats(_) => "stats",
            Self::AdvanceTimeSlot(_) => "advance time slot",
            Self::SetNodeRate { .. } => "set node rate",
            Self::SetLinkCapacity { .. } => "set link capacity",
        }
    }
}

impl CommandSender {
    /// Send the command built by `command` and wait for the driver's
    /// answer.
    pub(crate) fn request<A, F>(&self, command: F) -> Result<A>
    where
        F: FnOnce(Reply<A>) -> Command,
    {
        let (reply, answer) = sync_channel(1);
        let command = command(reply);
        let name = command.name();

        self.0
            .send(command)
            .map_err(|_| anyhow!("Failed to send {name} command, the driver is not running"))?;

        answer
            .recv()
            .with_context(|| format!("Failed to receive response from the driver about {name}"))
    }
}

impl CommandReceiver {
    /// Wait up to `timeout` for the next command.
    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Result<Command, RecvTimeoutError> {
        self.0.recv_timeout(timeout)
    }
}
