//! Pull-based access to external commands.

use crate::core::{Command, CommandStatus};
use crate::errors::CommandReportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Records how a command was handled.
#[async_trait]
pub trait CommandReporter: Send + Sync {
    /// Reports the outcome of a command.
    async fn report(
        &self,
        command: &Command,
        status: CommandStatus,
    ) -> Result<(), CommandReportError>;
}

/// A command together with the means to report its outcome.
#[derive(Clone)]
pub struct ReportableCommand {
    /// The command.
    pub command: Command,
    reporter: Arc<dyn CommandReporter>,
}

impl ReportableCommand {
    /// Pairs a command with its reporter.
    #[must_use]
    pub fn new(command: Command, reporter: Arc<dyn CommandReporter>) -> Self {
        Self { command, reporter }
    }

    /// Reports the outcome of this command.
    pub async fn report(&self, status: CommandStatus) -> Result<(), CommandReportError> {
        self.reporter.report(&self.command, status).await
    }
}

impl fmt::Debug for ReportableCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportableCommand")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// Lists the commands not yet handled.
///
/// There is no push notification: executors waiting for a command poll.
pub trait CommandLister: Send + Sync {
    /// Returns the pending commands.
    fn list_commands(&self) -> Vec<ReportableCommand>;
}

#[derive(Default)]
struct CommandQueue {
    pending: Vec<Command>,
    handled: HashMap<String, CommandStatus>,
}

/// A command lister kept in memory.
///
/// It is also the reporter for the commands it hands out: a reported
/// command is no longer listed.
#[derive(Clone, Default)]
pub struct InMemoryCommandLister {
    queue: Arc<Mutex<CommandQueue>>,
}

impl InMemoryCommandLister {
    /// Creates an empty lister.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a command.
    pub fn push(&self, command: Command) {
        self.queue.lock().pending.push(command);
    }

    /// Returns how a command was reported, if it was.
    #[must_use]
    pub fn handled(&self, command_id: &str) -> Option<CommandStatus> {
        self.queue.lock().handled.get(command_id).copied()
    }
}

impl fmt::Debug for InMemoryCommandLister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.lock();
        f.debug_struct("InMemoryCommandLister")
            .field("pending", &queue.pending.len())
            .field("handled", &queue.handled.len())
            .finish()
    }
}

impl CommandLister for InMemoryCommandLister {
    fn list_commands(&self) -> Vec<ReportableCommand> {
        let pending = self.queue.lock().pending.clone();
        let reporter: Arc<dyn CommandReporter> = Arc::new(self.clone());
        pending
            .into_iter()
            .map(|command| ReportableCommand::new(command, reporter.clone()))
            .collect()
    }
}

#[async_trait]
impl CommandReporter for InMemoryCommandLister {
    async fn report(
        &self,
        command: &Command,
        status: CommandStatus,
    ) -> Result<(), CommandReportError> {
        let mut queue = self.queue.lock();
        let position = queue
            .pending
            .iter()
            .position(|c| c.id == command.id)
            .ok_or_else(|| CommandReportError::new(&command.id, "command is not pending"))?;
        queue.pending.remove(position);
        queue.handled.insert(command.id.clone(), status);
        Ok(())
    }
}
