use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tripforge_core::protocol::{ImportMessage, RunOutcome};

/// Relays run progress and the terminal result to a calling surface.
///
/// `progress`/`error` fire zero or more times per run; `complete` fires
/// exactly once, after the run settles.
pub trait Reporter: Send {
    fn progress(&mut self, message: &str);
    fn error(&mut self, message: &str);
    fn complete(&mut self, outcome: &RunOutcome);
}

/// Reporter backed by structured logs. Used by the CLI for human output.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn progress(&mut self, message: &str) {
        info!("{message}");
    }

    fn error(&mut self, message: &str) {
        warn!("{message}");
    }

    fn complete(&mut self, outcome: &RunOutcome) {
        info!(
            success = outcome.success,
            total = outcome.summary.total,
            successful = outcome.summary.successful,
            failed = outcome.summary.failed,
            "import finished"
        );
    }
}

/// Reporter that forwards wire-shaped messages over a channel, for callers
/// that consume the progress stream elsewhere (IPC, UI).
pub struct ChannelReporter {
    sender: UnboundedSender<ImportMessage>,
}

impl ChannelReporter {
    pub fn new(sender: UnboundedSender<ImportMessage>) -> Self {
        ChannelReporter { sender }
    }

    fn send(&self, message: ImportMessage) {
        // A dropped receiver means nobody is listening; the run itself
        // must not fail because of that.
        let _ = self.sender.send(message);
    }
}

impl Reporter for ChannelReporter {
    fn progress(&mut self, message: &str) {
        self.send(ImportMessage::progress(message));
    }

    fn error(&mut self, message: &str) {
        self.send(ImportMessage::error(message));
    }

    fn complete(&mut self, outcome: &RunOutcome) {
        self.send(ImportMessage::result(outcome));
    }
}
