use kt_types::Requester;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Commands accepted by the order monitor task
#[derive(Debug)]
pub enum MonitorCommand {
    Watch { txid: String, recipient: Requester },
    ActiveWatches { respond_to: oneshot::Sender<Vec<String>> },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("Order monitor is not running")]
    Stopped,
}

/// Handle for registering orders with the monitor task
#[derive(Clone, Debug)]
pub struct MonitorHandle {
    command_tx: UnboundedSender<MonitorCommand>,
}

impl MonitorHandle {
    pub fn new(command_tx: UnboundedSender<MonitorCommand>) -> Self {
        Self { command_tx }
    }

    /// Watch `txid` until it closes; the first poll happens right away
    pub fn watch(&self, txid: impl Into<String>, recipient: Requester) -> Result<(), MonitorError> {
        self.command_tx
            .send(MonitorCommand::Watch { txid: txid.into(), recipient })
            .map_err(|_| MonitorError::Stopped)
    }

    /// Transaction ids currently being watched, sorted
    pub async fn active_watches(&self) -> Result<Vec<String>, MonitorError> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(MonitorCommand::ActiveWatches { respond_to: tx })
            .map_err(|_| MonitorError::Stopped)?;
        rx.await.map_err(|_| MonitorError::Stopped)
    }
}
