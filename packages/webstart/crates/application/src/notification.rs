//! Re-invocations of an already running launcher.
//!
//! The OS (or a second launcher process) reports a new invocation on a thread
//! we do not control. Payloads are pushed into a bounded channel and drained
//! by one listener thread; each merge-and-launch additionally runs under the
//! bridge's serialisation lock, so direct callers never interleave either.

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::launch::LaunchOrchestrator;

#[derive(Error, Debug)]
#[error("Notification listener has stopped")]
pub struct NotificationClosed;

pub struct StartupNotificationBridge {
    orchestrator: Arc<LaunchOrchestrator>,
    initial_args: Vec<String>,
    serial: Mutex<()>,
}

impl StartupNotificationBridge {
    pub fn new(orchestrator: Arc<LaunchOrchestrator>, initial_args: Vec<String>) -> Self {
        Self {
            orchestrator,
            initial_args,
            serial: Mutex::new(()),
        }
    }

    pub fn initial_args(&self) -> &[String] {
        &self.initial_args
    }

    /// Initial arguments followed by the whitespace-separated payload.
    pub fn merge(&self, payload: &str) -> Vec<String> {
        self.initial_args
            .iter()
            .cloned()
            .chain(payload.split_whitespace().map(str::to_string))
            .collect()
    }

    /// Merges `payload` with the initial arguments and launches.
    ///
    /// Runs under the bridge lock. A panicking launcher is turned into an
    /// error; the lock is released on every path.
    pub fn on_notification(&self, payload: &str) -> Result<()> {
        let _guard = self.serial.lock();

        info!("Startup notification received with parameters '{}'", payload);
        let merged = self.merge(payload);

        match panic::catch_unwind(AssertUnwindSafe(|| self.orchestrator.launch(&merged))) {
            Ok(result) => result,
            Err(_) => Err(anyhow!("Launch panicked for notification '{}'", payload)),
        }
    }

    /// Starts the listener thread. It runs until every sender is dropped.
    pub fn listen(
        self: &Arc<Self>,
        capacity: usize,
    ) -> std::io::Result<(NotificationSender, JoinHandle<()>)> {
        let (tx, rx) = bounded(capacity.max(1));
        let bridge = Arc::clone(self);

        let handle = thread::Builder::new()
            .name("startup-notifications".into())
            .spawn(move || bridge.drain(rx))?;

        Ok((NotificationSender { tx }, handle))
    }

    fn drain(&self, rx: Receiver<String>) {
        for payload in rx.iter() {
            if let Err(e) = self.on_notification(&payload) {
                error!("Failed to handle startup notification: {:#}", e);
            }
        }
        debug!("Startup notification listener stopped");
    }
}

/// Cloneable handle for delivering notifications to a bridge's listener.
#[derive(Clone)]
pub struct NotificationSender {
    tx: Sender<String>,
}

impl NotificationSender {
    /// Queues a payload, blocking while the queue is full.
    pub fn notify(&self, payload: impl Into<String>) -> Result<(), NotificationClosed> {
        self.tx.send(payload.into()).map_err(|_| NotificationClosed)
    }
}
