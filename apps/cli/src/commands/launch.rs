use crossbeam_channel::{bounded, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, info, warn};

#[cfg(unix)]
use crossbeam_channel::Sender;

use webstart::application::{LaunchOrchestrator, NotificationClosed, NotificationSender};
use webstart::infrastructure::instance::{self, InstanceRole};
use webstart::infrastructure::JvmProcessLauncher;

use crate::core::context::AppContext;
use crate::core::error::CliError;
use crate::ui::prompt;

const NOTIFICATION_CAPACITY: usize = 16;

pub struct LaunchCommand {
    pub args: Vec<String>,
    /// How long a deferred launch waits for its startup notification.
    pub notification_timeout: Duration,
}

impl LaunchCommand {
    /// Returns the process exit code.
    pub fn execute(self, ctx: &AppContext) -> Result<i32, CliError> {
        // dropping the role releases the instance socket
        let role = instance::claim_for(&ctx.platform, &ctx.paths.instance_socket, &self.args)?;
        if matches!(role, InstanceRole::Forwarded) {
            return Ok(0);
        }

        if let Err(e) = ctx.bootstrap().check() {
            warn!("Initial configuration import failed: {:#}", anyhow::Error::from(e));
        }

        let settings = ctx.settings();
        let selector = ctx.selector(ctx.registry(), &settings, prompt::ask_for_update);
        let launcher = Arc::new(JvmProcessLauncher::new(
            Arc::new(selector),
            settings.requirements(ctx.platform.os_type),
            settings.launcher_entry.clone(),
        ));
        let orchestrator = Arc::new(LaunchOrchestrator::new(
            launcher.clone(),
            Arc::new(ctx.platform.clone()),
        ));

        let startup = start(&orchestrator, &role, self.args, self.notification_timeout)?;
        let exit_code = launcher.wait_all();
        startup.finish(&role);
        Ok(exit_code)
    }
}

/// The notification queue of a started launch and the thread draining it.
struct Startup {
    sender: NotificationSender,
    listener: JoinHandle<()>,
}

impl Startup {
    /// Closes the queue. A standalone launcher also waits for the listener;
    /// the instance socket keeps its own sender alive.
    fn finish(self, role: &InstanceRole) {
        drop(self.sender);
        if matches!(role, InstanceRole::Standalone) && self.listener.join().is_err() {
            error!("Startup notification listener panicked");
        }
    }
}

/// Runs the orchestrator's startup and connects the instance socket to its
/// notification bridge. A deferred launch returns once a notification
/// arrived or `timeout` passed.
fn start(
    orchestrator: &Arc<LaunchOrchestrator>,
    role: &InstanceRole,
    args: Vec<String>,
    timeout: Duration,
) -> Result<Startup, CliError> {
    let bridge = orchestrator
        .startup(args)
        .map_err(|e| CliError::Launch(format!("{:#}", e)))?;
    let (sender, listener) = bridge.listen(NOTIFICATION_CAPACITY)?;

    let (seen_tx, seen_rx) = bounded::<()>(1);
    match role {
        #[cfg(unix)]
        InstanceRole::Primary(primary) => {
            primary.serve(forward_payloads(sender.clone(), seen_tx))?;
        }
        // nothing can report a notification
        _ => drop(seen_tx),
    }

    if orchestrator.defers_initial_launch() {
        fall_back_after(timeout, &seen_rx, &sender)
            .map_err(|e| CliError::Launch(e.to_string()))?;
    }

    Ok(Startup { sender, listener })
}

/// Instance socket handler: signals `seen` and queues the payload.
#[cfg(unix)]
fn forward_payloads(
    sender: NotificationSender,
    seen: Sender<()>,
) -> impl FnMut(String) -> bool + Send + 'static {
    move |payload| {
        let _ = seen.try_send(());
        sender.notify(payload).is_ok()
    }
}

/// Queues an empty notification, so the initial arguments launch alone, unless
/// `seen` fires within `timeout`. Returns whether the fallback was used.
fn fall_back_after(
    timeout: Duration,
    seen: &Receiver<()>,
    sender: &NotificationSender,
) -> Result<bool, NotificationClosed> {
    if seen.recv_timeout(timeout).is_ok() {
        return Ok(false);
    }

    info!("No startup notification received, launching with the initial arguments");
    sender.notify("")?;
    Ok(true)
}
