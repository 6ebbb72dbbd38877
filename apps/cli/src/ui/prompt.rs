use tracing::debug;

use webstart::domain::runtime::{LocalRuntime, RemoteRuntime};

use super::Theme;

/// Asks whether `current` should be replaced by `candidate`.
///
/// Declines without asking when nobody is at the terminal.
pub fn ask_for_update(current: &LocalRuntime, candidate: &RemoteRuntime) -> bool {
    if !console::user_attended_stderr() {
        debug!("Not a terminal, keeping runtime {}", current);
        return false;
    }

    let message = format!(
        "A newer runtime is available: {} (installed: {}). Download it?",
        Theme::bold(&candidate.identity),
        current.identity()
    );
    cliclack::confirm(message)
        .initial_value(true)
        .interact()
        .unwrap_or(false)
}
