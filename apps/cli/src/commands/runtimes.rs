use webstart::domain::runtime::LocalRuntime;

use crate::core::context::AppContext;
use crate::core::error::CliError;
use crate::ui::Theme;

/// Lists the runtimes the registry knows about, most recently used first.
pub struct RuntimesCommand {
    pub all: bool,
}

impl RuntimesCommand {
    pub fn execute(self, ctx: &AppContext) -> Result<(), CliError> {
        let runtimes: Vec<LocalRuntime> = ctx
            .registry()
            .snapshot()
            .into_iter()
            .filter(|r| self.all || r.is_active())
            .collect();

        if runtimes.is_empty() {
            println!("{} No runtimes found", Theme::warning("!"));
            return Ok(());
        }

        for runtime in runtimes {
            let mut flags = Vec::new();
            if !runtime.is_managed() {
                flags.push("system");
            }
            if !runtime.is_active() {
                flags.push("inactive");
            }

            println!(
                "{} {:<12} {:<8} {} {}",
                Theme::bold(format!("{:<24}", runtime.vendor())),
                runtime.version(),
                runtime.operating_system().to_string(),
                Theme::muted(runtime.install_path().display()),
                Theme::warning(flags.join(", "))
            );
        }
        Ok(())
    }
}
