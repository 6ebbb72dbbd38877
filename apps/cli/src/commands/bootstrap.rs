use webstart::domain::ports::ConfigStore;
use webstart::domain::config::LAST_BOOTSTRAP_KEY;

use crate::core::context::AppContext;
use crate::core::error::CliError;
use crate::ui::Theme;

/// Runs only the first-start configuration import.
pub struct BootstrapCommand;

impl BootstrapCommand {
    pub fn execute(self, ctx: &AppContext) -> Result<(), CliError> {
        let bootstrap = ctx.bootstrap();
        let first_start = bootstrap.is_first_start();

        bootstrap
            .check()
            .map_err(|e| CliError::Config(format!("{:#}", anyhow::Error::from(e))))?;

        if first_start {
            println!(
                "{} Imported installer defaults into {}",
                Theme::success("✔"),
                Theme::muted(ctx.paths.config_file.display())
            );
        } else {
            println!(
                "{} Configuration already initialised (at {})",
                Theme::primary("ℹ"),
                ctx.store
                    .get_property(LAST_BOOTSTRAP_KEY)
                    .unwrap_or_default()
            );
        }
        Ok(())
    }
}
