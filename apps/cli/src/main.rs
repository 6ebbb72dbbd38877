use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod core;
mod ui;

use crate::commands::bootstrap::BootstrapCommand;
use crate::commands::launch::LaunchCommand;
use crate::commands::runtimes::RuntimesCommand;
use crate::core::context::AppContext;
use crate::core::error::CliError;

const LOG_ENV: &str = "WEBSTART_LOG";

#[derive(Parser)]
#[command(name = "webstart", version)]
#[command(about = "Launch web start applications on a compatible Java runtime", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Configuration directory (default: ~/.webstart)
    #[arg(long, global = true, env = "WEBSTART_HOME")]
    config_dir: Option<PathBuf>,

    /// Installer response file holding the initial configuration
    #[arg(long, global = true, env = "WEBSTART_VARFILE")]
    varfile: Option<PathBuf>,

    /// Log decisions in detail
    #[arg(long, global = true)]
    verbose: bool,

    /// Seconds a deferred launch waits for the startup notification
    #[arg(long, default_value_t = 5, hide = true)]
    notification_timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments for the application launch, e.g. a descriptor path or URL
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List known Java runtimes
    Runtimes {
        /// Include deactivated runtimes
        #[arg(short, long)]
        all: bool,
    },
    /// Import installer defaults if this is the first start after installation
    Bootstrap,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            e.render();
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let ctx = AppContext::load(cli.config_dir, cli.varfile)?;

    match cli.command {
        Some(Commands::Runtimes { all }) => RuntimesCommand { all }.execute(&ctx).map(|_| 0),
        Some(Commands::Bootstrap) => BootstrapCommand.execute(&ctx).map(|_| 0),
        None => LaunchCommand {
            args: cli.args,
            notification_timeout: Duration::from_secs(cli.notification_timeout),
        }
        .execute(&ctx),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
