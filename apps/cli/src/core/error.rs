use thiserror::Error;

use webstart::domain::runtime::SelectionError;
use webstart::infrastructure::config::ConfigStoreError;
use webstart::infrastructure::instance::InstanceError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Launch failed: {0}")]
    Launch(String),

    #[error("Instance error: {0}")]
    Instance(#[from] InstanceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigStoreError> for CliError {
    fn from(e: ConfigStoreError) -> Self {
        CliError::Config(format!("{:#}", anyhow::Error::from(e)))
    }
}

impl From<SelectionError> for CliError {
    fn from(e: SelectionError) -> Self {
        CliError::Runtime(format!("{:#}", anyhow::Error::from(e)))
    }
}

impl CliError {
    /// Returns a themed, actionable suggestion for the error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CliError::Config(_) => {
                Some("Check deployment.toml in the configuration directory for syntax errors.".to_string())
            }
            CliError::Runtime(_) => Some(
                "Install a matching Java runtime or set webstart.jvm.manager.server.default to a download server."
                    .to_string(),
            ),
            CliError::Instance(_) => {
                Some("Remove a leftover instance.sock if no launcher is running.".to_string())
            }
            _ => None,
        }
    }

    pub fn render(&self) {
        eprintln!("\n{} {}", console::style("Error:").red().bold(), self);
        if let Some(s) = self.suggestion() {
            eprintln!("{} {}", console::style("  help:").dim(), s);
        }
    }
}
