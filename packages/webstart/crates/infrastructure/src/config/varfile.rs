use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use domain::ports::InstallerVariables;

const INSTALLATION_DATE: &str = "installationDate";
const LOCKED_SUFFIX: &str = ".locked";

/// Variables recorded by the installer in a `response.varfile`.
///
/// The file holds `name=value` lines; `#` starts a comment. A variable is
/// locked when `name.locked=true` is present.
#[derive(Debug, Default, Clone)]
pub struct InstallerVariablesFile {
    variables: HashMap<String, String>,
}

impl InstallerVariablesFile {
    /// Reads `path`. A missing file means nothing was installed.
    pub fn open(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("Reading installer variables from {}", path.display());
                Ok(Self::parse(&content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No installer variables at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn parse(content: &str) -> Self {
        let variables = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match line.split_once('=') {
                Some((name, value)) => Some((name.trim().to_string(), value.trim().to_string())),
                None => {
                    warn!("Skipping malformed installer variable line '{}'", line);
                    None
                }
            })
            .collect();

        Self { variables }
    }
}

impl InstallerVariables for InstallerVariablesFile {
    fn variable(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }

    fn is_variable_locked(&self, name: &str) -> bool {
        self.variables
            .get(&format!("{name}{LOCKED_SUFFIX}"))
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    fn installation_timestamp(&self) -> Option<i64> {
        let raw = self.variables.get(INSTALLATION_DATE)?;
        match raw.parse() {
            Ok(at) => Some(at),
            Err(_) => {
                warn!("Ignoring unparsable {} '{}'", INSTALLATION_DATE, raw);
                None
            }
        }
    }
}
