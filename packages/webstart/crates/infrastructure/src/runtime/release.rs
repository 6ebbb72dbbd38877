//! The `release` file at the root of every JDK/JRE home.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use domain::runtime::RuntimeIdentity;
use domain::system::OperatingSystem;

pub const RELEASE_FILE: &str = "release";

const UNKNOWN_VENDOR: &str = "Unknown";

pub fn is_runtime_home(dir: &Path) -> bool {
    dir.join(RELEASE_FILE).is_file()
}

/// Reads the identity of the runtime installed at `home`.
///
/// `JAVA_VERSION` is required. A missing `IMPLEMENTOR` becomes "Unknown" and a
/// missing or unrecognised `OS_NAME` becomes `fallback_os`.
pub fn read_identity(home: &Path, fallback_os: OperatingSystem) -> Result<RuntimeIdentity> {
    let path = home.join(RELEASE_FILE);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_identity(&content, fallback_os).with_context(|| format!("Invalid {}", path.display()))
}

pub fn parse_identity(content: &str, fallback_os: OperatingSystem) -> Result<RuntimeIdentity> {
    let fields = parse_fields(content);

    let Some(version) = fields.get("JAVA_VERSION").filter(|v| !v.is_empty()) else {
        bail!("JAVA_VERSION is missing");
    };
    let vendor = fields
        .get("IMPLEMENTOR")
        .filter(|v| !v.is_empty())
        .map(String::as_str)
        .unwrap_or(UNKNOWN_VENDOR);
    let operating_system = fields
        .get("OS_NAME")
        .and_then(|os| os.parse().ok())
        .filter(|os| *os != OperatingSystem::Unknown)
        .unwrap_or(fallback_os);

    Ok(RuntimeIdentity::new(version.as_str(), operating_system, vendor))
}

fn parse_fields(content: &str) -> HashMap<&str, String> {
    content
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"').to_string()))
        .collect()
}
