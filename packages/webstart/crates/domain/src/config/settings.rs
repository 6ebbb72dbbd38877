use semver::VersionReq;
use tracing::warn;

use super::keys;
use crate::ports::ConfigStore;
use crate::runtime::{RuntimeRequirements, UpdateStrategy, VendorFilter};
use crate::system::OperatingSystem;

const DEFAULT_VERSION_RANGE: &str = ">=1.8";

/// Runtime manager settings read from the configuration store.
///
/// Invalid values fall back to the defaults with a warning so a broken
/// setting never blocks a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub versions: VersionReq,
    pub vendor: VendorFilter,
    pub update_strategy: UpdateStrategy,
    pub download_server: Option<String>,
    pub launcher_entry: Vec<String>,
}

impl RuntimeSettings {
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        let versions = store
            .get_property(keys::JVM_SUPPORTED_VERSION_RANGE)
            .and_then(|raw| match VersionReq::parse(raw.trim()) {
                Ok(req) => Some(req),
                Err(e) => {
                    warn!("Ignoring invalid version range '{}': {}", raw, e);
                    None
                }
            })
            .unwrap_or_else(default_versions);

        let vendor = store
            .get_property(keys::JVM_VENDOR)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();

        let update_strategy = store
            .get_property(keys::JVM_UPDATE_STRATEGY)
            .and_then(|raw| match raw.parse() {
                Ok(strategy) => Some(strategy),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .unwrap_or_default();

        let download_server = store
            .get_property(keys::DEFAULT_DOWNLOAD_SERVER)
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let launcher_entry = store
            .get_property(keys::LAUNCHER_ENTRY)
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            versions,
            vendor,
            update_strategy,
            download_server,
            launcher_entry,
        }
    }

    pub fn requirements(&self, operating_system: OperatingSystem) -> RuntimeRequirements {
        RuntimeRequirements::new(self.versions.clone(), self.vendor.clone(), operating_system)
    }
}

fn default_versions() -> VersionReq {
    VersionReq::parse(DEFAULT_VERSION_RANGE).unwrap_or(VersionReq::STAR)
}
