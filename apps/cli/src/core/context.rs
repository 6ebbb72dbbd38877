use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use webstart::application::ConfigBootstrap;
use webstart::domain::config::RuntimeSettings;
use webstart::domain::runtime::{LocalRuntime, RemoteRuntime, RuntimeRegistry, RuntimeSelector};
use webstart::domain::system::{PlatformDetector, PlatformInfo};
use webstart::infrastructure::{
    DiskScanner, FileConfigStore, InstallerVariablesFile, RemoteRuntimeCatalog,
    RuntimeCatalogFile, WebstartPaths,
};

use super::error::CliError;

const VARFILE_NAME: &str = "response.varfile";
const INSTALLER_DIR: &str = ".install4j";

/// Everything a command needs, built once per process.
pub struct AppContext {
    pub paths: WebstartPaths,
    pub store: Arc<FileConfigStore>,
    pub installer: Arc<InstallerVariablesFile>,
    pub platform: PlatformInfo,
}

impl AppContext {
    pub fn load(config_dir: Option<PathBuf>, varfile: Option<PathBuf>) -> Result<Self, CliError> {
        let root = match config_dir {
            Some(dir) => dir,
            None => WebstartPaths::default_root().map_err(|e| CliError::Config(e.to_string()))?,
        };
        let paths = WebstartPaths::new(root);
        paths
            .ensure_dirs()
            .map_err(|e| CliError::Config(format!("{:#}", e)))?;

        let store = Arc::new(FileConfigStore::open(&paths.config_file)?);

        let installer = match varfile.or_else(default_varfile) {
            Some(path) => InstallerVariablesFile::open(&path)?,
            None => InstallerVariablesFile::default(),
        };

        let platform = PlatformDetector::detect();
        debug!("Running on {}", platform);

        Ok(Self {
            paths,
            store,
            installer: Arc::new(installer),
            platform,
        })
    }

    pub fn bootstrap(&self) -> ConfigBootstrap {
        ConfigBootstrap::new(self.store.clone(), self.installer.clone())
    }

    /// Read after the bootstrap check so imported values apply.
    pub fn settings(&self) -> RuntimeSettings {
        RuntimeSettings::from_store(self.store.as_ref())
    }

    /// The registry over the stored catalog and a disk scan, loaded.
    pub fn registry(&self) -> Arc<RuntimeRegistry> {
        let registry = RuntimeRegistry::new()
            .with_source(RuntimeCatalogFile::new(&self.paths.catalog_file))
            .with_source(DiskScanner::new(&self.paths.managed_runtimes))
            .with_persistence(RuntimeCatalogFile::new(&self.paths.catalog_file));
        registry.load();
        Arc::new(registry)
    }

    /// A selector downloading from the configured server, if any.
    pub fn selector(
        &self,
        registry: Arc<RuntimeRegistry>,
        settings: &RuntimeSettings,
        ask_for_update: impl Fn(&LocalRuntime, &RemoteRuntime) -> bool + Send + Sync + 'static,
    ) -> RuntimeSelector {
        let selector = RuntimeSelector::new(registry)
            .with_update_strategy(settings.update_strategy)
            .with_ask_for_update(ask_for_update);

        let Some(server) = &settings.download_server else {
            debug!("No download server configured");
            return selector;
        };

        match RemoteRuntimeCatalog::new(server, &self.paths.managed_runtimes) {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                let download = Arc::clone(&catalog);
                selector
                    .with_update_check(catalog)
                    .with_acquisition(move |requirements| Ok(download.acquire(requirements)?))
            }
            Err(e) => {
                warn!(
                    "Ignoring download server '{}': {:#}",
                    server,
                    anyhow::Error::from(e)
                );
                selector
            }
        }
    }
}

/// `<install dir>/.install4j/response.varfile` next to the running binary.
fn default_varfile() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let dir: &Path = exe.parent()?;
    Some(dir.join(INSTALLER_DIR).join(VARFILE_NAME))
}
