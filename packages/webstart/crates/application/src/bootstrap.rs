//! One-time import of installer defaults into the user configuration.
//!
//! The first start after an installation copies a fixed set of installer
//! variables into the configuration store and records when it did so. Later
//! starts compare that record with the installation time and skip the import.

use chrono::Utc;
use parking_lot::ReentrantMutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use domain::config::{IMPORTED_KEYS, LAST_BOOTSTRAP_KEY};
use domain::ports::{ConfigStore, InstallerVariables};

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to save imported configuration")]
    Save(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Stored bootstrap time as read from the configuration store.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LastBootstrap {
    Missing,
    Unparsable(String),
    At(i64),
}

pub struct ConfigBootstrap {
    store: Arc<dyn ConfigStore>,
    installer: Arc<dyn InstallerVariables>,
    lock: ReentrantMutex<()>,
    clock: fn() -> i64,
}

impl ConfigBootstrap {
    pub fn new(store: Arc<dyn ConfigStore>, installer: Arc<dyn InstallerVariables>) -> Self {
        Self {
            store,
            installer,
            lock: ReentrantMutex::new(()),
            clock: || Utc::now().timestamp_millis(),
        }
    }

    /// Replaces the wall clock used for the bootstrap timestamp.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Imports the installer defaults if this is the first start after an
    /// installation. Safe to call any number of times from any thread: the
    /// decision, the import and the timestamp update happen under one lock.
    pub fn check(&self) -> Result<(), BootstrapError> {
        let _guard = self.lock.lock();

        if !self.is_first_start() {
            debug!("Configuration already bootstrapped for this installation");
            return Ok(());
        }

        info!("First start after installation, importing initial configuration");
        for key in IMPORTED_KEYS {
            self.import_property(key);
        }
        self.set_last_update_property();

        self.store
            .save()
            .map_err(|e| BootstrapError::Save(e.into()))?;
        info!("Import of initial configuration done");
        Ok(())
    }

    /// True when no valid bootstrap time is stored, or the installation is
    /// newer than the last bootstrap. A missing installation time counts as
    /// infinitely far in the future.
    pub fn is_first_start(&self) -> bool {
        let _guard = self.lock.lock();

        let installed_at = self.installer.installation_timestamp().unwrap_or(i64::MAX);

        match self.last_bootstrap() {
            LastBootstrap::Missing => {
                debug!("No '{}' property, will do initial config", LAST_BOOTSTRAP_KEY);
                true
            }
            LastBootstrap::Unparsable(raw) => {
                debug!(
                    "Cannot parse '{}' value '{}', will do initial config",
                    LAST_BOOTSTRAP_KEY, raw
                );
                true
            }
            LastBootstrap::At(bootstrapped_at) => {
                debug!(
                    "Checking if installation time ({}) is after last initial config time ({})",
                    installed_at, bootstrapped_at
                );
                installed_at > bootstrapped_at
            }
        }
    }

    fn last_bootstrap(&self) -> LastBootstrap {
        match self.store.get_property(LAST_BOOTSTRAP_KEY) {
            None => LastBootstrap::Missing,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(at) => LastBootstrap::At(at),
                Err(_) => LastBootstrap::Unparsable(raw),
            },
        }
    }

    fn import_property(&self, key: &str) {
        debug!("Checking if property '{}' is predefined", key);

        if let Some(value) = self.installer.variable(key) {
            debug!("Property '{}' will be imported with value '{}'", key, value);
            self.store.set_property(key, &value);
        }

        if self.installer.is_variable_locked(key) {
            debug!("Property '{}' will be locked", key);
            self.store.lock(key);
        }
    }

    fn set_last_update_property(&self) {
        let _guard = self.lock.lock();
        let now = (self.clock)();
        self.store.set_property(LAST_BOOTSTRAP_KEY, &now.to_string());
    }
}
