use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::record::{LocalRuntime, RemoteRuntime};
use super::registry::RuntimeRegistry;
use super::requirements::{parse_version, RuntimeRequirements};

/// Fetches and installs a runtime matching the requirements. Runs on the
/// caller's thread; retries, progress and cancellation are its own business.
pub type AcquisitionStrategy =
    Box<dyn Fn(&RuntimeRequirements) -> anyhow::Result<LocalRuntime> + Send + Sync>;

/// Decides whether to replace `current` with the newer `candidate`.
pub type AskForUpdateStrategy = Box<dyn Fn(&LocalRuntime, &RemoteRuntime) -> bool + Send + Sync>;

/// Reports a newer runtime than `current` that also satisfies the requirements.
pub trait UpdateCheck: Send + Sync {
    fn newer_version(
        &self,
        current: &LocalRuntime,
        requirements: &RuntimeRequirements,
    ) -> Option<RemoteRuntime>;
}

impl<T: UpdateCheck + ?Sized> UpdateCheck for Arc<T> {
    fn newer_version(
        &self,
        current: &LocalRuntime,
        requirements: &RuntimeRequirements,
    ) -> Option<RemoteRuntime> {
        (**self).newer_version(current, requirements)
    }
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("No runtime matches {requirements} and no download is configured")]
    NoMatch { requirements: String },

    #[error("Failed to acquire a runtime for {requirements}")]
    AcquisitionFailed {
        requirements: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// What to do when a newer compatible runtime is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStrategy {
    DoNothing,
    #[default]
    AskForUpdateOnLocalMatch,
    AutomaticallyDownload,
}

impl FromStr for UpdateStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "do_nothing" | "never" => Ok(UpdateStrategy::DoNothing),
            "ask_for_update_on_local_match" | "ask" => Ok(UpdateStrategy::AskForUpdateOnLocalMatch),
            "automatically_download" | "auto" => Ok(UpdateStrategy::AutomaticallyDownload),
            other => Err(format!("unknown update strategy '{}'", other)),
        }
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStrategy::DoNothing => write!(f, "do_nothing"),
            UpdateStrategy::AskForUpdateOnLocalMatch => write!(f, "ask_for_update_on_local_match"),
            UpdateStrategy::AutomaticallyDownload => write!(f, "automatically_download"),
        }
    }
}

/// Picks the runtime for a launch, downloading one when nothing local fits.
pub struct RuntimeSelector {
    registry: Arc<RuntimeRegistry>,
    acquisition: Option<AcquisitionStrategy>,
    ask_for_update: Option<AskForUpdateStrategy>,
    update_check: Option<Box<dyn UpdateCheck>>,
    update_strategy: UpdateStrategy,
}

impl RuntimeSelector {
    pub fn new(registry: Arc<RuntimeRegistry>) -> Self {
        Self {
            registry,
            acquisition: None,
            ask_for_update: None,
            update_check: None,
            update_strategy: UpdateStrategy::default(),
        }
    }

    pub fn with_acquisition(
        mut self,
        acquire: impl Fn(&RuntimeRequirements) -> anyhow::Result<LocalRuntime> + Send + Sync + 'static,
    ) -> Self {
        self.acquisition = Some(Box::new(acquire));
        self
    }

    pub fn with_ask_for_update(
        mut self,
        ask: impl Fn(&LocalRuntime, &RemoteRuntime) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.ask_for_update = Some(Box::new(ask));
        self
    }

    pub fn with_update_check(mut self, check: impl UpdateCheck + 'static) -> Self {
        self.update_check = Some(Box::new(check));
        self
    }

    pub fn with_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }

    pub fn registry(&self) -> &Arc<RuntimeRegistry> {
        &self.registry
    }

    /// Chooses a runtime for `requirements`.
    ///
    /// The registry is only changed by a successful acquisition and by marking
    /// the chosen runtime as used; a failed selection leaves it as it was.
    pub fn select(&self, requirements: &RuntimeRequirements) -> Result<LocalRuntime, SelectionError> {
        let Some(current) = self.registry.find(requirements) else {
            debug!("No local runtime matches {}", requirements);
            let acquired = self.acquire(requirements)?;
            return Ok(self.registry.mark_used(&acquired));
        };

        debug!("Local runtime {} matches {}", current, requirements);

        if let Some(candidate) = self.update_candidate(&current, requirements) {
            if self.accepts_update(&current, &candidate) {
                info!("Updating runtime {} to {}", current, candidate.identity);
                let acquired = self.acquire(requirements)?;
                if acquired != current {
                    self.registry.deactivate(&current);
                }
                return Ok(self.registry.mark_used(&acquired));
            }
            debug!("Keeping runtime {}", current);
        }

        Ok(self.registry.mark_used(&current))
    }

    fn update_candidate(
        &self,
        current: &LocalRuntime,
        requirements: &RuntimeRequirements,
    ) -> Option<RemoteRuntime> {
        if self.update_strategy == UpdateStrategy::DoNothing || self.acquisition.is_none() {
            return None;
        }
        let candidate = self.update_check.as_ref()?.newer_version(current, requirements)?;

        let newer = match (
            parse_version(&candidate.identity.version),
            parse_version(current.version()),
        ) {
            (Some(candidate_version), Some(current_version)) => candidate_version > current_version,
            _ => false,
        };
        (newer && requirements.matches(&candidate.identity)).then_some(candidate)
    }

    fn accepts_update(&self, current: &LocalRuntime, candidate: &RemoteRuntime) -> bool {
        match self.update_strategy {
            UpdateStrategy::DoNothing => false,
            UpdateStrategy::AutomaticallyDownload => true,
            UpdateStrategy::AskForUpdateOnLocalMatch => self
                .ask_for_update
                .as_ref()
                .map(|ask| ask(current, candidate))
                .unwrap_or(false),
        }
    }

    fn acquire(&self, requirements: &RuntimeRequirements) -> Result<LocalRuntime, SelectionError> {
        let Some(acquire) = &self.acquisition else {
            return Err(SelectionError::NoMatch {
                requirements: requirements.to_string(),
            });
        };

        let acquired = acquire(requirements).map_err(|e| SelectionError::AcquisitionFailed {
            requirements: requirements.to_string(),
            source: e.into(),
        })?;

        info!("Acquired runtime {}", acquired);
        Ok(self.registry.register(acquired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeIdentity;
    use crate::system::OperatingSystem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn runtime(version: &str, path: &str) -> LocalRuntime {
        LocalRuntime::new(
            RuntimeIdentity::new(version, OperatingSystem::Linux, "Adoptium"),
            path,
        )
        .unwrap()
    }

    fn requirements() -> RuntimeRequirements {
        RuntimeRequirements::any(OperatingSystem::Linux)
    }

    struct Offer(&'static str);

    impl UpdateCheck for Offer {
        fn newer_version(&self, _: &LocalRuntime, _: &RuntimeRequirements) -> Option<RemoteRuntime> {
            Some(RemoteRuntime {
                identity: RuntimeIdentity::new(self.0, OperatingSystem::Linux, "Adoptium"),
                download_url: format!("https://example.invalid/{}.tar.gz", self.0),
            })
        }
    }

    #[test]
    fn test_local_match_is_returned() {
        let registry = Arc::new(RuntimeRegistry::new());
        registry.register(runtime("17.0.2", "/opt/jdk17"));

        let selected = RuntimeSelector::new(registry).select(&requirements()).unwrap();
        assert_eq!(selected.version(), "17.0.2");
    }

    #[test]
    fn test_no_match_without_acquisition() {
        let selector = RuntimeSelector::new(Arc::new(RuntimeRegistry::new()));

        let err = selector.select(&requirements()).unwrap_err();
        assert!(matches!(err, SelectionError::NoMatch { .. }));
    }

    #[test]
    fn test_acquired_runtime_is_registered() {
        let registry = Arc::new(RuntimeRegistry::new());
        let selector = RuntimeSelector::new(registry.clone())
            .with_acquisition(|_| Ok(runtime("21.0.1", "/opt/jdk21")));

        let selected = selector.select(&requirements()).unwrap();
        assert_eq!(selected.version(), "21.0.1");
        assert_eq!(registry.snapshot(), vec![selected]);
    }

    #[test]
    fn test_failed_acquisition_leaves_registry_untouched() {
        let registry = Arc::new(RuntimeRegistry::new());
        let selector = RuntimeSelector::new(registry.clone())
            .with_acquisition(|_| Err(anyhow::anyhow!("server unreachable")));

        let err = selector.select(&requirements()).unwrap_err();
        assert!(matches!(err, SelectionError::AcquisitionFailed { .. }));
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_declined_update_keeps_current() {
        let registry = Arc::new(RuntimeRegistry::new());
        registry.register(runtime("17.0.2", "/opt/jdk17"));
        let acquisitions = Arc::new(AtomicUsize::new(0));
        let counter = acquisitions.clone();

        let selector = RuntimeSelector::new(registry)
            .with_update_check(Offer("17.0.9"))
            .with_ask_for_update(|_, _| false)
            .with_acquisition(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(runtime("17.0.9", "/opt/jdk17.0.9"))
            });

        let selected = selector.select(&requirements()).unwrap();
        assert_eq!(selected.version(), "17.0.2");
        assert_eq!(acquisitions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_accepted_update_retires_current() {
        let registry = Arc::new(RuntimeRegistry::new());
        let current = registry.register(runtime("17.0.2", "/opt/jdk17"));

        let selector = RuntimeSelector::new(registry.clone())
            .with_update_check(Offer("17.0.9"))
            .with_ask_for_update(|current, candidate| {
                current.version() == "17.0.2" && candidate.identity.version == "17.0.9"
            })
            .with_acquisition(|_| Ok(runtime("17.0.9", "/opt/jdk17.0.9")));

        let selected = selector.select(&requirements()).unwrap();
        assert_eq!(selected.version(), "17.0.9");

        let retired = registry
            .snapshot()
            .into_iter()
            .find(|r| *r == current)
            .unwrap();
        assert!(!retired.is_active());
    }

    #[test]
    fn test_older_offer_is_not_an_update() {
        let registry = Arc::new(RuntimeRegistry::new());
        registry.register(runtime("17.0.2", "/opt/jdk17"));

        let selector = RuntimeSelector::new(registry)
            .with_update_strategy(UpdateStrategy::AutomaticallyDownload)
            .with_update_check(Offer("11.0.20"))
            .with_acquisition(|_| Err(anyhow::anyhow!("must not be called")));

        assert_eq!(selector.select(&requirements()).unwrap().version(), "17.0.2");
    }

    #[test]
    fn test_update_strategy_parsing() {
        assert_eq!("do_nothing".parse(), Ok(UpdateStrategy::DoNothing));
        assert_eq!("AUTOMATICALLY_DOWNLOAD".parse(), Ok(UpdateStrategy::AutomaticallyDownload));
        assert!("sometimes".parse::<UpdateStrategy>().is_err());
    }
}
