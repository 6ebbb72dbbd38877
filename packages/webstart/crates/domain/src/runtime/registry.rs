use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::record::LocalRuntime;
use super::requirements::RuntimeRequirements;
use crate::ports::{RuntimePersistence, RuntimeSource};

/// The canonical set of local runtimes for the lifetime of the process.
///
/// Every query runs against one consistent snapshot taken under the read lock;
/// mutations replace entries under the write lock.
pub struct RuntimeRegistry {
    sources: Vec<Box<dyn RuntimeSource>>,
    persistence: Option<Box<dyn RuntimePersistence>>,
    records: RwLock<Vec<LocalRuntime>>,
}

impl RuntimeRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            persistence: None,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Adds a discovery source. Sources are read in registration order and the
    /// first source to report a runtime wins, so register the persisted list
    /// before disk scans to keep stored state like `active`.
    pub fn with_source(mut self, source: impl RuntimeSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_persistence(mut self, persistence: impl RuntimePersistence + 'static) -> Self {
        self.persistence = Some(Box::new(persistence));
        self
    }

    /// Re-reads all sources and replaces the known set.
    ///
    /// A failing source is logged and skipped; whatever the other sources
    /// returned is kept.
    pub fn load(&self) -> Vec<LocalRuntime> {
        let mut seen = HashSet::new();
        let mut loaded = Vec::new();

        for source in &self.sources {
            match source.read() {
                Ok(runtimes) => {
                    debug!("Runtime source '{}' returned {} entries", source.name(), runtimes.len());
                    for runtime in runtimes {
                        if seen.insert(runtime.clone()) {
                            loaded.push(runtime);
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to read runtime source '{}': {:#}", source.name(), e);
                }
            }
        }

        sort_most_recent_first(&mut loaded);
        *self.records.write() = loaded.clone();
        loaded
    }

    /// Most recently used active runtime satisfying `requirements`.
    pub fn find(&self, requirements: &RuntimeRequirements) -> Option<LocalRuntime> {
        let records = self.records.read();
        records
            .iter()
            .filter(|r| r.is_active() && requirements.matches(r.identity()))
            .min_by(|a, b| {
                b.last_used_at()
                    .cmp(&a.last_used_at())
                    .then_with(|| a.install_path().cmp(b.install_path()))
            })
            .cloned()
    }

    /// Retires `record` by storing its deactivated copy in place of it.
    pub fn deactivate(&self, record: &LocalRuntime) -> LocalRuntime {
        let deactivated = record.deactivated_copy();
        let replaced = {
            let mut records = self.records.write();
            match records.iter_mut().find(|r| **r == deactivated) {
                Some(slot) => {
                    *slot = deactivated.clone();
                    true
                }
                None => false,
            }
        };

        if replaced {
            debug!("Deactivated runtime {}", deactivated);
            self.persist();
        }
        deactivated
    }

    /// Adds or replaces a runtime. A stored foreign installation is never
    /// replaced by a record claiming the same location.
    pub fn register(&self, record: LocalRuntime) -> LocalRuntime {
        let stored = {
            let mut records = self.records.write();
            match records.iter_mut().find(|r| **r == record) {
                Some(slot) if !slot.is_managed() && record.is_managed() => {
                    debug!("Keeping foreign runtime {} untouched", slot);
                    slot.clone()
                }
                Some(slot) => {
                    *slot = record.clone();
                    record
                }
                None => {
                    records.push(record.clone());
                    record
                }
            }
        };

        self.persist();
        stored
    }

    /// Stores a copy of `record` marked as used now and returns it.
    pub fn mark_used(&self, record: &LocalRuntime) -> LocalRuntime {
        let used = record.used_now();
        {
            let mut records = self.records.write();
            match records.iter_mut().find(|r| **r == used) {
                Some(slot) => *slot = slot.clone().with_last_used_at(used.last_used_at()),
                None => records.push(used.clone()),
            }
        }

        self.persist();
        used
    }

    /// Copy of every known runtime, most recently used first.
    pub fn snapshot(&self) -> Vec<LocalRuntime> {
        let mut records = self.records.read().clone();
        sort_most_recent_first(&mut records);
        records
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let snapshot = self.snapshot();
        if let Err(e) = persistence.save(&snapshot) {
            warn!("Failed to persist runtime registry: {:#}", e);
        }
    }
}

impl Default for RuntimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_most_recent_first(records: &mut [LocalRuntime]) {
    records.sort_by(|a, b| {
        b.last_used_at()
            .cmp(&a.last_used_at())
            .then_with(|| a.install_path().cmp(b.install_path()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeIdentity;
    use crate::system::OperatingSystem;
    use chrono::{Duration, Utc};

    fn runtime(version: &str, path: &str, minutes_ago: i64) -> LocalRuntime {
        LocalRuntime::new(
            RuntimeIdentity::new(version, OperatingSystem::Linux, "Adoptium"),
            path,
        )
        .unwrap()
        .with_last_used_at(Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn test_find_prefers_most_recently_used() {
        let registry = RuntimeRegistry::new();
        registry.register(runtime("11.0.12", "/opt/jdk11", 30));
        registry.register(runtime("17.0.2", "/opt/jdk17", 5));

        let found = registry
            .find(&RuntimeRequirements::any(OperatingSystem::Linux))
            .unwrap();
        assert_eq!(found.install_path(), std::path::Path::new("/opt/jdk17"));
    }

    #[test]
    fn test_find_skips_inactive() {
        let registry = RuntimeRegistry::new();
        let recent = registry.register(runtime("17.0.2", "/opt/jdk17", 1));
        registry.register(runtime("11.0.12", "/opt/jdk11", 60));

        let deactivated = registry.deactivate(&recent);
        assert!(!deactivated.is_active());

        let found = registry
            .find(&RuntimeRequirements::any(OperatingSystem::Linux))
            .unwrap();
        assert_eq!(found.version(), "11.0.12");
    }

    #[test]
    fn test_register_keeps_foreign_entry() {
        let registry = RuntimeRegistry::new();
        registry.register(runtime("17.0.2", "/usr/lib/jvm/17", 0).foreign());

        let stored = registry.register(runtime("17.0.2", "/usr/lib/jvm/17", 0));
        assert!(!stored.is_managed());
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_deactivate_unknown_record_is_not_inserted() {
        let registry = RuntimeRegistry::new();
        let copy = registry.deactivate(&runtime("17.0.2", "/opt/jdk17", 0));

        assert!(!copy.is_active());
        assert!(registry.snapshot().is_empty());
    }
}
