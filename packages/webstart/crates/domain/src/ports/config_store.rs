use anyhow::Result;

/// Persisted user configuration.
///
/// Methods take `&self`: stores are shared between the bootstrap, the launcher
/// and notification threads, so implementations synchronise internally.
pub trait ConfigStore: Send + Sync {
    fn get_property(&self, key: &str) -> Option<String>;

    fn set_property(&self, key: &str, value: &str);

    /// Prevents later changes to `key` through the user-facing settings.
    fn lock(&self, key: &str);

    fn is_locked(&self, key: &str) -> bool;

    fn save(&self) -> Result<()>;
}
