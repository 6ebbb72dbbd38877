/// Values the installer recorded for this installation.
pub trait InstallerVariables: Send + Sync {
    fn variable(&self, name: &str) -> Option<String>;

    fn is_variable_locked(&self, name: &str) -> bool;

    /// Installation time in epoch milliseconds, if the installer wrote one.
    fn installation_timestamp(&self) -> Option<i64>;
}
