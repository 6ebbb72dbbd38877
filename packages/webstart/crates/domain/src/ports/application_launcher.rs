use anyhow::Result;

/// Starts an application once the launcher has worked out what to run.
///
/// Implementations decide how the process is created; callers only pass the
/// application identity and the filtered arguments.
pub trait ApplicationLauncher: Send + Sync {
    fn launch(&self, identity: &str, args: &[String]) -> Result<()>;
}
