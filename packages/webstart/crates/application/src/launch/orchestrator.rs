use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use domain::ports::ApplicationLauncher;
use domain::system::Platform;

use super::args::{extract_app_identity, filter_args};
use crate::notification::StartupNotificationBridge;

/// Turns raw invocation arguments into an application launch.
pub struct LaunchOrchestrator {
    launcher: Arc<dyn ApplicationLauncher>,
    platform: Arc<dyn Platform>,
}

impl LaunchOrchestrator {
    pub fn new(launcher: Arc<dyn ApplicationLauncher>, platform: Arc<dyn Platform>) -> Self {
        Self { launcher, platform }
    }

    /// Filters `raw_args`, derives the application identity and hands both to
    /// the application launcher.
    pub fn launch<S: AsRef<str>>(&self, raw_args: &[S]) -> Result<()> {
        let args = filter_args(raw_args);
        let identity = extract_app_identity(&args);

        info!("Launching '{}' with args {:?}", identity, args);
        self.launcher.launch(&identity, &args)
    }

    /// Process-start entry point.
    ///
    /// Where re-invocations arrive as OS notifications the initial arguments
    /// are only remembered: the first notification merges its parameters in
    /// and triggers the launch. Elsewhere the initial arguments are launched
    /// right away and later notifications start additional launches.
    pub fn startup(
        self: &Arc<Self>,
        initial_args: Vec<String>,
    ) -> Result<Arc<StartupNotificationBridge>> {
        debug!(
            "OS detected: Win[{}], MacOS[{}], Linux[{}]",
            self.platform.is_windows(),
            self.platform.is_macos(),
            self.platform.is_linux()
        );

        if self.platform.delivers_reinvocation_as_notification() {
            info!("Deferring launch until the startup notification arrives");
        } else {
            self.launch(&initial_args)?;
        }

        Ok(Arc::new(StartupNotificationBridge::new(
            Arc::clone(self),
            initial_args,
        )))
    }

    pub fn defers_initial_launch(&self) -> bool {
        self.platform.delivers_reinvocation_as_notification()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::system::OperatingSystem;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, Vec<String>)>>);

    impl ApplicationLauncher for Recorder {
        fn launch(&self, identity: &str, args: &[String]) -> Result<()> {
            self.0.lock().push((identity.to_string(), args.to_vec()));
            Ok(())
        }
    }

    fn orchestrator(os: OperatingSystem) -> (Arc<Recorder>, Arc<LaunchOrchestrator>) {
        let recorder = Arc::new(Recorder::default());
        let orchestrator = Arc::new(LaunchOrchestrator::new(recorder.clone(), Arc::new(os)));
        (recorder, orchestrator)
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_launch_filters_and_names_app() {
        let (recorder, orchestrator) = orchestrator(OperatingSystem::Linux);

        orchestrator
            .launch(&["--no-fork", "-verbose", "https://host/apps/Editor.jnlp"])
            .unwrap();

        let calls = recorder.0.lock();
        assert_eq!(
            calls[0],
            ("Editor".to_string(), args(&["-verbose", "https://host/apps/Editor.jnlp"]))
        );
    }

    #[test]
    fn test_startup_launches_immediately_off_macos() {
        let (recorder, orchestrator) = orchestrator(OperatingSystem::Windows);

        orchestrator.startup(args(&["App.jnlp"])).unwrap();

        assert_eq!(recorder.0.lock().len(), 1);
    }

    #[test]
    fn test_startup_defers_on_macos_until_notification() {
        let (recorder, orchestrator) = orchestrator(OperatingSystem::MacOS);

        let bridge = orchestrator.startup(args(&["--no-fork", "-verbose"])).unwrap();
        assert!(recorder.0.lock().is_empty());

        bridge.on_notification("/Users/me/Downloads/App.jnlp").unwrap();

        let calls = recorder.0.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            ("App".to_string(), args(&["-verbose", "/Users/me/Downloads/App.jnlp"]))
        );
    }
}
