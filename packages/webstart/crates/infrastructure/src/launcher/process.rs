use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::Arc;
use tracing::{debug, info, warn};

use domain::ports::ApplicationLauncher;
use domain::runtime::{RuntimeRequirements, RuntimeSelector};

/// Environment variable carrying the application identity into the JVM.
pub const APP_ENV: &str = "WEBSTART_APP";

/// Launches applications in a JVM chosen by the runtime selector.
///
/// The command line is `<home>/bin/java <entry...> <args...>`. Started
/// processes are kept so the launcher can outlive them with [`wait_all`].
///
/// [`wait_all`]: JvmProcessLauncher::wait_all
pub struct JvmProcessLauncher {
    selector: Arc<RuntimeSelector>,
    requirements: RuntimeRequirements,
    entry: Vec<String>,
    children: Mutex<Vec<(String, Child)>>,
}

impl JvmProcessLauncher {
    pub fn new(
        selector: Arc<RuntimeSelector>,
        requirements: RuntimeRequirements,
        entry: Vec<String>,
    ) -> Self {
        if entry.is_empty() {
            warn!("No launcher entry configured, the JVM only receives the launch arguments");
        }
        Self {
            selector,
            requirements,
            entry,
            children: Mutex::new(Vec::new()),
        }
    }

    /// Waits for every started JVM, including ones started while waiting.
    ///
    /// Returns the exit code of the last JVM that failed, or 0.
    pub fn wait_all(&self) -> i32 {
        let mut exit_code = 0;

        loop {
            // released before waiting: a notification may launch more
            let next = self.children.lock().pop();
            let Some((identity, mut child)) = next else {
                break;
            };

            match child.wait() {
                Ok(status) if status.success() => debug!("'{}' exited", identity),
                Ok(status) => {
                    warn!("'{}' exited with {}", identity, status);
                    exit_code = status.code().unwrap_or(1);
                }
                Err(e) => {
                    warn!("Failed to wait for '{}': {}", identity, e);
                    exit_code = 1;
                }
            }
        }
        exit_code
    }
}

impl ApplicationLauncher for JvmProcessLauncher {
    fn launch(&self, identity: &str, args: &[String]) -> Result<()> {
        let runtime = self
            .selector
            .select(&self.requirements)
            .with_context(|| format!("Cannot launch '{}'", identity))?;
        let java = java_executable(runtime.install_path());

        debug!("Running {} {:?} {:?}", java.display(), self.entry, args);
        let child = Command::new(&java)
            .args(&self.entry)
            .args(args)
            .env(APP_ENV, identity)
            .spawn()
            .with_context(|| format!("Failed to start {}", java.display()))?;

        info!("Started '{}' on {} (pid {})", identity, runtime, child.id());
        self.children.lock().push((identity.to_string(), child));
        Ok(())
    }
}

pub fn java_executable(home: &Path) -> PathBuf {
    let name = if cfg!(windows) { "java.exe" } else { "java" };
    home.join("bin").join(name)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use domain::runtime::{LocalRuntime, RuntimeIdentity, RuntimeRegistry};
    use domain::system::OperatingSystem;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn fake_java(home: &Path, script: &str) {
        let java = java_executable(home);
        fs::create_dir_all(java.parent().unwrap()).unwrap();
        fs::write(&java, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn launcher(home: &Path, entry: &[&str]) -> JvmProcessLauncher {
        let os = OperatingSystem::current();
        let registry = Arc::new(RuntimeRegistry::new());
        registry.register(
            LocalRuntime::new(RuntimeIdentity::new("17.0.9", os, "Adoptium"), home).unwrap(),
        );

        JvmProcessLauncher::new(
            Arc::new(RuntimeSelector::new(registry)),
            RuntimeRequirements::any(os),
            entry.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_runs_java_with_entry_and_args() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        fake_java(dir.path(), &format!("echo \"$WEBSTART_APP $*\" > {}", out.display()));

        let launcher = launcher(dir.path(), &["-jar", "netx.jar"]);
        launcher
            .launch("Editor", &["-verbose".into(), "Editor.jnlp".into()])
            .unwrap();

        assert_eq!(launcher.wait_all(), 0);
        assert_eq!(
            fs::read_to_string(&out).unwrap().trim(),
            "Editor -jar netx.jar -verbose Editor.jnlp"
        );
    }

    #[test]
    fn test_wait_all_reports_failure() {
        let dir = tempdir().unwrap();
        fake_java(dir.path(), "exit 3");

        let launcher = launcher(dir.path(), &[]);
        launcher.launch("App", &[]).unwrap();

        assert_eq!(launcher.wait_all(), 3);
    }

    #[test]
    fn test_missing_runtime_is_an_error() {
        let launcher = JvmProcessLauncher::new(
            Arc::new(RuntimeSelector::new(Arc::new(RuntimeRegistry::new()))),
            RuntimeRequirements::any(OperatingSystem::current()),
            Vec::new(),
        );

        assert!(launcher.launch("App", &[]).is_err());
    }
}
