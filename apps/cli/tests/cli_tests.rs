use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn webstart(config_dir: &Path, args: &[&str]) -> Output {
    let java_home = config_dir.join("no-java");
    Command::new(env!("CARGO_BIN_EXE_webstart"))
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .env("JAVA_HOME", java_home)
        .env_remove("WEBSTART_VARFILE")
        .env_remove("WEBSTART_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_bootstrap_imports_installer_defaults_once() {
    let dir = tempdir().unwrap();
    let varfile = dir.path().join("response.varfile");
    fs::write(
        &varfile,
        "installationDate=1\ndeployment.proxy.type=2\ndeployment.proxy.type.locked=true\n",
    )
    .unwrap();
    let varfile = varfile.to_str().unwrap();

    let first = webstart(dir.path(), &["--varfile", varfile, "bootstrap"]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert!(String::from_utf8_lossy(&first.stdout).contains("Imported"));

    let config = fs::read_to_string(dir.path().join("deployment.toml")).unwrap();
    assert!(config.contains("deployment.proxy.type"));
    assert!(config.contains("lastBootstrapTimestamp"));

    let second = webstart(dir.path(), &["--varfile", varfile, "bootstrap"]);
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("already"));
}

#[test]
fn test_runtimes_lists_managed_runtime() {
    let dir = tempdir().unwrap();
    let home = dir.path().join("jvm").join("adoptium-17.0.9");
    fs::create_dir_all(home.join("bin")).unwrap();
    fs::write(
        home.join("release"),
        "IMPLEMENTOR=\"Eclipse Adoptium\"\nJAVA_VERSION=\"17.0.9\"\n",
    )
    .unwrap();

    let output = webstart(dir.path(), &["runtimes"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("17.0.9"));
    assert!(stdout.contains("Eclipse Adoptium"));
}

#[test]
fn test_runtimes_on_empty_directory() {
    let dir = tempdir().unwrap();

    let output = webstart(dir.path(), &["runtimes"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No runtimes found"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_launch_without_runtime_fails() {
    let dir = tempdir().unwrap();

    let output = webstart(dir.path(), &["--no-fork", "https://example.invalid/apps/Editor.jnlp"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
    assert!(!dir.path().join("instance.sock").exists());
}
