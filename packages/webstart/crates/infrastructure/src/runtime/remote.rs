use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use domain::runtime::{
    parse_version, LocalRuntime, RemoteRuntime, RuntimeIdentity, RuntimeRequirements, UpdateCheck,
};

use super::extract::extract_runtime;
use super::release::{is_runtime_home, read_identity};

const CATALOG_FILE: &str = "catalog.json";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Invalid download server URL")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request to download server failed")]
    Http(#[from] reqwest::Error),

    #[error("No runtime on the download server matches {0}")]
    NoMatchingRuntime(String),

    #[error("Invalid runtime archive: {0}")]
    Archive(String),

    #[error("Refusing to extract {path}: {reason}")]
    UnsafeEntry { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    runtimes: Vec<RemoteRuntime>,
}

/// Runtimes offered by a download server.
///
/// The server publishes `catalog.json` listing remote records; download URLs
/// may be relative to the server. Downloads are unpacked into the managed
/// runtime directory only.
pub struct RemoteRuntimeCatalog {
    base: Url,
    client: Client,
    managed_dir: PathBuf,
}

impl RemoteRuntimeCatalog {
    pub fn new(server: &str, managed_dir: impl Into<PathBuf>) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(concat!("webstart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base: base_url(server)?,
            client,
            managed_dir: managed_dir.into(),
        })
    }

    pub fn server(&self) -> &Url {
        &self.base
    }

    /// Downloads the server's list of runtimes.
    pub fn fetch(&self) -> Result<Vec<RemoteRuntime>, DownloadError> {
        let url = self.base.join(CATALOG_FILE)?;
        debug!("Fetching runtime catalog from {}", url);

        let document: CatalogDocument = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(document.runtimes)
    }

    /// The newest offered runtime satisfying `requirements`.
    pub fn best_match(
        &self,
        requirements: &RuntimeRequirements,
    ) -> Result<Option<RemoteRuntime>, DownloadError> {
        Ok(newest_matching(self.fetch()?, requirements))
    }

    /// Downloads and installs the newest runtime satisfying `requirements`.
    pub fn acquire(&self, requirements: &RuntimeRequirements) -> Result<LocalRuntime, DownloadError> {
        let remote = self
            .best_match(requirements)?
            .ok_or_else(|| DownloadError::NoMatchingRuntime(requirements.to_string()))?;
        self.install(&remote)
    }

    /// Installs `remote` into `<managed dir>/<vendor>-<version>`, reusing an
    /// earlier installation of the same runtime.
    pub fn install(&self, remote: &RemoteRuntime) -> Result<LocalRuntime, DownloadError> {
        let name = install_dir_name(&remote.identity);
        let target = self.managed_dir.join(&name);

        if is_runtime_home(&target) {
            info!("Runtime {} is already installed at {}", remote.identity, target.display());
            return self.installed(remote, target);
        }

        let staging = self.managed_dir.join(format!(".{name}.partial"));
        remove_dir_if_exists(&staging)?;
        remove_dir_if_exists(&target)?;

        let url = self.base.join(&remote.download_url)?;
        info!("Downloading runtime {} from {}", remote.identity, url);

        let response = self.client.get(url).send()?.error_for_status()?;
        let progress = progress_bar(response.content_length(), &remote.identity);
        let extracted = extract_runtime(progress.wrap_read(response), &staging);
        progress.finish_and_clear();

        let result = extracted.and_then(|home| Ok(fs::rename(&home, &target)?));
        remove_dir_if_exists(&staging)?;
        result?;

        self.installed(remote, target)
    }

    fn installed(&self, remote: &RemoteRuntime, home: PathBuf) -> Result<LocalRuntime, DownloadError> {
        // prefer what the runtime says about itself so a later disk scan
        // produces an equal record
        let identity = read_identity(&home, remote.identity.operating_system).unwrap_or_else(|e| {
            warn!("Using catalog identity for {}: {:#}", home.display(), e);
            remote.identity.clone()
        });

        LocalRuntime::new(identity, home)
            .map_err(|e| DownloadError::Archive(e.to_string()))
    }
}

impl UpdateCheck for RemoteRuntimeCatalog {
    fn newer_version(
        &self,
        current: &LocalRuntime,
        requirements: &RuntimeRequirements,
    ) -> Option<RemoteRuntime> {
        let candidate = match self.best_match(requirements) {
            Ok(candidate) => candidate?,
            Err(e) => {
                warn!("Could not check for runtime updates: {:#}", anyhow::Error::from(e));
                return None;
            }
        };

        let current_version = parse_version(current.version())?;
        let newer = parse_version(&candidate.identity.version)? > current_version;
        newer.then_some(candidate)
    }
}

fn newest_matching(
    runtimes: Vec<RemoteRuntime>,
    requirements: &RuntimeRequirements,
) -> Option<RemoteRuntime> {
    runtimes
        .into_iter()
        .filter(|r| requirements.matches(&r.identity))
        .filter_map(|r| parse_version(&r.identity.version).map(|v| (v, r)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, r)| r)
}

/// `server` as a directory URL so relative joins stay below it.
fn base_url(server: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(server.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn install_dir_name(identity: &RuntimeIdentity) -> String {
    let sanitize = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>()
            .trim_matches(|c| c == '-' || c == '.')
            .to_string()
    };
    format!("{}-{}", sanitize(&identity.vendor), sanitize(&identity.version))
}

fn remove_dir_if_exists(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn progress_bar(length: Option<u64>, identity: &RuntimeIdentity) -> ProgressBar {
    let pb = match length {
        Some(len) => {
            let pb = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            {
                pb.set_style(style.progress_chars("=> "));
            }
            pb
        }
        None => ProgressBar::new_spinner(),
    };
    pb.set_message(format!("Downloading {}", identity));
    pb
}
