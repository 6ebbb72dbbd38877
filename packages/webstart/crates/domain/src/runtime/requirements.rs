use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;

use super::record::RuntimeIdentity;
use crate::system::OperatingSystem;

/// Parse a runtime version string into a semantic version.
///
/// Java runtimes report versions like `17`, `17.0.2+8`, `21-ea` or the legacy
/// `1.8.0_292`; missing minor/patch components are padded with zeros and the
/// legacy `_update` suffix becomes build metadata.
pub fn parse_version(raw: &str) -> Option<Version> {
    let clean = raw.trim().trim_start_matches('v').trim_start_matches("jdk-");
    if clean.is_empty() {
        return None;
    }

    if let Ok(version) = Version::parse(clean) {
        return Some(version);
    }

    let clean = clean.replacen('_', "+", 1);
    let split_at = clean.find(['-', '+']).unwrap_or(clean.len());
    let (core, suffix) = clean.split_at(split_at);

    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    Version::parse(&format!("{}{}", parts.join("."), suffix)).ok()
}

/// Which vendors a launch accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VendorFilter {
    #[default]
    Any,
    Named(String),
}

impl VendorFilter {
    pub fn accepts(&self, vendor: &str) -> bool {
        match self {
            VendorFilter::Any => true,
            VendorFilter::Named(name) => name.eq_ignore_ascii_case(vendor.trim()),
        }
    }
}

impl FromStr for VendorFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "*" {
            Ok(VendorFilter::Any)
        } else {
            Ok(VendorFilter::Named(s.to_string()))
        }
    }
}

impl fmt::Display for VendorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VendorFilter::Any => write!(f, "*"),
            VendorFilter::Named(name) => write!(f, "{}", name),
        }
    }
}

/// What a launch needs from a runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRequirements {
    pub versions: VersionReq,
    pub vendor: VendorFilter,
    pub operating_system: OperatingSystem,
}

impl RuntimeRequirements {
    pub fn new(versions: VersionReq, vendor: VendorFilter, operating_system: OperatingSystem) -> Self {
        Self {
            versions,
            vendor,
            operating_system,
        }
    }

    /// Any vendor and version, for the given system.
    pub fn any(operating_system: OperatingSystem) -> Self {
        Self::new(VersionReq::STAR, VendorFilter::Any, operating_system)
    }

    /// Whether a record's version, system and vendor satisfy these requirements.
    /// Versions that cannot be parsed never match.
    pub fn matches(&self, identity: &RuntimeIdentity) -> bool {
        if identity.operating_system != self.operating_system {
            return false;
        }
        if !self.vendor.accepts(&identity.vendor) {
            return false;
        }
        parse_version(&identity.version)
            .map(|v| self.versions.matches(&v))
            .unwrap_or(false)
    }
}

impl fmt::Display for RuntimeRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version '{}', vendor '{}', {}",
            self.versions, self.vendor, self.operating_system
        )
    }
}
