use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system a runtime is built for, or the launcher runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    MacOS,
    Linux,
    FreeBSD,
    Unknown,
}

impl OperatingSystem {
    /// The system this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OperatingSystem::Windows
        } else if cfg!(target_os = "macos") {
            OperatingSystem::MacOS
        } else if cfg!(target_os = "linux") {
            OperatingSystem::Linux
        } else if cfg!(target_os = "freebsd") {
            OperatingSystem::FreeBSD
        } else {
            OperatingSystem::Unknown
        }
    }

    /// Short lowercase name, used in download paths and directory names.
    pub fn slug(&self) -> &'static str {
        match self {
            OperatingSystem::Windows => "windows",
            OperatingSystem::MacOS => "macos",
            OperatingSystem::Linux => "linux",
            OperatingSystem::FreeBSD => "freebsd",
            OperatingSystem::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingSystem::Windows => write!(f, "Windows"),
            OperatingSystem::MacOS => write!(f, "macOS"),
            OperatingSystem::Linux => write!(f, "Linux"),
            OperatingSystem::FreeBSD => write!(f, "FreeBSD"),
            OperatingSystem::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for OperatingSystem {
    type Err = std::convert::Infallible;

    /// Accepts the names found in runtime `release` files (`Darwin`, `Linux`,
    /// `Windows`) as well as our own slugs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let os = match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" | "win32" => OperatingSystem::Windows,
            "macos" | "mac" | "osx" | "darwin" => OperatingSystem::MacOS,
            "linux" => OperatingSystem::Linux,
            "freebsd" => OperatingSystem::FreeBSD,
            _ => OperatingSystem::Unknown,
        };
        Ok(os)
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    X86_64,
    Aarch64,
    Arm,
    I686,
    Unknown,
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Aarch64 => write!(f, "aarch64"),
            Architecture::Arm => write!(f, "arm"),
            Architecture::I686 => write!(f, "i686"),
            Architecture::Unknown => write!(f, "unknown"),
        }
    }
}

/// Boolean platform predicates used to pick the launch dispatch timing.
pub trait Platform: Send + Sync {
    fn operating_system(&self) -> OperatingSystem;

    fn is_windows(&self) -> bool {
        self.operating_system() == OperatingSystem::Windows
    }

    fn is_macos(&self) -> bool {
        self.operating_system() == OperatingSystem::MacOS
    }

    fn is_linux(&self) -> bool {
        self.operating_system() == OperatingSystem::Linux
    }

    /// True where a second invocation reaches the running process as an OS
    /// notification instead of spawning a fresh process.
    fn delivers_reinvocation_as_notification(&self) -> bool {
        self.is_macos()
    }
}

impl Platform for OperatingSystem {
    fn operating_system(&self) -> OperatingSystem {
        *self
    }
}

/// Complete platform information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os_type: OperatingSystem,
    pub os_version: String,
    pub arch: Architecture,
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.os_type, self.os_version, self.arch)
    }
}

impl Platform for PlatformInfo {
    fn operating_system(&self) -> OperatingSystem {
        self.os_type
    }
}

/// Platform detection service
pub struct PlatformDetector;

impl PlatformDetector {
    /// Detect the current platform information
    pub fn detect() -> PlatformInfo {
        let info = os_info::get();

        PlatformInfo {
            os_type: Self::detect_os_type(&info),
            os_version: info.version().to_string(),
            arch: Self::detect_architecture(),
        }
    }

    fn detect_os_type(info: &os_info::Info) -> OperatingSystem {
        match info.os_type() {
            os_info::Type::Macos => OperatingSystem::MacOS,
            os_info::Type::Windows => OperatingSystem::Windows,
            os_info::Type::Alpine
            | os_info::Type::Arch
            | os_info::Type::CentOS
            | os_info::Type::Debian
            | os_info::Type::Fedora
            | os_info::Type::Linux
            | os_info::Type::Mint
            | os_info::Type::NixOS
            | os_info::Type::openSUSE
            | os_info::Type::OracleLinux
            | os_info::Type::Pop
            | os_info::Type::Raspbian
            | os_info::Type::Redhat
            | os_info::Type::RedHatEnterprise
            | os_info::Type::Solus
            | os_info::Type::Ubuntu => OperatingSystem::Linux,
            os_info::Type::FreeBSD => OperatingSystem::FreeBSD,
            // os_info may not recognise a distro; fall back to the build target
            _ => OperatingSystem::current(),
        }
    }

    fn detect_architecture() -> Architecture {
        match std::env::consts::ARCH {
            "x86_64" => Architecture::X86_64,
            "aarch64" => Architecture::Aarch64,
            "arm" => Architecture::Arm,
            "x86" | "i686" => Architecture::I686,
            _ => Architecture::Unknown,
        }
    }
}
