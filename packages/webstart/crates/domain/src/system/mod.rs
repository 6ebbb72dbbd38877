pub mod platform;

pub use platform::{Architecture, OperatingSystem, Platform, PlatformDetector, PlatformInfo};
