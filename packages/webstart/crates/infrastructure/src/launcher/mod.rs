pub mod process;

pub use process::{java_executable, JvmProcessLauncher, APP_ENV};
