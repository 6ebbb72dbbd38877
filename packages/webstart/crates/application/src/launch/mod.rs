pub mod args;
pub mod orchestrator;

pub use args::{extract_app_identity, filter_args, NO_FORK_FLAG, UNKNOWN_APP};
pub use orchestrator::LaunchOrchestrator;
