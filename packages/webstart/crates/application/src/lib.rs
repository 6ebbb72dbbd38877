pub mod bootstrap;
pub mod launch;
pub mod notification;

pub use bootstrap::ConfigBootstrap;
pub use launch::{extract_app_identity, filter_args, LaunchOrchestrator};
pub use notification::{NotificationClosed, NotificationSender, StartupNotificationBridge};
