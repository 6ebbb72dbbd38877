pub mod keys;
pub mod settings;

pub use keys::{IMPORTED_KEYS, LAST_BOOTSTRAP_KEY};
pub use settings::RuntimeSettings;
