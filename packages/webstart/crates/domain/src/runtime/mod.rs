pub mod record;
pub mod registry;
pub mod requirements;
pub mod selector;

pub use record::{LocalRuntime, RecordError, RemoteRuntime, RuntimeIdentity, RuntimeRecord};
pub use registry::RuntimeRegistry;
pub use requirements::{parse_version, RuntimeRequirements, VendorFilter};
pub use selector::{
    AcquisitionStrategy, AskForUpdateStrategy, RuntimeSelector, SelectionError, UpdateCheck,
    UpdateStrategy,
};
