//! Facade over the launcher layers so binaries depend on a single crate.

pub use application;
pub use domain;
pub use infrastructure;
