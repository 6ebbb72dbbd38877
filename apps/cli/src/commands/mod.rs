pub mod bootstrap;
pub mod launch;
pub mod runtimes;
