pub mod acquisition;
pub mod config;
pub mod local;
pub mod monitor;
pub mod processing;
pub mod regions;
pub mod utils;

#[cfg(feature = "python")]
pub mod bindings;
