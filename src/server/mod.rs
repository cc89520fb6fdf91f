//! Server module for Rumbo
//!
//! # Module Structure
//!
//! - `config`: configuration structures
//! - `loader`: configuration and secret loading
//! - `init`: component wiring and the run loop
//! - `shutdown`: signal handling

pub mod config;
mod init;
mod loader;
mod shutdown;

pub use init::run;
pub use loader::{load_config, Secrets};
