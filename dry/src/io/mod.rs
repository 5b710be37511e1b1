//! Side-effecting helpers: processes, filesystem, environment and config.

pub mod config;
pub mod env;
pub mod process;
pub mod sandbox;
pub mod sweeper;
