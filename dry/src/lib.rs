//! Task runner for Terraform modules tested with Go.
//!
//! `dry` sequences cleaning, formatting, sandbox authentication and test runs.
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (task graph, artifact
//!   classification, account selection). No I/O.
//! - **[`io`]**: Side-effecting operations (processes, filesystem, environment,
//!   config). Isolated behind the [`io::process::ToolRunner`] seam.
//!
//! [`tasks`] wires both together into the named tasks the CLI exposes.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod tasks;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
