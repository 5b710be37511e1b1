//! Deterministic, pure logic shared by the task runner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod account;
pub mod artifacts;
pub mod graph;
pub mod types;
