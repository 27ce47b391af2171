//! Common test utilities for lavadeploy CLI tests.
//!
//! Provides `TestEnv` - an isolated test environment with a temp project
//! directory, a scrubbed environment, and helpers to run the CLI.

pub mod env;

pub use env::*;
