//! Release runner
//!
//! Resolves the version of a GitHub action, downloads the prebuilt binary
//! for the host from the matching release and runs it.

pub mod actions;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod exec;
pub mod locate;
pub mod runner;
pub mod version;

#[cfg(test)]
mod test_support;

pub use config::RunnerConfig;
pub use error::RunError;
pub use runner::{RunPlan, RunSummary, run};
