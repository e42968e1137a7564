//! cyberlab: hands-on security labs in your terminal
//!
//! A simulated lab environment for practising offensive security tooling.
//! The terminal plays back realistic output for common tools and tracks a
//! checklist of objectives for each lab.
//!
//! # Lab Mechanics
//!
//! - **Boot**: a lab takes a few seconds to provision before it accepts input
//! - **Commands**: exact-match command table with canned, delayed output
//! - **Objectives**: fixed per lab, ticked off by specific commands
//! - **Finish**: once every objective is done the lab can be completed
//!
//! # Architecture
//!
//! - `data` - Lab catalogue, command table, status and objective types
//! - `lab` - Session state machine and the async simulator engine
//! - `config` - TOML configuration
//! - `tui` - Terminal user interface with ratatui

pub mod config;
pub mod data;
pub mod lab;
pub mod tui;

pub use config::LabConfig;
pub use data::*;
pub use lab::{LabEvent, LabHandle, LabSession, LabSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for application plumbing
pub type Result<T> = anyhow::Result<T>;

/// Errors reported by the lab API
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabError {
    #[error("lab is not running (status: {0})")]
    NotRunning(LabStatus),

    #[error("{remaining} objective(s) still incomplete")]
    ObjectivesIncomplete { remaining: usize },

    #[error("lab engine has shut down")]
    EngineClosed,

    #[error("invalid configuration: {0}")]
    Config(String),
}
