// Allow uppercase acronyms for industry-standard terms like BBU, NCQ, WT/WB
#![allow(clippy::upper_case_acronyms)]

pub mod controller;
pub mod model;
pub mod parsing;
pub mod settings;
pub mod tool;

// Re-export the controller façade and records for convenience
pub use controller::{MegaCli, MutationPlan, MutationStep, PdListBuilder};
pub use model::{
    Adapter, AdapterProperties, BbuCachePolicy, CachePolicy, Disk, DiskAddress, Enclosure,
    LogicalDrive, LogicalDriveProperties, ReadPolicy, WritePolicy,
};
pub use settings::ToolConfig;
pub use tool::{ExitOutcome, ExitPolicy, SystemRunner, ToolOutput, ToolRunner};

use thiserror::Error;

/// Failures reported by the MegaCLI translation layer.
///
/// None of these are retried internally; the caller decides whether to
/// repeat the whole operation.
#[derive(Error, Debug)]
pub enum RaidError {
    #[error("MegaCLI is unavailable: {0}")]
    ToolUnavailable(String),

    #[error("MegaCLI execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Query `{command}` failed with exit code {code}")]
    QueryFailed { command: String, code: i32 },

    #[error("Mutation step `{step}` failed with exit code {code}")]
    MutationFailed { step: String, code: i32 },

    #[error("Physical drive list needs {needed} bytes but capacity is {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Inconsistent tool output: {0}")]
    ConsistencyError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Manual Clone implementation because std::io::Error doesn't implement Clone
impl Clone for RaidError {
    fn clone(&self) -> Self {
        match self {
            RaidError::ToolUnavailable(s) => RaidError::ToolUnavailable(s.clone()),
            RaidError::ExecutionFailed(s) => RaidError::ExecutionFailed(s.clone()),
            RaidError::QueryFailed { command, code } => RaidError::QueryFailed {
                command: command.clone(),
                code: *code,
            },
            RaidError::MutationFailed { step, code } => RaidError::MutationFailed {
                step: step.clone(),
                code: *code,
            },
            RaidError::CapacityExceeded { needed, capacity } => RaidError::CapacityExceeded {
                needed: *needed,
                capacity: *capacity,
            },
            RaidError::ConsistencyError(s) => RaidError::ConsistencyError(s.clone()),
            RaidError::Config(s) => RaidError::Config(s.clone()),
            RaidError::Io(e) => RaidError::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl From<::config::ConfigError> for RaidError {
    fn from(err: ::config::ConfigError) -> Self {
        RaidError::Config(err.to_string())
    }
}

impl RaidError {
    /// Exit code carried by a failed query or mutation, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RaidError::QueryFailed { code, .. } | RaidError::MutationFailed { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

pub type RaidResult<T> = Result<T, RaidError>;

#[cfg(test)]
mod lib_tests;
