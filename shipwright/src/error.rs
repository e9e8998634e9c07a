use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShipError {
    #[error("{tool} is required for package index release! Install it or pass --skip-index")]
    MissingDependency { tool: String },

    #[error("You can only release from {expected}! Current branch is '{actual}'")]
    WrongBranch { expected: String, actual: String },

    #[error("Could not determine the current branch: {reason}")]
    BranchUnknown { reason: String },

    #[error("Failed to parse version '{input}': {reason}. Expected dotted integers (e.g., 2.9.3)")]
    VersionParse { input: String, reason: String },

    #[error("Version record error at {path}: {message}")]
    VersionRecord { path: PathBuf, message: String },

    #[error("A release is already in progress (lock file {path} exists). Run `shipwright unlock` if it is stale")]
    LockHeld { path: PathBuf },

    #[error("Package repository not found at {path} after manual clone prompt")]
    PackageRepoMissing { path: PathBuf },

    #[error("Step '{step}' failed: {detail}")]
    StepFailed { step: String, detail: String },

    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ShipError {
    /// Precondition failures abort before anything has been mutated
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ShipError::MissingDependency { .. }
                | ShipError::WrongBranch { .. }
                | ShipError::BranchUnknown { .. }
                | ShipError::LockHeld { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ShipError>;
