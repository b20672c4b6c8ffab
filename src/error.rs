//! Error handling for schedkit.
use std::path::PathBuf;

use thiserror::Error;

/// Defines all possible errors that can occur while deploying the scheduler.
#[derive(Debug, Error)]
pub enum DeployError {
    /// An override named an option the scheduler does not recognise.
    #[error("Unknown scheduler option '{name}'")]
    UnknownOption {
        /// The name exactly as supplied by the caller.
        name: String,
    },

    /// The same option was supplied twice under different spellings.
    #[error("Scheduler option '{name}' supplied more than once")]
    DuplicateOption {
        /// Canonical option name.
        name: String,
    },

    /// An override value could not be coerced into the option's declared type.
    #[error("Invalid value '{value}' for option '{name}': expected {expected}")]
    InvalidOptionValue {
        /// Canonical option name.
        name: String,
        /// The offending value, rendered as text.
        value: String,
        /// Human-readable name of the declared type.
        expected: &'static str,
    },

    /// The downloaded artifact does not hash to the expected digest.
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Source URL of the artifact.
        url: String,
        /// Expected sha256 digest (hex).
        expected: String,
        /// Actual sha256 digest (hex).
        actual: String,
    },

    /// The artifact could not be transferred to its destination.
    #[error("Failed to fetch {url} into {}: {reason}", destination.display())]
    Transfer {
        /// Source URL of the artifact.
        url: String,
        /// Where the artifact was being written.
        destination: PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// The run-as account could not be ensured.
    #[error("Failed to provision user '{user}': {reason}")]
    Provision {
        /// Account name.
        user: String,
        /// Description of the underlying failure.
        reason: String,
    },

    /// The process supervisor rejected an instruction.
    #[error("Supervisor failed to {action} '{unit}': {reason}")]
    Supervisor {
        /// The instruction that failed (e.g. `enable`, `restart`).
        action: &'static str,
        /// Unit or service name the instruction targeted.
        unit: String,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Error reading or accessing a configuration file.
    #[error("Failed to read config file: {0}")]
    ConfigReadError(#[from] std::io::Error),

    /// Error parsing YAML configuration.
    #[error("Invalid YAML format: {0}")]
    ConfigParseError(#[from] serde_yaml::Error),

    /// A `${VAR}` reference in the configuration file is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}
