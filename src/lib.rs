//! Schedkit installs kube-scheduler and runs it under systemd. It turns a typed,
//! declarative set of scheduler options into a deterministic command line,
//! wraps that command line in a systemd unit and hands the unit to the
//! supervisor.

/// CLI interface.
pub mod cli;

/// Scheduler command-line rendering.
pub mod command;

/// Configuration management.
pub mod config;

/// Built-in defaults and fixed paths.
pub mod constants;

/// Deployment actions.
pub mod deploy;

/// Deployment settings and the combined configuration model.
pub mod deployment;

/// Error handling.
pub mod error;

/// External command execution.
pub mod exec;

/// Release artifact download.
pub mod fetch;

/// Scheduler flag model.
pub mod options;

/// Process supervisor integration.
pub mod supervisor;

/// Service unit model.
pub mod unit;

/// System account provisioning.
pub mod users;

pub mod test_utils;
