//! Deployment-only settings: release coordinates, install path and service identity.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{
    BINARY_NAME, DEFAULT_ARCH, DEFAULT_CHECKSUM, DEFAULT_FILE_ULIMIT, DEFAULT_OS,
    DEFAULT_RUN_USER, DEFAULT_VERSION, RELEASE_BASE_URL, SCHEDULER_PATH,
};
use crate::options::DaemonConfig;

/// Caller-supplied deployment settings. Absent fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentOverrides {
    /// kube-scheduler release, without the leading `v`.
    pub version: Option<String>,
    /// Target operating system of the release artifact.
    pub os: Option<String>,
    /// Target CPU architecture of the release artifact.
    pub arch: Option<String>,
    /// Explicit download URL. Derived from version/os/arch when absent.
    pub remote: Option<String>,
    /// Expected sha256 digest (hex) of the artifact.
    pub checksum: Option<String>,
    /// Account the service runs as.
    pub run_user: Option<String>,
    /// `LimitNOFILE` for the service.
    pub file_ulimit: Option<u64>,
    /// Install path of the binary.
    pub binary_path: Option<PathBuf>,
}

/// Fully resolved deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentConfig {
    pub version: String,
    pub os: String,
    pub arch: String,
    pub remote: String,
    pub checksum: String,
    pub run_user: String,
    pub file_ulimit: u64,
    pub binary_path: PathBuf,
}

/// Settings before derived defaults have been filled in.
struct PartialDeployment {
    version: String,
    os: String,
    arch: String,
    remote: Option<String>,
}

/// Upstream download URL for a release built for `os`/`arch`.
pub fn release_url(version: &str, os: &str, arch: &str) -> String {
    format!("{RELEASE_BASE_URL}/release/v{version}/bin/{os}/{arch}/{BINARY_NAME}")
}

fn derive_remote(partial: &PartialDeployment) -> String {
    release_url(&partial.version, &partial.os, &partial.arch)
}

impl DeploymentConfig {
    /// Applies overrides onto the defaults, then computes derived defaults once.
    pub fn resolve(overrides: DeploymentOverrides) -> Self {
        if overrides.version.is_some() && overrides.checksum.is_none() {
            warn!(
                "version overridden without a checksum; the built-in checksum only matches kube-scheduler {DEFAULT_VERSION}"
            );
        }

        let partial = PartialDeployment {
            version: overrides
                .version
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            os: overrides.os.unwrap_or_else(|| DEFAULT_OS.to_string()),
            arch: overrides.arch.unwrap_or_else(|| DEFAULT_ARCH.to_string()),
            remote: overrides.remote,
        };
        let remote = partial
            .remote
            .clone()
            .unwrap_or_else(|| derive_remote(&partial));

        Self {
            version: partial.version,
            os: partial.os,
            arch: partial.arch,
            remote,
            checksum: overrides
                .checksum
                .unwrap_or_else(|| DEFAULT_CHECKSUM.to_string()),
            run_user: overrides
                .run_user
                .unwrap_or_else(|| DEFAULT_RUN_USER.to_string()),
            file_ulimit: overrides.file_ulimit.unwrap_or(DEFAULT_FILE_ULIMIT),
            binary_path: overrides
                .binary_path
                .unwrap_or_else(|| PathBuf::from(SCHEDULER_PATH)),
        }
    }

    /// Whether the run-as account is the built-in one this tool provisions itself.
    pub fn uses_default_user(&self) -> bool {
        self.run_user == DEFAULT_RUN_USER
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::resolve(DeploymentOverrides::default())
    }
}

/// Everything needed to install and launch the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deployment {
    /// Release, path and identity settings.
    pub deployment: DeploymentConfig,
    /// Flags passed to the scheduler.
    pub daemon: DaemonConfig,
}

impl Deployment {
    pub fn new(deployment: DeploymentConfig, daemon: DaemonConfig) -> Self {
        Self { deployment, daemon }
    }
}
