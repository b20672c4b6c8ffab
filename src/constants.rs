//! Constants and built-in defaults for the scheduler deployment.
//!
//! This module centralizes the release coordinates, account names, paths and
//! unit metadata used throughout the crate.

use std::time::Duration;

// ============================================================================
// Release Artifact
// ============================================================================

/// kube-scheduler release installed when no version is configured.
pub const DEFAULT_VERSION: &str = "1.7.5";

/// sha256 digest of the default release for `linux/amd64`.
pub const DEFAULT_CHECKSUM: &str =
    "0c8b2b1710dad44284d3c8d39a518e5a0dcd549ad4f22edb8adfd5a0c93481ef";

/// Base URL of the upstream Kubernetes release bucket.
pub const RELEASE_BASE_URL: &str = "https://storage.googleapis.com/kubernetes-release";

/// Default target operating system for downloads.
pub const DEFAULT_OS: &str = "linux";

/// Default target CPU architecture for downloads.
pub const DEFAULT_ARCH: &str = "amd64";

/// File name of the scheduler binary inside a release.
pub const BINARY_NAME: &str = "kube-scheduler";

/// Permission bits applied to the installed binary.
pub const BINARY_MODE: u32 = 0o755;

/// Upper bound for a single release download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

// ============================================================================
// Installation Paths
// ============================================================================

/// Where the scheduler binary is installed and executed from.
pub const SCHEDULER_PATH: &str = "/usr/sbin/kube-scheduler";

/// Directory systemd reads administrator unit files from.
pub const SYSTEMD_UNIT_DIR: &str = "/etc/systemd/system";

/// Suffix appended to in-flight downloads before they are moved into place.
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = "part";

// ============================================================================
// Service Identity
// ============================================================================

/// Account the scheduler runs as; provisioned automatically when selected.
pub const DEFAULT_RUN_USER: &str = "kubernetes";

/// Open file descriptor limit applied to the service.
pub const DEFAULT_FILE_ULIMIT: u64 = 65_536;

/// Service name handed to the supervisor.
pub const SERVICE_NAME: &str = "kube-scheduler";

/// Unit file name written for the service.
pub const UNIT_NAME: &str = "kube-scheduler.service";

// ============================================================================
// Unit Metadata
// ============================================================================

/// Documentation link embedded in the unit.
pub const DOCUMENTATION_URL: &str = "https://k8s.io";

/// Ordering dependency: start once networking is up.
pub const START_AFTER: &str = "network.target";

/// Activation target for boot-time start.
pub const WANTED_BY: &str = "multi-user.target";

// ============================================================================
// External Tooling
// ============================================================================

/// `systemctl` binary used by the systemd supervisor.
pub const SYSTEMCTL: &str = "systemctl";

/// `useradd` binary used to provision the run-as account.
pub const USERADD: &str = "useradd";

/// Login shell assigned to provisioned service accounts.
pub const NOLOGIN_SHELL: &str = "/usr/sbin/nologin";

/// Default configuration file looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "schedkit.yaml";
