//! Process supervisor integration: unit installation and service control.
use std::{
    fs,
    path::{Path, PathBuf},
};

use strum_macros::{AsRefStr, EnumString};
use tracing::info;

use crate::constants::{SYSTEMCTL, SYSTEMD_UNIT_DIR};
use crate::error::DeployError;
use crate::exec;
use crate::unit::UnitDescriptor;

/// How a restart request is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RestartMode {
    /// Restart now and wait for the job to finish.
    Immediate,
    /// Queue the restart without waiting for it.
    Delayed,
}

/// A service manager that can install units and control services.
pub trait ServiceSupervisor {
    /// Installs `unit` under `name`, replacing any previous definition.
    fn write_unit(&self, name: &str, unit: &UnitDescriptor) -> Result<(), DeployError>;

    /// Enables `service` for boot-time activation.
    fn enable(&self, service: &str) -> Result<(), DeployError>;

    /// Starts `service` if it is not running.
    fn start(&self, service: &str) -> Result<(), DeployError>;

    /// Restarts `service`.
    fn restart(&self, service: &str, mode: RestartMode) -> Result<(), DeployError>;
}

/// systemd, driven through unit files and `systemctl`.
#[derive(Debug, Clone)]
pub struct Systemd {
    unit_dir: PathBuf,
    systemctl: PathBuf,
}

impl Default for Systemd {
    fn default() -> Self {
        Self {
            unit_dir: PathBuf::from(SYSTEMD_UNIT_DIR),
            systemctl: PathBuf::from(SYSTEMCTL),
        }
    }
}

impl Systemd {
    /// Writes unit files into `unit_dir` instead of the system directory.
    pub fn with_unit_dir(mut self, unit_dir: impl Into<PathBuf>) -> Self {
        self.unit_dir = unit_dir.into();
        self
    }

    /// Uses a different `systemctl` executable.
    pub fn with_systemctl(mut self, systemctl: impl Into<PathBuf>) -> Self {
        self.systemctl = systemctl.into();
        self
    }

    /// Path the unit `name` is written to.
    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(name)
    }

    fn systemctl(&self, action: &'static str, unit: &str, args: &[&str]) -> Result<(), DeployError> {
        exec::run("systemctl", &self.systemctl, args).map_err(|err| DeployError::Supervisor {
            action,
            unit: unit.to_string(),
            reason: err.to_string(),
        })
    }

    fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }
}

impl ServiceSupervisor for Systemd {
    fn write_unit(&self, name: &str, unit: &UnitDescriptor) -> Result<(), DeployError> {
        let path = self.unit_path(name);
        info!("Writing unit {}", path.display());

        Self::write_file(&path, &unit.render()).map_err(|err| DeployError::Supervisor {
            action: "write unit",
            unit: name.to_string(),
            reason: err.to_string(),
        })?;

        self.systemctl("reload", name, &["daemon-reload"])
    }

    fn enable(&self, service: &str) -> Result<(), DeployError> {
        info!("Enabling {service}");
        self.systemctl("enable", service, &["enable", service])
    }

    fn start(&self, service: &str) -> Result<(), DeployError> {
        info!("Starting {service}");
        self.systemctl("start", service, &["start", service])
    }

    fn restart(&self, service: &str, mode: RestartMode) -> Result<(), DeployError> {
        info!("Restarting {service} ({})", mode.as_ref());
        match mode {
            RestartMode::Immediate => self.systemctl("restart", service, &["restart", service]),
            RestartMode::Delayed => {
                self.systemctl("restart", service, &["--no-block", "restart", service])
            }
        }
    }
}
