//! System account provisioning for the run-as identity.
use std::path::PathBuf;

use nix::unistd::User;
use tracing::info;

use crate::constants::{NOLOGIN_SHELL, USERADD};
use crate::error::DeployError;
use crate::exec;

/// Makes sure a system account exists.
pub trait UserProvisioner {
    /// Creates `name` if it does not exist yet. Fails with [`DeployError::Provision`].
    fn ensure_user(&self, name: &str) -> Result<(), DeployError>;
}

/// Provisions accounts in the local user database via `useradd`.
#[derive(Debug, Clone)]
pub struct SystemUserProvisioner {
    useradd: PathBuf,
    shell: PathBuf,
}

impl Default for SystemUserProvisioner {
    fn default() -> Self {
        Self {
            useradd: PathBuf::from(USERADD),
            shell: PathBuf::from(NOLOGIN_SHELL),
        }
    }
}

impl SystemUserProvisioner {
    /// Uses a different `useradd` executable.
    pub fn with_useradd(mut self, useradd: impl Into<PathBuf>) -> Self {
        self.useradd = useradd.into();
        self
    }

    fn provision_error(name: &str, reason: impl ToString) -> DeployError {
        DeployError::Provision {
            user: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl UserProvisioner for SystemUserProvisioner {
    fn ensure_user(&self, name: &str) -> Result<(), DeployError> {
        let existing =
            User::from_name(name).map_err(|err| Self::provision_error(name, err))?;
        if existing.is_some() {
            info!("User '{name}' already exists");
            return Ok(());
        }

        info!("Creating system user '{name}'");
        let shell = self.shell.display().to_string();
        exec::run(
            "useradd",
            &self.useradd,
            ["--system", "--no-create-home", "--shell", shell.as_str(), name],
        )
        .map_err(|err| Self::provision_error(name, err))
    }
}
