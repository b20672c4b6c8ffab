//! Deployment actions: installing the binary and launching it under the supervisor.
//!
//! Callers must not run [`Deployer::start`] concurrently for the same
//! deployment; the actions hold no locks of their own.
use tracing::{debug, info};

use crate::command::{self, RenderedCommand};
use crate::constants::{BINARY_MODE, SERVICE_NAME, UNIT_NAME};
use crate::deployment::Deployment;
use crate::error::DeployError;
use crate::fetch::Fetcher;
use crate::supervisor::{RestartMode, ServiceSupervisor};
use crate::unit::UnitDescriptor;
use crate::users::UserProvisioner;

/// Renders the command line for `deployment`.
pub fn render_command(deployment: &Deployment) -> RenderedCommand {
    command::generate(&deployment.deployment.binary_path, &deployment.daemon)
}

/// Builds the service unit for `deployment` without touching the system.
pub fn render_unit(deployment: &Deployment) -> UnitDescriptor {
    let rendered = render_command(deployment);
    UnitDescriptor::build(
        &deployment.deployment.binary_path,
        &rendered,
        &deployment.deployment.run_user,
        deployment.deployment.file_ulimit,
    )
}

/// Runs deployment actions against a set of collaborators.
pub struct Deployer<F, U, S> {
    fetcher: F,
    users: U,
    supervisor: S,
}

impl<F, U, S> Deployer<F, U, S>
where
    F: Fetcher,
    U: UserProvisioner,
    S: ServiceSupervisor,
{
    pub fn new(fetcher: F, users: U, supervisor: S) -> Self {
        Self {
            fetcher,
            users,
            supervisor,
        }
    }

    /// Installs the scheduler binary at its configured path.
    pub fn create(&self, deployment: &Deployment) -> Result<(), DeployError> {
        let config = &deployment.deployment;
        info!(
            "Installing kube-scheduler {} to {}",
            config.version,
            config.binary_path.display()
        );
        self.fetcher.fetch(
            &config.remote,
            &config.binary_path,
            BINARY_MODE,
            &config.checksum,
        )
    }

    /// Provisions the run-as account, installs the unit and (re)starts the service.
    ///
    /// Expects [`Deployer::create`] to have installed the binary already; a
    /// missing binary surfaces as a supervisor launch failure.
    pub fn start(&self, deployment: &Deployment) -> Result<UnitDescriptor, DeployError> {
        let config = &deployment.deployment;
        if config.uses_default_user() {
            self.users.ensure_user(&config.run_user)?;
        }

        let unit = render_unit(deployment);
        debug!("ExecStart={}", unit.execution.exec_start);

        self.supervisor.write_unit(UNIT_NAME, &unit)?;
        // Restart unconditionally so a running scheduler picks up the new unit.
        self.supervisor.restart(SERVICE_NAME, RestartMode::Immediate)?;
        self.supervisor.enable(SERVICE_NAME)?;
        self.supervisor.start(SERVICE_NAME)?;

        info!("{SERVICE_NAME} enabled and started as '{}'", config.run_user);
        Ok(unit)
    }
}
