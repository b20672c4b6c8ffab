//! Recording collaborator doubles shared by unit and integration tests.
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::error::DeployError;
use crate::fetch::Fetcher;
use crate::supervisor::{RestartMode, ServiceSupervisor};
use crate::unit::UnitDescriptor;
use crate::users::UserProvisioner;

/// One collaborator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch {
        url: String,
        destination: PathBuf,
        mode: u32,
        checksum: String,
    },
    EnsureUser(String),
    WriteUnit {
        name: String,
        unit: UnitDescriptor,
    },
    Enable(String),
    Start(String),
    Restart(String, RestartMode),
}

/// Ordered journal of calls, shared between doubles.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn record(&self, call: Call) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }

    /// Snapshot of every call recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Fetcher that records requests and optionally reports a checksum mismatch.
#[derive(Debug, Clone)]
pub struct RecordingFetcher {
    pub log: CallLog,
    pub mismatch: bool,
}

impl Fetcher for RecordingFetcher {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        mode: u32,
        expected_checksum: &str,
    ) -> Result<(), DeployError> {
        self.log.record(Call::Fetch {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            mode,
            checksum: expected_checksum.to_string(),
        });
        if self.mismatch {
            return Err(DeployError::ChecksumMismatch {
                url: url.to_string(),
                expected: expected_checksum.to_string(),
                actual: "0".repeat(64),
            });
        }
        Ok(())
    }
}

/// Provisioner that records requests and optionally fails them.
#[derive(Debug, Clone)]
pub struct RecordingProvisioner {
    pub log: CallLog,
    pub fail: bool,
}

impl UserProvisioner for RecordingProvisioner {
    fn ensure_user(&self, name: &str) -> Result<(), DeployError> {
        self.log.record(Call::EnsureUser(name.to_string()));
        if self.fail {
            return Err(DeployError::Provision {
                user: name.to_string(),
                reason: "useradd exited with status 1".into(),
            });
        }
        Ok(())
    }
}

/// Supervisor that records every instruction and always succeeds.
#[derive(Debug, Clone)]
pub struct RecordingSupervisor {
    pub log: CallLog,
}

impl ServiceSupervisor for RecordingSupervisor {
    fn write_unit(&self, name: &str, unit: &UnitDescriptor) -> Result<(), DeployError> {
        self.log.record(Call::WriteUnit {
            name: name.to_string(),
            unit: unit.clone(),
        });
        Ok(())
    }

    fn enable(&self, service: &str) -> Result<(), DeployError> {
        self.log.record(Call::Enable(service.to_string()));
        Ok(())
    }

    fn start(&self, service: &str) -> Result<(), DeployError> {
        self.log.record(Call::Start(service.to_string()));
        Ok(())
    }

    fn restart(&self, service: &str, mode: RestartMode) -> Result<(), DeployError> {
        self.log.record(Call::Restart(service.to_string(), mode));
        Ok(())
    }
}
