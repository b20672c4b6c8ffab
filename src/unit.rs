//! Structured systemd unit for the scheduler service.
use std::{fmt::Write as _, path::Path};

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::command::RenderedCommand;
use crate::constants::{DOCUMENTATION_URL, START_AFTER, WANTED_BY};

/// systemd `Restart=` policies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    No,
    Always,
    OnSuccess,
    OnFailure,
    OnAbnormal,
    OnAbort,
    OnWatchdog,
}

/// `[Unit]` section: identity and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySection {
    pub description: String,
    pub documentation: String,
    pub after: String,
}

/// `[Service]` section: how the process is launched and kept alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSection {
    pub user: String,
    pub exec_start: String,
    pub restart: RestartPolicy,
    pub limit_nofile: u64,
}

/// `[Install]` section: activation at boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallSection {
    pub wanted_by: String,
}

/// One rendered `[Section]` with its ordered `Key=Value` entries.
pub type Section = (&'static str, Vec<(&'static str, String)>);

/// Service unit handed to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDescriptor {
    pub identity: IdentitySection,
    pub execution: ExecutionSection,
    pub install: InstallSection,
}

impl UnitDescriptor {
    /// Builds the unit that runs `rendered` as `run_user`.
    ///
    /// The restart policy is always `on-failure`: a crashed control-plane
    /// component is retried rather than left down.
    pub fn build(
        executable: &Path,
        rendered: &RenderedCommand,
        run_user: &str,
        fd_limit: u64,
    ) -> Self {
        let description = executable
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| executable.display().to_string());

        Self {
            identity: IdentitySection {
                description,
                documentation: DOCUMENTATION_URL.to_string(),
                after: START_AFTER.to_string(),
            },
            execution: ExecutionSection {
                user: run_user.to_string(),
                exec_start: rendered.to_string(),
                restart: RestartPolicy::OnFailure,
                limit_nofile: fd_limit,
            },
            install: InstallSection {
                wanted_by: WANTED_BY.to_string(),
            },
        }
    }

    /// Ordered section map in systemd key spelling.
    pub fn sections(&self) -> Vec<Section> {
        vec![
            (
                "Unit",
                vec![
                    ("Description", self.identity.description.clone()),
                    ("Documentation", self.identity.documentation.clone()),
                    ("After", self.identity.after.clone()),
                ],
            ),
            (
                "Service",
                vec![
                    ("User", self.execution.user.clone()),
                    ("ExecStart", self.execution.exec_start.clone()),
                    ("Restart", self.execution.restart.to_string()),
                    ("LimitNOFILE", self.execution.limit_nofile.to_string()),
                ],
            ),
            ("Install", vec![("WantedBy", self.install.wanted_by.clone())]),
        ]
    }

    /// Unit file contents.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, (section, entries)) in self.sections().iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "[{section}]");
            for (key, value) in entries {
                let _ = writeln!(out, "{key}={value}");
            }
        }
        out
    }
}
