#[path = "common/mod.rs"]
mod common;

use std::fs;

use common::{recorded_lines, recording_script};
use schedkit::deploy::{Deployer, render_unit};
use schedkit::deployment::Deployment;
use schedkit::error::DeployError;
use schedkit::supervisor::{RestartMode, ServiceSupervisor, Systemd};
use schedkit::test_utils::{CallLog, RecordingFetcher, RecordingProvisioner};
use tempfile::tempdir;

#[test]
fn write_unit_installs_file_and_reloads() {
    let temp = tempdir().expect("failed to create tempdir");
    let log = temp.path().join("systemctl.log");
    let systemctl = recording_script(temp.path(), "systemctl", &log, 0);
    let unit_dir = temp.path().join("units");

    let systemd = Systemd::default()
        .with_unit_dir(&unit_dir)
        .with_systemctl(&systemctl);
    let unit = render_unit(&Deployment::default());

    systemd
        .write_unit("kube-scheduler.service", &unit)
        .expect("write unit");

    let written = fs::read_to_string(unit_dir.join("kube-scheduler.service"))
        .expect("unit file exists");
    assert_eq!(written, unit.render());
    assert_eq!(recorded_lines(&log), vec!["daemon-reload".to_string()]);
}

#[test]
fn restart_modes_map_to_systemctl_arguments() {
    let temp = tempdir().expect("failed to create tempdir");
    let log = temp.path().join("systemctl.log");
    let systemctl = recording_script(temp.path(), "systemctl", &log, 0);
    let systemd = Systemd::default().with_systemctl(&systemctl);

    systemd
        .restart("kube-scheduler", RestartMode::Immediate)
        .expect("immediate restart");
    systemd
        .restart("kube-scheduler", RestartMode::Delayed)
        .expect("delayed restart");

    assert_eq!(
        recorded_lines(&log),
        vec![
            "restart kube-scheduler".to_string(),
            "--no-block restart kube-scheduler".to_string(),
        ]
    );
}

#[test]
fn failing_systemctl_is_reported_with_action() {
    let temp = tempdir().expect("failed to create tempdir");
    let log = temp.path().join("systemctl.log");
    let systemctl = recording_script(temp.path(), "systemctl", &log, 1);
    let systemd = Systemd::default().with_systemctl(&systemctl);

    let err = systemd.enable("kube-scheduler").unwrap_err();
    assert!(matches!(
        err,
        DeployError::Supervisor { action: "enable", ref unit, .. } if unit == "kube-scheduler"
    ));
}

#[test]
fn start_drives_systemctl_in_order() {
    let temp = tempdir().expect("failed to create tempdir");
    let log = temp.path().join("systemctl.log");
    let systemctl = recording_script(temp.path(), "systemctl", &log, 0);
    let unit_dir = temp.path().join("units");

    let calls = CallLog::default();
    let deployer = Deployer::new(
        RecordingFetcher {
            log: calls.clone(),
            mismatch: false,
        },
        RecordingProvisioner {
            log: calls.clone(),
            fail: false,
        },
        Systemd::default()
            .with_unit_dir(&unit_dir)
            .with_systemctl(&systemctl),
    );

    let unit = deployer.start(&Deployment::default()).expect("start succeeds");

    assert_eq!(
        recorded_lines(&log),
        vec![
            "daemon-reload".to_string(),
            "restart kube-scheduler".to_string(),
            "enable kube-scheduler".to_string(),
            "start kube-scheduler".to_string(),
        ]
    );
    let written = fs::read_to_string(unit_dir.join("kube-scheduler.service"))
        .expect("unit file exists");
    assert!(written.contains(&format!("ExecStart={}\n", unit.execution.exec_start)));
}
