#[path = "common/mod.rs"]
mod common;

use std::path::PathBuf;

use common::Doubles;
use schedkit::deploy::{Deployer, render_unit};
use schedkit::deployment::{Deployment, DeploymentConfig, DeploymentOverrides};
use schedkit::error::DeployError;
use schedkit::options::DaemonConfig;
use schedkit::supervisor::RestartMode;
use schedkit::test_utils::Call;

fn with_user(user: &str) -> Deployment {
    Deployment::new(
        DeploymentConfig::resolve(DeploymentOverrides {
            run_user: Some(user.to_string()),
            ..DeploymentOverrides::default()
        }),
        DaemonConfig::default(),
    )
}

#[test]
fn start_provisions_default_user_then_writes_restarts_enables_starts() {
    let doubles = Doubles::new();
    let deployment = Deployment::default();
    let deployer = Deployer::new(doubles.fetcher, doubles.users, doubles.supervisor);

    let unit = deployer.start(&deployment).expect("start succeeds");

    assert_eq!(
        doubles.log.calls(),
        vec![
            Call::EnsureUser("kubernetes".into()),
            Call::WriteUnit {
                name: "kube-scheduler.service".into(),
                unit: unit.clone(),
            },
            Call::Restart("kube-scheduler".into(), RestartMode::Immediate),
            Call::Enable("kube-scheduler".into()),
            Call::Start("kube-scheduler".into()),
        ]
    );
    assert_eq!(unit, render_unit(&deployment));
}

#[test]
fn start_skips_provisioning_for_custom_user() {
    let doubles = Doubles::new();
    let deployer = Deployer::new(doubles.fetcher, doubles.users, doubles.supervisor);

    let unit = deployer.start(&with_user("scheduler")).expect("start succeeds");

    let calls = doubles.log.calls();
    assert!(
        !calls.iter().any(|call| matches!(call, Call::EnsureUser(_))),
        "custom accounts are managed by the operator: {calls:?}"
    );
    assert_eq!(unit.execution.user, "scheduler");
}

#[test]
fn provisioning_failure_blocks_activation() {
    let mut doubles = Doubles::new();
    doubles.users.fail = true;
    let deployer = Deployer::new(doubles.fetcher, doubles.users, doubles.supervisor);

    let err = deployer.start(&Deployment::default()).unwrap_err();

    assert!(matches!(err, DeployError::Provision { ref user, .. } if user == "kubernetes"));
    assert_eq!(doubles.log.calls(), vec![Call::EnsureUser("kubernetes".into())]);
}

#[test]
fn repeated_start_restarts_every_time() {
    let doubles = Doubles::new();
    let deployer = Deployer::new(doubles.fetcher, doubles.users, doubles.supervisor);
    let deployment = Deployment::default();

    let first = deployer.start(&deployment).expect("first start");
    let second = deployer.start(&deployment).expect("second start");

    assert_eq!(first, second);
    let restarts = doubles
        .log
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Restart(_, RestartMode::Immediate)))
        .count();
    assert_eq!(restarts, 2);
}

#[test]
fn create_fetches_pinned_release_to_binary_path() {
    let doubles = Doubles::new();
    let deployer = Deployer::new(doubles.fetcher, doubles.users, doubles.supervisor);

    deployer.create(&Deployment::default()).expect("create succeeds");

    assert_eq!(
        doubles.log.calls(),
        vec![Call::Fetch {
            url: "https://storage.googleapis.com/kubernetes-release/release/v1.7.5/bin/linux/amd64/kube-scheduler".into(),
            destination: PathBuf::from("/usr/sbin/kube-scheduler"),
            mode: 0o755,
            checksum: "0c8b2b1710dad44284d3c8d39a518e5a0dcd549ad4f22edb8adfd5a0c93481ef".into(),
        }]
    );
}

#[test]
fn create_surfaces_checksum_mismatch() {
    let mut doubles = Doubles::new();
    doubles.fetcher.mismatch = true;
    let deployer = Deployer::new(doubles.fetcher, doubles.users, doubles.supervisor);

    let err = deployer.create(&Deployment::default()).unwrap_err();
    assert!(matches!(err, DeployError::ChecksumMismatch { .. }));
}
