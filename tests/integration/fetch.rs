#[path = "common/mod.rs"]
mod common;

use std::{fs, os::unix::fs::PermissionsExt, time::Duration};

use common::serve_once;
use reqwest::blocking::Client;
use schedkit::error::DeployError;
use schedkit::fetch::{Fetcher, HttpFetcher, sha256_hex};
use tempfile::tempdir;

fn fetcher() -> HttpFetcher {
    let client = Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("client");
    HttpFetcher::from_client(client)
}

#[test]
fn downloads_verifies_and_installs_executable() {
    let temp = tempdir().expect("failed to create tempdir");
    let destination = temp.path().join("sbin/kube-scheduler");
    let body = b"#!/bin/sh\necho scheduler\n".to_vec();
    let checksum = sha256_hex(&body[..]).expect("hash");
    let url = serve_once("200 OK", body.clone());

    fetcher()
        .fetch(&url, &destination, 0o755, &checksum)
        .expect("fetch succeeds");

    assert_eq!(fs::read(&destination).expect("installed"), body);
    let mode = fs::metadata(&destination).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    assert!(!temp.path().join("sbin/kube-scheduler.part").exists());
}

#[test]
fn checksum_mismatch_leaves_nothing_behind() {
    let temp = tempdir().expect("failed to create tempdir");
    let destination = temp.path().join("kube-scheduler");
    let url = serve_once("200 OK", b"tampered".to_vec());
    let expected = "0".repeat(64);

    let err = fetcher()
        .fetch(&url, &destination, 0o755, &expected)
        .unwrap_err();

    match err {
        DeployError::ChecksumMismatch {
            expected: reported,
            actual,
            ..
        } => {
            assert_eq!(reported, expected);
            assert_eq!(actual, sha256_hex(&b"tampered"[..]).unwrap());
        }
        other => panic!("expected checksum mismatch, got {other:?}"),
    }
    assert!(!destination.exists());
    assert!(!temp.path().join("kube-scheduler.part").exists());
}

#[test]
fn http_error_is_a_transfer_error() {
    let temp = tempdir().expect("failed to create tempdir");
    let destination = temp.path().join("kube-scheduler");
    let url = serve_once("404 Not Found", Vec::new());

    let err = fetcher()
        .fetch(&url, &destination, 0o755, &"0".repeat(64))
        .unwrap_err();
    assert!(matches!(err, DeployError::Transfer { .. }));
    assert!(!destination.exists());
}

#[test]
fn matching_binary_in_place_is_not_downloaded_again() {
    let temp = tempdir().expect("failed to create tempdir");
    let destination = temp.path().join("kube-scheduler");
    fs::write(&destination, b"already here").expect("seed binary");
    let checksum = sha256_hex(&b"already here"[..]).unwrap();

    // Nothing listens on the discard port; a download attempt would fail.
    fetcher()
        .fetch("http://127.0.0.1:9/kube-scheduler", &destination, 0o755, &checksum)
        .expect("existing binary is accepted");

    let mode = fs::metadata(&destination).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
}
