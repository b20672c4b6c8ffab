#![allow(dead_code)]

use std::{
    fs,
    io::{Read, Write},
    net::TcpListener,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    thread,
};

use schedkit::test_utils::{CallLog, RecordingFetcher, RecordingProvisioner, RecordingSupervisor};

/// Recording doubles that share one call journal.
pub struct Doubles {
    pub log: CallLog,
    pub fetcher: RecordingFetcher,
    pub users: RecordingProvisioner,
    pub supervisor: RecordingSupervisor,
}

impl Doubles {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            fetcher: RecordingFetcher {
                log: log.clone(),
                mismatch: false,
            },
            users: RecordingProvisioner {
                log: log.clone(),
                fail: false,
            },
            supervisor: RecordingSupervisor { log: log.clone() },
            log,
        }
    }
}

/// Writes an executable shell script that appends its arguments to `log`.
pub fn recording_script(dir: &Path, name: &str, log: &Path, exit_code: i32) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            "#!/bin/sh\necho \"$@\" >> \"{}\"\nexit {exit_code}\n",
            log.display()
        ),
    )
    .expect("failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("failed to mark script executable");
    path
}

/// Lines recorded by a [`recording_script`], or nothing if it never ran.
pub fn recorded_lines(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Serves a single HTTP response on a loopback port and returns its URL.
pub fn serve_once(status: &str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind listener");
    let addr = listener.local_addr().expect("listener address");
    let status = status.to_string();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let header = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });

    format!("http://{addr}/release/kube-scheduler")
}
