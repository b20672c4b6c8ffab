//! Runs external tools, forwarding their output to the log.
use std::{
    ffi::OsStr,
    io::{self, BufRead, BufReader},
    process::{Command, Stdio},
    thread,
};

use tracing::{debug, info, warn};

/// Runs `program` with `args` to completion.
///
/// Stdout lines are logged at `info`, stderr lines at `warn`, each prefixed
/// with `label`. A non-zero exit status is reported as an error.
pub fn run<P, I, S>(label: &str, program: P, args: I) -> io::Result<()>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    debug!("[{label}] running {command:?}");

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout_handle = child.stdout.take().map(|stdout| {
        let label = label.to_string();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                info!("[{label}] {line}");
            }
        })
    });

    let stderr_handle = child.stderr.take().map(|stderr| {
        let label = label.to_string();
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                warn!("[{label}] {line}");
            }
        })
    });

    let status = child.wait()?;

    if let Some(handle) = stdout_handle {
        let _ = handle.join();
    }
    if let Some(handle) = stderr_handle {
        let _ = handle.join();
    }

    if !status.success() {
        return Err(io::Error::other(format!("exited with status {status}")));
    }

    Ok(())
}
