//! Blocking execution of external processes.
//!
//! The caller is blocked until the process exits or the timeout expires,
//! whichever comes first.
//! Stdout and stderr are drained on helper threads so a chatty process can
//! never fill its pipe and stall the wait.

use std::io::Read;
use std::process::{Command as ProcessCommand, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use termdash_types::error::{DashError, Result};
use wait_timeout::ChildExt;

/// Run `argv` and return its stdout. A spawn failure, a non-zero exit, or
/// an expired timeout is an [`DashError::Execution`] error.
pub fn run_process(argv: &[String], timeout: Option<Duration>) -> Result<String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| DashError::Execution("empty command line".into()))?;
    log::debug!("Running {argv:?}");

    let mut child = ProcessCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DashError::Execution(format!("failed to start '{program}': {e}")))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        Some(limit) => {
            let waited = child
                .wait_timeout(limit)
                .map_err(|e| DashError::Execution(format!("waiting for '{program}': {e}")))?;
            match waited {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    // A grandchild may still hold the pipes open; leave the
                    // readers detached rather than joining them.
                    drop(stdout);
                    drop(stderr);
                    return Err(DashError::Execution(format!(
                        "'{program}' timed out after {limit:?}"
                    )));
                },
            }
        },
        None => child
            .wait()
            .map_err(|e| DashError::Execution(format!("waiting for '{program}': {e}")))?,
    };

    let out = collect(stdout)?;
    let err = collect(stderr)?;
    if !status.success() {
        return Err(DashError::Execution(format!(
            "'{program}' failed ({status}): {}",
            err.trim()
        )));
    }
    Ok(out)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn collect(handle: JoinHandle<std::io::Result<String>>) -> Result<String> {
    handle
        .join()
        .map_err(|_| DashError::Execution("output reader panicked".into()))?
        .map_err(|e| DashError::Execution(format!("reading output: {e}")))
}
