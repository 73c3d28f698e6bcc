use std::{
    io::{self, Read},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::debug;
use snafu::{ResultExt, Snafu};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured result of an external command that ran to completion.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `program` with positional `args`, capturing its output.
///
/// The child is killed when it is still running after `timeout`.
pub fn run(program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput, ProcessError> {
    debug!("Running: {} {}", program, args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context(SpawnSnafu { program })?;

    // Drain both pipes while the child runs.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_with_timeout(&mut child, program, timeout)?;

    Ok(CommandOutput {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn wait_with_timeout(child: &mut Child, program: &str, timeout: Duration) -> Result<ExitStatus, ProcessError> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context(WaitSnafu { program })? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return TimedOutSnafu { program, timeout }.fail();
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum ProcessError {
    #[snafu(display("Could not start '{program}'"))]
    Spawn { program: String, source: io::Error },

    #[snafu(display("Could not wait for '{program}' to finish"))]
    Wait { program: String, source: io::Error },

    #[snafu(display("'{program}' did not finish within {}", humantime::format_duration(*timeout)))]
    TimedOut { program: String, timeout: Duration },
}

impl ProcessError {
    /// True when the program could not be found on the PATH.
    pub fn is_missing_program(&self) -> bool {
        matches!(self, ProcessError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn captures_stdout_and_stderr() {
        let output = run("sh", &args(&["-c", "echo out; echo err >&2"]), Duration::from_secs(5)).unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn reports_non_zero_exit_without_error() {
        let output = run("sh", &args(&["-c", "exit 3"]), Duration::from_secs(5)).unwrap();

        assert!(!output.success());
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = run("cups-keepalive-no-such-tool", &[], Duration::from_secs(5)).unwrap_err();

        assert!(err.is_missing_program());
    }

    #[test]
    fn kills_programs_that_outlive_the_timeout() {
        let started = Instant::now();
        let err = run("sleep", &args(&["5"]), Duration::from_millis(100)).unwrap_err();

        assert!(matches!(err, ProcessError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
