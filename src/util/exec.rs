use std::ffi::OsString;
use std::io;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use wait_timeout::ChildExt;

/// Structured command execution with optional timeouts.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    /// A zero `default_timeout` waits forever.
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if request.capture_output {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        tracing::debug!(program = ?request.program, args = ?request.args, "exec");
        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn {:?} with args {:?}",
                request.program, request.args
            )
        })?;

        // Drain pipes on helper threads so a chatty child cannot fill a pipe and stall
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();
        let status = if timeout.is_zero() {
            child.wait().context("failed to wait for process")?
        } else {
            match child
                .wait_timeout(timeout)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command {:?} timed out after {}",
                        request.program,
                        humantime::format_duration(timeout)
                    ));
                }
            }
        };

        let duration = started.elapsed();
        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;
        tracing::debug!(
            program = ?request.program,
            code = ?status.code(),
            elapsed_ms = duration.as_millis() as u64,
            "exec finished"
        );

        Ok(ExecOutput {
            status,
            duration,
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: io::Read + Send + 'static>(mut stream: R) -> std::thread::JoinHandle<io::Result<String>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join_reader(handle: Option<std::thread::JoinHandle<io::Result<String>>>) -> Result<String> {
    match handle {
        None => Ok(String::new()),
        Some(h) => h
            .join()
            .map_err(|_| anyhow!("output reader thread panicked"))?
            .context("failed to read process output"),
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[derive(Debug, Default)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    capture_output: bool,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Capture stdout/stderr instead of inheriting the terminal.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_exit_code() {
        let out = ExecService::default()
            .run(
                ExecRequest::new("sh")
                    .args(["-c", "echo hello; echo oops >&2; exit 3"])
                    .capture_output(true),
            )
            .expect("run sh");
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.status.code(), Some(3));
    }

    #[test]
    fn times_out_long_running_command() {
        let err = ExecService::new(Duration::from_millis(100))
            .run(ExecRequest::new("sleep").arg("5").capture_output(true))
            .expect_err("should time out");
        assert!(err.to_string().contains("timed out"), "{err}");
    }

    #[test]
    fn spawn_failure_names_program() {
        let err = ExecService::default()
            .run(ExecRequest::new("dockhand-definitely-missing-binary"))
            .expect_err("spawn should fail");
        assert!(format!("{err:#}").contains("dockhand-definitely-missing-binary"));
    }
}
