//! Command execution seam shared by all CLI-backed capabilities.

use std::time::Duration;

use crate::errors::DockhandError;
use crate::util::exec::{ExecRequest, ExecService};
use crate::util::shell_join;

/// A program and its arguments, plus whether its output should reach the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// Inherit the terminal instead of capturing (long-running installs show progress).
    pub stream: bool,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stream: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn streamed(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Shell-quoted preview for logs, dry-run output and error messages.
    pub fn preview(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.clone());
        words.extend(self.args.iter().cloned());
        shell_join(&words)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    /// Turn a non-zero exit into `DockhandError::CommandFailed` carrying the captured diagnostics.
    pub fn into_result(self, cmd: &CommandLine) -> Result<CommandOutput, DockhandError> {
        if self.success() {
            Ok(self)
        } else {
            let stderr = if self.stderr.trim().is_empty() {
                self.stdout.clone()
            } else {
                self.stderr.clone()
            };
            Err(DockhandError::CommandFailed {
                command: cmd.preview(),
                code: self.code,
                stderr,
            })
        }
    }
}

pub trait CommandRunner {
    /// Read-only query; always executes, even in dry-run mode.
    fn query(&self, cmd: &CommandLine) -> Result<CommandOutput, DockhandError>;

    /// State-changing command; dry-run implementations print instead of executing.
    fn apply(&self, cmd: &CommandLine) -> Result<CommandOutput, DockhandError>;
}

/// Runs commands on the host through `ExecService`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    exec: ExecService,
    query_timeout: Duration,
    dry_run: bool,
}

impl SystemRunner {
    pub fn new(query_timeout: Duration, dry_run: bool) -> Self {
        Self {
            // Mutating commands (package installs, image pulls) may legitimately run for minutes
            exec: ExecService::new(Duration::ZERO),
            query_timeout,
            dry_run,
        }
    }

    fn execute(&self, cmd: &CommandLine, timeout: Duration) -> Result<CommandOutput, DockhandError> {
        if which::which(&cmd.program).is_err() {
            return Err(DockhandError::MissingDependency(cmd.program.clone()));
        }
        let req = ExecRequest::new(&cmd.program)
            .args(&cmd.args)
            .timeout(timeout)
            .capture_output(!cmd.stream);
        let out = self.exec.run(req)?;
        Ok(CommandOutput {
            code: out.status.code(),
            stdout: out.stdout,
            stderr: out.stderr,
        })
    }
}

impl CommandRunner for SystemRunner {
    fn query(&self, cmd: &CommandLine) -> Result<CommandOutput, DockhandError> {
        self.execute(cmd, self.query_timeout)
    }

    fn apply(&self, cmd: &CommandLine) -> Result<CommandOutput, DockhandError> {
        if self.dry_run {
            let use_err = crate::color_enabled_stderr();
            crate::log_info_stderr(use_err, &format!("dockhand: dry-run: {}", cmd.preview()));
            return Ok(CommandOutput::ok());
        }
        tracing::info!(command = %cmd.preview(), "apply");
        self.execute(cmd, Duration::ZERO)
    }
}
