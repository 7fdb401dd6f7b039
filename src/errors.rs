//! Error mapping guide:
//! - Every fatal path surfaces as a `DockhandError`; `main` prints it and exits with
//!   `exit_code_for(&e)`.
//! - Recoverable problems are not errors: steps return `StepOutcome::Warning` instead.
//! - Internal plumbing (exec, HTTP) uses anyhow; convert at the capability boundary.
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum DockhandError {
    /// A required tool is not on PATH.
    MissingDependency(String),
    InvalidInput(String),
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    Http {
        status: u16,
        url: String,
    },
    /// The user declined to continue, or input ended while a value was still required.
    Aborted,
    NotRoot,
    Config(String),
    Io(io::Error),
    Exec(anyhow::Error),
    Message(String),
}

impl fmt::Display for DockhandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockhandError::MissingDependency(tool) => {
                write!(f, "required tool '{tool}' not found in PATH")
            }
            DockhandError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            DockhandError::CommandFailed {
                command,
                code,
                stderr,
            } => {
                match code {
                    Some(c) => write!(f, "command failed (exit code {c}): {command}")?,
                    None => write!(f, "command terminated by signal: {command}")?,
                }
                let diag = stderr.trim();
                if !diag.is_empty() {
                    write!(f, "\n{diag}")?;
                }
                Ok(())
            }
            DockhandError::Http { status, url } => {
                write!(f, "request to {url} failed with HTTP status {status}")
            }
            DockhandError::Aborted => write!(f, "aborted."),
            DockhandError::NotRoot => {
                write!(f, "this command must be run as root (try: sudo dockhand ...)")
            }
            DockhandError::Config(msg) => write!(f, "configuration error: {msg}"),
            DockhandError::Io(e) => write!(f, "{e}"),
            DockhandError::Exec(e) => write!(f, "{e:#}"),
            DockhandError::Message(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for DockhandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DockhandError::Io(e) => Some(e),
            DockhandError::Exec(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for DockhandError {
    fn from(e: io::Error) -> Self {
        DockhandError::Io(e)
    }
}

impl From<anyhow::Error> for DockhandError {
    fn from(e: anyhow::Error) -> Self {
        DockhandError::Exec(e)
    }
}

/// Map an error to a process exit code. Every fatal path exits 1 today.
pub fn exit_code_for(_e: &DockhandError) -> u8 {
    1
}

/// Result of a step that did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    /// The step had nothing to do (resource kept, user declined an optional action).
    Skipped(String),
    /// The step completed but something non-fatal went wrong.
    Warning(String),
}

impl StepOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, StepOutcome::Warning(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepOutcome::Success => "ok",
            StepOutcome::Skipped(_) => "skipped",
            StepOutcome::Warning(_) => "warning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display_includes_code_and_diagnostics() {
        let e = DockhandError::CommandFailed {
            command: "docker network create x".to_string(),
            code: Some(1),
            stderr: "Error response from daemon: network with name x already exists\n".to_string(),
        };
        let s = e.to_string();
        assert!(s.contains("exit code 1"), "{s}");
        assert!(s.contains("docker network create x"), "{s}");
        assert!(s.ends_with("already exists"), "{s}");
    }

    #[test]
    fn http_display_surfaces_status() {
        let e = DockhandError::Http {
            status: 404,
            url: "https://api.github.com/repos/a/b/contents/".to_string(),
        };
        assert!(e.to_string().contains("404"));
        assert_eq!(exit_code_for(&e), 1);
    }
}
