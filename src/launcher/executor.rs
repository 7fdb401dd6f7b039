use std::io::Write;

use anyhow::Context;

use crate::errors::DockhandError;
use crate::system::{CommandLine, CommandRunner};

use super::source::RemoteScript;

pub trait ScriptExecutor {
    /// Run a downloaded script; `Ok(code)` is the child's exit code.
    fn execute(&self, script: &RemoteScript, body: &[u8]) -> Result<i32, DockhandError>;
}

/// Writes the script to a private temp file and runs `[sudo] <shell> <file>` on the terminal,
/// so the script can prompt the user itself.
pub struct ShellExecutor<'a> {
    runner: &'a dyn CommandRunner,
    shell: String,
    use_sudo: bool,
}

impl<'a> ShellExecutor<'a> {
    pub fn new(runner: &'a dyn CommandRunner, shell: impl Into<String>, use_sudo: bool) -> Self {
        Self {
            runner,
            shell: shell.into(),
            use_sudo,
        }
    }

    pub fn command_for(&self, file: &str) -> CommandLine {
        let cmd = if self.use_sudo {
            CommandLine::new("sudo").arg(&self.shell)
        } else {
            CommandLine::new(&self.shell)
        };
        cmd.arg(file).streamed()
    }
}

impl ScriptExecutor for ShellExecutor<'_> {
    fn execute(&self, script: &RemoteScript, body: &[u8]) -> Result<i32, DockhandError> {
        let mut file = tempfile::Builder::new()
            .prefix("dockhand-")
            .suffix(&format!("-{}", script.name))
            .tempfile()
            .context("failed to create a temporary file for the script")?;
        file.write_all(body)
            .and_then(|_| file.flush())
            .context("failed to write the downloaded script")?;
        let path = file.path().to_string_lossy().into_owned();
        let cmd = self.command_for(&path);
        let out = self.runner.apply(&cmd)?;
        // Signal deaths carry no code
        Ok(out.code.unwrap_or(128))
    }
}
