use super::{CommandLine, CommandRunner, PackageManager};
use crate::errors::DockhandError;

/// Fedora packages through `dnf` (dnf4 and dnf5).
pub struct Dnf<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Dnf<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl PackageManager for Dnf<'_> {
    fn add_repo(&self, url: &str) -> Result<(), DockhandError> {
        let legacy = CommandLine::new("dnf").args(["config-manager", "--add-repo", url]);
        let out = self.runner.apply(&legacy)?;
        if out.success() {
            return Ok(());
        }
        // dnf5 (Fedora 41+) replaced --add-repo with the addrepo subcommand
        tracing::debug!("dnf config-manager --add-repo failed; retrying with dnf5 syntax");
        let dnf5 = CommandLine::new("dnf").args([
            "config-manager".to_string(),
            "addrepo".to_string(),
            "--overwrite".to_string(),
            format!("--from-repofile={url}"),
        ]);
        self.runner.apply(&dnf5)?.into_result(&dnf5).map(|_| ())
    }

    fn install(&self, packages: &[String]) -> Result<(), DockhandError> {
        let cmd = CommandLine::new("dnf")
            .args(["-y", "install"])
            .args(packages.iter().cloned())
            .streamed();
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }

    fn remove(&self, packages: &[String]) -> Result<(), DockhandError> {
        let cmd = CommandLine::new("dnf")
            .args(["-y", "remove"])
            .args(packages.iter().cloned())
            .streamed();
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }
}
