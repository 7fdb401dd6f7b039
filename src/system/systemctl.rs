use super::{CommandLine, CommandRunner, ServiceManager};
use crate::errors::DockhandError;

pub struct Systemctl<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Systemctl<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl ServiceManager for Systemctl<'_> {
    fn daemon_reload(&self) -> Result<(), DockhandError> {
        let cmd = CommandLine::new("systemctl").arg("daemon-reload");
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }

    fn enable(&self, unit: &str, now: bool) -> Result<(), DockhandError> {
        let mut cmd = CommandLine::new("systemctl").arg("enable");
        if now {
            cmd = cmd.arg("--now");
        }
        let cmd = cmd.arg(unit);
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }

    fn is_active(&self, unit: &str) -> Result<bool, DockhandError> {
        let cmd = CommandLine::new("systemctl").args(["is-active", "--quiet", unit]);
        Ok(self.runner.query(&cmd)?.success())
    }
}
