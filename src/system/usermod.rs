use super::{AccountManager, CommandLine, CommandRunner};
use crate::errors::DockhandError;

pub struct Usermod<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Usermod<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl AccountManager for Usermod<'_> {
    fn add_to_group(&self, user: &str, group: &str) -> Result<(), DockhandError> {
        let cmd = CommandLine::new("usermod").args(["-aG", group, user]);
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }
}
