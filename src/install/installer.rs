use std::path::PathBuf;

use crate::config::DockerSettings;
use crate::errors::{DockhandError, StepOutcome};
use crate::reconcile::reconcile;
use crate::report::RunReport;
use crate::system::{AccountManager, ContainerEngineClient, PackageManager, ServiceManager};
use crate::ui::{confirm, step_heading, Prompter};

use super::os_release::{read_os_release, OS_RELEASE_PATH};
use super::plan::{InstallPlan, PortainerMode};
use super::portainer::{portainer_container, ContainerResource};
use super::step::run_step;

pub const STEP_OS: &str = "os check";
pub const STEP_CONFLICTS: &str = "remove conflicting packages";
pub const STEP_REPO: &str = "docker repository";
pub const STEP_PACKAGES: &str = "docker packages";
pub const STEP_SERVICE: &str = "docker service";
pub const STEP_GROUP: &str = "docker group";
pub const STEP_VOLUME: &str = "portainer volume";
pub const STEP_PORTAINER: &str = "portainer container";

const PLUGINS_PACKAGE: &str = "dnf-plugins-core";
const DOCKER_UNIT: &str = "docker";
const DOCKER_GROUP: &str = "docker";

/// Capabilities the installer drives.
#[derive(Clone, Copy)]
pub struct InstallHost<'a> {
    pub packages: &'a dyn PackageManager,
    pub services: &'a dyn ServiceManager,
    pub docker: &'a dyn ContainerEngineClient,
    pub accounts: &'a dyn AccountManager,
}

#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub settings: DockerSettings,
    pub os_release: PathBuf,
    /// State-changing commands are only previewed; the service check is skipped.
    pub dry_run: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            settings: DockerSettings::default(),
            os_release: PathBuf::from(OS_RELEASE_PATH),
            dry_run: false,
        }
    }
}

pub struct DockerInstaller<'a> {
    host: InstallHost<'a>,
    opts: InstallOptions,
}

impl<'a> DockerInstaller<'a> {
    pub fn new(host: InstallHost<'a>, opts: InstallOptions) -> Self {
        Self { host, opts }
    }

    pub fn run(
        &self,
        plan: &InstallPlan,
        p: &mut dyn Prompter,
    ) -> Result<RunReport, DockhandError> {
        let mut report = RunReport::default();
        let settings = &self.opts.settings;

        report.push(STEP_OS, self.check_os(p)?);

        if plan.remove_conflicting {
            let outcome = run_step(p, "Removing conflicting packages", || {
                self.host.packages.remove(&settings.conflicting_packages)?;
                Ok(StepOutcome::Success)
            })?;
            report.push(STEP_CONFLICTS, outcome);
        }

        let outcome = run_step(p, "Adding the Docker CE repository", || {
            self.host.packages.install(&[PLUGINS_PACKAGE.to_string()])?;
            self.host.packages.add_repo(&settings.repo_url)?;
            Ok(StepOutcome::Success)
        })?;
        report.push(STEP_REPO, outcome);

        let outcome = run_step(p, "Installing Docker packages", || {
            self.host.packages.install(&settings.packages)?;
            Ok(StepOutcome::Success)
        })?;
        report.push(STEP_PACKAGES, outcome);

        let outcome = run_step(p, "Enabling the docker service", || {
            self.host.services.enable(DOCKER_UNIT, true)?;
            if self.opts.dry_run || self.host.services.is_active(DOCKER_UNIT)? {
                Ok(StepOutcome::Success)
            } else {
                Ok(StepOutcome::Warning(format!(
                    "{DOCKER_UNIT} was enabled but is not active; check 'systemctl status {DOCKER_UNIT}'"
                )))
            }
        })?;
        report.push(STEP_SERVICE, outcome);

        if let Some(user) = &plan.add_user_to_group {
            let outcome = run_step(p, &format!("Adding {user} to the docker group"), || {
                self.host.accounts.add_to_group(user, DOCKER_GROUP)?;
                Ok(StepOutcome::Warning(format!(
                    "{user} must log out and back in for the docker group to apply"
                )))
            })?;
            report.push(STEP_GROUP, outcome);
        }

        if let Some(run) = portainer_container(plan.portainer, settings) {
            if plan.portainer == PortainerMode::Server {
                let volume = settings.portainer_volume.clone();
                let outcome = run_step(p, &format!("Portainer volume {volume}"), || {
                    if self.host.docker.volume_exists(&volume)? {
                        return Ok(StepOutcome::Skipped(format!("volume {volume} already exists")));
                    }
                    self.host.docker.create_volume(&volume)?;
                    Ok(StepOutcome::Success)
                })?;
                report.push(STEP_VOLUME, outcome);
            }

            step_heading(&format!("Portainer {} ({})", plan.portainer.as_str(), run.image));
            let resource = ContainerResource {
                docker: self.host.docker,
                run,
            };
            report.push(STEP_PORTAINER, reconcile(&resource, p)?);
        }

        Ok(report)
    }

    fn check_os(&self, p: &mut dyn Prompter) -> Result<StepOutcome, DockhandError> {
        step_heading("Checking the operating system");
        let detected = match read_os_release(&self.opts.os_release) {
            Ok(os) if os.is_fedora() => {
                tracing::info!(os = %os.display_name(), "fedora detected");
                return Ok(StepOutcome::Success);
            }
            Ok(os) => os.display_name(),
            Err(e) => {
                tracing::warn!(error = %e, "os-release unreadable");
                "an unknown distribution".to_string()
            }
        };
        crate::ui::warn_print(&format!(
            "this installer targets Fedora; detected {detected}"
        ));
        if confirm(p, "Continue anyway?", false)? {
            Ok(StepOutcome::Warning(format!("not Fedora ({detected})")))
        } else {
            Err(DockhandError::Aborted)
        }
    }
}
