//! Docker CE + Portainer installer for Fedora hosts.
mod installer;
mod os_release;
mod plan;
mod portainer;
mod step;

pub use installer::{
    DockerInstaller, InstallHost, InstallOptions, STEP_CONFLICTS, STEP_GROUP, STEP_OS,
    STEP_PACKAGES, STEP_PORTAINER, STEP_REPO, STEP_SERVICE, STEP_VOLUME,
};
pub use os_release::{parse_os_release, read_os_release, OsRelease, OS_RELEASE_PATH};
pub use plan::{collect_install_plan, invoking_user, InstallAnswers, InstallPlan, PortainerMode};
pub use portainer::{
    portainer_container, server_url_hint, ContainerResource, AGENT_CONTAINER, SERVER_CONTAINER,
};
pub use step::{is_recoverable, run_step};
