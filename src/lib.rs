//! dockhand: Fedora host provisioning for Docker, Portainer and VLAN-backed macvlan networks.
//!
//! Architecture
//! - Binary glue (src/main.rs, src/commands) loads settings, checks privileges, takes the run
//!   lock and wires CLI-backed capabilities into the flows below.
//! - install::*: Docker CE repository/packages/service, docker group, Portainer server/agent.
//! - vlan::*: NetworkManager VLAN connection, activation polling, macvlan shim with boot
//!   persistence, Docker macvlan network.
//! - launcher::*: GitHub contents listing, script menu, download and privileged execution.
//! - system::*: capability traits (dnf, systemctl, nmcli, ip, docker, usermod) and their CLI
//!   implementations over one `CommandRunner` seam; testing::FakeHost is the in-memory twin.
//! - reconcile.rs: the single "exists? keep or recreate" routine for named resources.
//!
//! Environment
//! - DOCKHAND_CONFIG: config file; DOCKHAND_LAUNCHER_* / GITHUB_TOKEN: launcher source.
//! - DOCKHAND_LOG / RUST_LOG: diagnostic filter; DOCKHAND_COLOR / NO_COLOR: color control.
//! - DOCKHAND_LOCK_FILE: run lock path override.

mod color;
pub mod config;
pub mod doctor;
pub mod errors;
pub mod install;
pub mod launcher;
pub mod lock;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod system;
#[doc(hidden)]
pub mod testing;
pub mod ui;
pub mod util;
pub mod validate;
pub mod vlan;

pub use color::*;
pub use config::{default_config_path, Settings};
pub use doctor::run_doctor;
pub use errors::{exit_code_for, DockhandError, StepOutcome};
pub use install::{
    collect_install_plan, invoking_user, server_url_hint, DockerInstaller, InstallAnswers,
    InstallHost, InstallOptions, InstallPlan, PortainerMode,
};
pub use launcher::{
    GithubSource, LaunchOptions, LaunchOutcome, Launcher, LauncherState, ScriptExecutor,
    ScriptSource, ShellExecutor,
};
pub use lock::{acquire_lock, acquire_lock_at, RunLock};
pub use logging::logging_init;
pub use reconcile::{reconcile, Resource};
pub use report::{RunReport, StepReport};
pub use system::{
    require_tools, CommandLine, CommandOutput, CommandRunner, DockerCli, Dnf, IpRoute, Nmcli,
    SystemRunner, Systemctl, Usermod, INSTALL_TOOLS, VLAN_TOOLS,
};
pub use ui::{
    ask_checked, ask_optional, ask_validated, choose_index, confirm, warn_print, DefaultsPrompter, Prompter,
    ScriptedPrompter, TerminalPrompter,
};
pub use validate::{
    validate_cidr, validate_gateway, validate_interface, validate_network_name,
    validate_non_empty, validate_vlan_id,
};
pub use vlan::{
    collect_plan, describe_plan, ActivationPolicy, Host, PersistPaths, ProvisionOptions,
    ProvisionReport, Provisioner, ShimParent, VlanAnswers, VlanPlan,
};
