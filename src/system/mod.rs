#![allow(clippy::module_name_repetitions)]
//! Capability interfaces over the host's system tools, and their CLI-backed implementations.
//!
//! Decision logic (reconciliation, activation polling, persistence) only talks to these
//! traits; tests substitute in-memory fakes.

pub mod dnf;
pub mod docker;
pub mod iproute;
pub mod nmcli;
pub mod preflight;
pub mod runner;
pub mod systemctl;
pub mod usermod;

pub use dnf::Dnf;
pub use docker::DockerCli;
pub use iproute::IpRoute;
pub use nmcli::Nmcli;
pub use preflight::{require_tools, require_tools_with, INSTALL_TOOLS, VLAN_TOOLS};
pub use runner::{CommandLine, CommandOutput, CommandRunner, SystemRunner};
pub use systemctl::Systemctl;
pub use usermod::Usermod;

use crate::errors::DockhandError;

/// Operational state of a kernel link as reported by `ip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
    Unknown,
}

/// NetworkManager VLAN connection profile to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanConnection {
    pub name: String,
    pub interface: String,
    pub parent: String,
    pub vlan_id: u16,
}

/// `docker network create -d macvlan` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacvlanNetwork {
    pub name: String,
    pub subnet: String,
    pub gateway: String,
    pub ip_range: Option<String>,
    pub parent: String,
}

/// Detached container to start with `docker run -d`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerRun {
    pub name: String,
    pub image: String,
    pub ports: Vec<String>,
    pub volumes: Vec<String>,
    pub restart: Option<String>,
}

pub trait PackageManager {
    fn add_repo(&self, url: &str) -> Result<(), DockhandError>;
    fn install(&self, packages: &[String]) -> Result<(), DockhandError>;
    fn remove(&self, packages: &[String]) -> Result<(), DockhandError>;
}

pub trait ServiceManager {
    fn daemon_reload(&self) -> Result<(), DockhandError>;
    fn enable(&self, unit: &str, now: bool) -> Result<(), DockhandError>;
    fn is_active(&self, unit: &str) -> Result<bool, DockhandError>;
}

pub trait NetworkManagerClient {
    fn connection_exists(&self, name: &str) -> Result<bool, DockhandError>;
    fn delete_connection(&self, name: &str) -> Result<(), DockhandError>;
    fn add_vlan_connection(&self, conn: &VlanConnection) -> Result<(), DockhandError>;
    fn activate_connection(&self, name: &str) -> Result<(), DockhandError>;
}

pub trait LinkConfigurator {
    fn link_exists(&self, name: &str) -> Result<bool, DockhandError>;
    fn link_state(&self, name: &str) -> Result<LinkState, DockhandError>;
    fn set_link_up(&self, name: &str) -> Result<(), DockhandError>;
    /// Create a bridge-mode macvlan link on `parent`.
    fn add_macvlan(&self, name: &str, parent: &str) -> Result<(), DockhandError>;
    fn delete_link(&self, name: &str) -> Result<(), DockhandError>;
    fn add_address(&self, name: &str, cidr: &str) -> Result<(), DockhandError>;
    fn route_exists(&self, destination: &str, dev: &str) -> Result<bool, DockhandError>;
    fn add_route(&self, destination: &str, dev: &str) -> Result<(), DockhandError>;
}

pub trait ContainerEngineClient {
    fn network_exists(&self, name: &str) -> Result<bool, DockhandError>;
    fn remove_network(&self, name: &str) -> Result<(), DockhandError>;
    fn create_network(&self, network: &MacvlanNetwork) -> Result<(), DockhandError>;
    fn volume_exists(&self, name: &str) -> Result<bool, DockhandError>;
    fn create_volume(&self, name: &str) -> Result<(), DockhandError>;
    fn container_exists(&self, name: &str) -> Result<bool, DockhandError>;
    fn remove_container(&self, name: &str) -> Result<(), DockhandError>;
    fn run_container(&self, run: &ContainerRun) -> Result<(), DockhandError>;
}

pub trait AccountManager {
    /// Append `user` to the supplementary `group`.
    fn add_to_group(&self, user: &str, group: &str) -> Result<(), DockhandError>;
}
