//! In-memory host implementing every capability trait.
//!
//! Each operation is appended to a log in `tool subcommand args` form (`ip link set X up`,
//! `docker network create ...`) so tests can assert on what would have run. Failures are
//! injected by log prefix with `fail_on`.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::errors::DockhandError;
use crate::system::docker::{container_run_args, network_create_args};
use crate::system::{
    AccountManager, ContainerEngineClient, ContainerRun, LinkConfigurator, LinkState, MacvlanNetwork,
    NetworkManagerClient, PackageManager, ServiceManager, VlanConnection,
};

#[derive(Debug, Clone)]
pub struct FakeLink {
    pub state: LinkState,
    pub parent: Option<String>,
    pub addresses: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeHost {
    links: RefCell<BTreeMap<String, FakeLink>>,
    up_after: RefCell<HashMap<String, u32>>,
    refuse_up: RefCell<HashSet<String>>,
    polls: RefCell<HashMap<String, u32>>,
    connections: RefCell<BTreeMap<String, VlanConnection>>,
    routes: RefCell<BTreeSet<(String, String)>>,
    networks: RefCell<BTreeMap<String, MacvlanNetwork>>,
    volumes: RefCell<BTreeSet<String>>,
    containers: RefCell<BTreeMap<String, ContainerRun>>,
    enabled_units: RefCell<BTreeSet<String>>,
    active_units: RefCell<BTreeSet<String>>,
    packages: RefCell<BTreeSet<String>>,
    repos: RefCell<Vec<String>>,
    groups: RefCell<BTreeSet<(String, String)>>,
    daemon_reloads: Cell<u32>,
    failures: RefCell<Vec<String>>,
    log: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&self, name: &str, state: LinkState) {
        self.links.borrow_mut().insert(
            name.to_string(),
            FakeLink {
                state,
                parent: None,
                addresses: Vec::new(),
            },
        );
    }

    pub fn add_connection(&self, conn: VlanConnection) {
        self.connections.borrow_mut().insert(conn.name.clone(), conn);
    }

    pub fn add_network(&self, net: MacvlanNetwork) {
        self.networks.borrow_mut().insert(net.name.clone(), net);
    }

    pub fn add_container(&self, name: &str) {
        self.containers.borrow_mut().insert(
            name.to_string(),
            ContainerRun {
                name: name.to_string(),
                ..ContainerRun::default()
            },
        );
    }

    /// The link reports UP on the `n`th state poll.
    pub fn up_after_polls(&self, name: &str, n: u32) {
        self.up_after.borrow_mut().insert(name.to_string(), n);
    }

    /// The link never comes up, not even with `ip link set up`.
    pub fn refuse_up(&self, name: &str) {
        self.refuse_up.borrow_mut().insert(name.to_string());
    }

    /// Fail every operation whose log line starts with `prefix`.
    pub fn fail_on(&self, prefix: &str) {
        self.failures.borrow_mut().push(prefix.to_string());
    }

    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn ran(&self, line: &str) -> bool {
        self.log.borrow().iter().any(|l| l == line)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.log.borrow().iter().filter(|l| l.starts_with(prefix)).count()
    }

    pub fn state_polls(&self, name: &str) -> u32 {
        self.polls.borrow().get(name).copied().unwrap_or(0)
    }

    pub fn link(&self, name: &str) -> Option<FakeLink> {
        self.links.borrow().get(name).cloned()
    }

    pub fn connection_names(&self) -> Vec<String> {
        self.connections.borrow().keys().cloned().collect()
    }

    pub fn network(&self, name: &str) -> Option<MacvlanNetwork> {
        self.networks.borrow().get(name).cloned()
    }

    pub fn network_count(&self) -> usize {
        self.networks.borrow().len()
    }

    pub fn container(&self, name: &str) -> Option<ContainerRun> {
        self.containers.borrow().get(name).cloned()
    }

    pub fn has_volume(&self, name: &str) -> bool {
        self.volumes.borrow().contains(name)
    }

    pub fn has_route(&self, destination: &str, dev: &str) -> bool {
        self.routes
            .borrow()
            .contains(&(destination.to_string(), dev.to_string()))
    }

    pub fn unit_enabled(&self, unit: &str) -> bool {
        self.enabled_units.borrow().contains(unit)
    }

    pub fn unit_active(&self, unit: &str) -> bool {
        self.active_units.borrow().contains(unit)
    }

    pub fn installed(&self, package: &str) -> bool {
        self.packages.borrow().contains(package)
    }

    pub fn repos(&self) -> Vec<String> {
        self.repos.borrow().clone()
    }

    pub fn in_group(&self, user: &str, group: &str) -> bool {
        self.groups
            .borrow()
            .contains(&(user.to_string(), group.to_string()))
    }

    pub fn daemon_reloads(&self) -> u32 {
        self.daemon_reloads.get()
    }

    fn record(&self, line: String) -> Result<(), DockhandError> {
        let failing = self
            .failures
            .borrow()
            .iter()
            .any(|p| line.starts_with(p.as_str()));
        self.log.borrow_mut().push(line.clone());
        if failing {
            Err(DockhandError::CommandFailed {
                command: line,
                code: Some(1),
                stderr: "injected failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn bring_up(&self, name: &str) {
        if self.refuse_up.borrow().contains(name) {
            return;
        }
        if let Some(l) = self.links.borrow_mut().get_mut(name) {
            l.state = LinkState::Up;
        }
    }
}

impl NetworkManagerClient for FakeHost {
    fn connection_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self.connections.borrow().contains_key(name))
    }

    fn delete_connection(&self, name: &str) -> Result<(), DockhandError> {
        self.record(format!("nmcli connection delete {name}"))?;
        if let Some(conn) = self.connections.borrow_mut().remove(name) {
            self.links.borrow_mut().remove(&conn.interface);
        }
        Ok(())
    }

    fn add_vlan_connection(&self, conn: &VlanConnection) -> Result<(), DockhandError> {
        self.record(format!(
            "nmcli connection add type vlan con-name {} ifname {} dev {} id {}",
            conn.name, conn.interface, conn.parent, conn.vlan_id
        ))?;
        self.connections
            .borrow_mut()
            .insert(conn.name.clone(), conn.clone());
        Ok(())
    }

    fn activate_connection(&self, name: &str) -> Result<(), DockhandError> {
        self.record(format!("nmcli connection up {name}"))?;
        let conn = self
            .connections
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| DockhandError::Message(format!("unknown connection {name}")))?;
        let delayed = self.up_after.borrow().contains_key(&conn.interface)
            || self.refuse_up.borrow().contains(&conn.interface);
        let mut links = self.links.borrow_mut();
        let link = links.entry(conn.interface.clone()).or_insert(FakeLink {
            state: LinkState::Down,
            parent: Some(conn.parent.clone()),
            addresses: Vec::new(),
        });
        if !delayed {
            link.state = LinkState::Up;
        }
        Ok(())
    }
}

impl LinkConfigurator for FakeHost {
    fn link_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self.links.borrow().contains_key(name))
    }

    fn link_state(&self, name: &str) -> Result<LinkState, DockhandError> {
        let polls = {
            let mut polls = self.polls.borrow_mut();
            let n = polls.entry(name.to_string()).or_insert(0);
            *n += 1;
            *n
        };
        let threshold = self.up_after.borrow().get(name).copied();
        if let Some(t) = threshold {
            if polls >= t {
                self.bring_up(name);
            }
        }
        Ok(self
            .links
            .borrow()
            .get(name)
            .map(|l| l.state)
            .unwrap_or(LinkState::Down))
    }

    fn set_link_up(&self, name: &str) -> Result<(), DockhandError> {
        self.record(format!("ip link set {name} up"))?;
        self.bring_up(name);
        Ok(())
    }

    fn add_macvlan(&self, name: &str, parent: &str) -> Result<(), DockhandError> {
        self.record(format!(
            "ip link add {name} link {parent} type macvlan mode bridge"
        ))?;
        if !self.links.borrow().contains_key(parent) {
            return Err(DockhandError::CommandFailed {
                command: format!("ip link add {name} link {parent}"),
                code: Some(1),
                stderr: format!("Cannot find device \"{parent}\""),
            });
        }
        self.links.borrow_mut().insert(
            name.to_string(),
            FakeLink {
                state: LinkState::Down,
                parent: Some(parent.to_string()),
                addresses: Vec::new(),
            },
        );
        Ok(())
    }

    fn delete_link(&self, name: &str) -> Result<(), DockhandError> {
        self.record(format!("ip link delete {name}"))?;
        self.links.borrow_mut().remove(name);
        self.routes.borrow_mut().retain(|(_, dev)| dev != name);
        Ok(())
    }

    fn add_address(&self, name: &str, cidr: &str) -> Result<(), DockhandError> {
        self.record(format!("ip addr add {cidr} dev {name}"))?;
        if let Some(l) = self.links.borrow_mut().get_mut(name) {
            l.addresses.push(cidr.to_string());
        }
        Ok(())
    }

    fn route_exists(&self, destination: &str, dev: &str) -> Result<bool, DockhandError> {
        Ok(self.has_route(destination, dev))
    }

    fn add_route(&self, destination: &str, dev: &str) -> Result<(), DockhandError> {
        self.record(format!("ip route add {destination} dev {dev}"))?;
        self.routes
            .borrow_mut()
            .insert((destination.to_string(), dev.to_string()));
        Ok(())
    }
}

impl ContainerEngineClient for FakeHost {
    fn network_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self.networks.borrow().contains_key(name))
    }

    fn remove_network(&self, name: &str) -> Result<(), DockhandError> {
        self.record(format!("docker network rm {name}"))?;
        self.networks.borrow_mut().remove(name);
        Ok(())
    }

    fn create_network(&self, network: &MacvlanNetwork) -> Result<(), DockhandError> {
        self.record(format!("docker {}", network_create_args(network).join(" ")))?;
        if self.networks.borrow().contains_key(&network.name) {
            return Err(DockhandError::CommandFailed {
                command: format!("docker network create {}", network.name),
                code: Some(1),
                stderr: format!(
                    "Error response from daemon: network with name {} already exists",
                    network.name
                ),
            });
        }
        self.networks
            .borrow_mut()
            .insert(network.name.clone(), network.clone());
        Ok(())
    }

    fn volume_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self.volumes.borrow().contains(name))
    }

    fn create_volume(&self, name: &str) -> Result<(), DockhandError> {
        self.record(format!("docker volume create {name}"))?;
        self.volumes.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn container_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self.containers.borrow().contains_key(name))
    }

    fn remove_container(&self, name: &str) -> Result<(), DockhandError> {
        self.record(format!("docker rm -f {name}"))?;
        self.containers.borrow_mut().remove(name);
        Ok(())
    }

    fn run_container(&self, run: &ContainerRun) -> Result<(), DockhandError> {
        self.record(format!("docker {}", container_run_args(run).join(" ")))?;
        self.containers
            .borrow_mut()
            .insert(run.name.clone(), run.clone());
        Ok(())
    }
}

impl ServiceManager for FakeHost {
    fn daemon_reload(&self) -> Result<(), DockhandError> {
        self.record("systemctl daemon-reload".to_string())?;
        self.daemon_reloads.set(self.daemon_reloads.get() + 1);
        Ok(())
    }

    fn enable(&self, unit: &str, now: bool) -> Result<(), DockhandError> {
        let line = if now {
            format!("systemctl enable --now {unit}")
        } else {
            format!("systemctl enable {unit}")
        };
        self.record(line)?;
        self.enabled_units.borrow_mut().insert(unit.to_string());
        if now {
            self.active_units.borrow_mut().insert(unit.to_string());
        }
        Ok(())
    }

    fn is_active(&self, unit: &str) -> Result<bool, DockhandError> {
        Ok(self.unit_active(unit))
    }
}

impl PackageManager for FakeHost {
    fn add_repo(&self, url: &str) -> Result<(), DockhandError> {
        self.record(format!("dnf config-manager --add-repo {url}"))?;
        self.repos.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn install(&self, packages: &[String]) -> Result<(), DockhandError> {
        self.record(format!("dnf -y install {}", packages.join(" ")))?;
        self.packages.borrow_mut().extend(packages.iter().cloned());
        Ok(())
    }

    fn remove(&self, packages: &[String]) -> Result<(), DockhandError> {
        self.record(format!("dnf -y remove {}", packages.join(" ")))?;
        let mut installed = self.packages.borrow_mut();
        for p in packages {
            installed.remove(p);
        }
        Ok(())
    }
}

impl AccountManager for FakeHost {
    fn add_to_group(&self, user: &str, group: &str) -> Result<(), DockhandError> {
        self.record(format!("usermod -aG {group} {user}"))?;
        self.groups
            .borrow_mut()
            .insert((user.to_string(), group.to_string()));
        Ok(())
    }
}
