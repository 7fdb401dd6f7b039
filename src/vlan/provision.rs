use crate::errors::{DockhandError, StepOutcome};
use crate::reconcile::{reconcile, Resource};
use crate::report::RunReport;
use crate::system::{
    ContainerEngineClient, LinkConfigurator, MacvlanNetwork, NetworkManagerClient, ServiceManager,
    VlanConnection,
};
use crate::ui::{step_heading, Prompter};

use super::activate::{wait_for_link_up, ActivationPolicy};
use super::persist::{persist_shim, PersistPaths, ShimParams};
use super::plan::VlanPlan;

/// Capabilities the provisioner drives.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub nm: &'a dyn NetworkManagerClient,
    pub links: &'a dyn LinkConfigurator,
    pub docker: &'a dyn ContainerEngineClient,
    pub services: &'a dyn ServiceManager,
}

#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    pub activation: ActivationPolicy,
    pub paths: PersistPaths,
    pub boot_wait_secs: u32,
    pub dry_run: bool,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            activation: ActivationPolicy::default(),
            paths: PersistPaths::default(),
            boot_wait_secs: 30,
            dry_run: false,
        }
    }
}

pub type ProvisionReport = RunReport;

struct VlanConnectionResource<'a> {
    nm: &'a dyn NetworkManagerClient,
    conn: VlanConnection,
}

impl Resource for VlanConnectionResource<'_> {
    fn describe(&self) -> String {
        format!("VLAN connection '{}'", self.conn.name)
    }
    fn exists(&self) -> Result<bool, DockhandError> {
        self.nm.connection_exists(&self.conn.name)
    }
    fn delete(&self) -> Result<(), DockhandError> {
        self.nm.delete_connection(&self.conn.name)
    }
    fn create(&self) -> Result<(), DockhandError> {
        self.nm.add_vlan_connection(&self.conn)
    }
}

struct ShimLinkResource<'a> {
    links: &'a dyn LinkConfigurator,
    name: String,
    parent: String,
    address: Option<String>,
}

impl Resource for ShimLinkResource<'_> {
    fn describe(&self) -> String {
        format!("shim interface '{}'", self.name)
    }
    fn exists(&self) -> Result<bool, DockhandError> {
        self.links.link_exists(&self.name)
    }
    fn delete(&self) -> Result<(), DockhandError> {
        self.links.delete_link(&self.name)
    }
    fn create(&self) -> Result<(), DockhandError> {
        self.links.add_macvlan(&self.name, &self.parent)?;
        if let Some(addr) = &self.address {
            self.links.add_address(&self.name, addr)?;
        }
        self.links.set_link_up(&self.name)
    }
}

struct DockerNetworkResource<'a> {
    docker: &'a dyn ContainerEngineClient,
    network: MacvlanNetwork,
}

impl Resource for DockerNetworkResource<'_> {
    fn describe(&self) -> String {
        format!("Docker network '{}'", self.network.name)
    }
    fn exists(&self) -> Result<bool, DockhandError> {
        self.docker.network_exists(&self.network.name)
    }
    fn delete(&self) -> Result<(), DockhandError> {
        self.docker.remove_network(&self.network.name)
    }
    fn create(&self) -> Result<(), DockhandError> {
        self.docker.create_network(&self.network)
    }
}

pub const STEP_CONNECTION: &str = "vlan connection";
pub const STEP_ACTIVATION: &str = "vlan activation";
pub const STEP_SHIM: &str = "shim interface";
pub const STEP_ROUTE: &str = "shim route";
pub const STEP_PERSIST: &str = "shim persistence";
pub const STEP_NETWORK: &str = "docker network";

/// Runs the VLAN → activation → shim → Docker network sequence.
///
/// Each step's fatal error aborts the run; earlier resources stay in place.
pub struct Provisioner<'a> {
    host: Host<'a>,
    opts: ProvisionOptions,
}

impl<'a> Provisioner<'a> {
    pub fn new(host: Host<'a>, opts: ProvisionOptions) -> Self {
        Self { host, opts }
    }

    pub fn run(
        &self,
        plan: &VlanPlan,
        prompter: &mut dyn Prompter,
    ) -> Result<ProvisionReport, DockhandError> {
        let mut report = ProvisionReport::default();

        step_heading(&format!(
            "VLAN connection {} ({} on {})",
            plan.connection_name(),
            plan.vlan_interface(),
            plan.parent
        ));
        let conn = VlanConnectionResource {
            nm: self.host.nm,
            conn: plan.vlan_connection(),
        };
        report.push(STEP_CONNECTION, reconcile(&conn, prompter)?);

        step_heading(&format!("Activating {}", plan.connection_name()));
        report.push(STEP_ACTIVATION, self.activate(plan)?);

        if plan.shim.is_some() {
            self.shim(plan, prompter, &mut report)?;
        }

        step_heading(&format!("Docker macvlan network {}", plan.network_name));
        let network = DockerNetworkResource {
            docker: self.host.docker,
            network: plan.macvlan_network(),
        };
        report.push(STEP_NETWORK, reconcile(&network, prompter)?);

        Ok(report)
    }

    fn activate(&self, plan: &VlanPlan) -> Result<StepOutcome, DockhandError> {
        let name = plan.connection_name();
        let interface = plan.vlan_interface();
        // A failed `nmcli connection up` is not final: the link may still come up, and the
        // poll loop has its own manual fallback
        let request_error = self.host.nm.activate_connection(&name).err();
        if let Some(e) = &request_error {
            tracing::warn!(connection = %name, error = %e, "activation request failed");
        }
        if self.opts.dry_run {
            return Ok(StepOutcome::Skipped("dry-run: not polling link state".to_string()));
        }
        let outcome = wait_for_link_up(self.host.links, &interface, &self.opts.activation)?;
        Ok(match (request_error, outcome) {
            (Some(e), StepOutcome::Success) => {
                StepOutcome::Warning(format!("nmcli connection up {name} failed ({e}) but {interface} is up"))
            }
            (_, outcome) => outcome,
        })
    }

    fn shim(
        &self,
        plan: &VlanPlan,
        prompter: &mut dyn Prompter,
        report: &mut ProvisionReport,
    ) -> Result<(), DockhandError> {
        let Some(params) = ShimParams::from_plan(plan, self.opts.boot_wait_secs) else {
            return Ok(());
        };

        step_heading(&format!(
            "Shim interface {} on {}",
            params.shim_name, params.shim_parent
        ));
        let shim = ShimLinkResource {
            links: self.host.links,
            name: params.shim_name.clone(),
            parent: params.shim_parent.clone(),
            address: params.address.clone(),
        };
        let outcome = reconcile(&shim, prompter)?;
        if matches!(outcome, StepOutcome::Skipped(_)) {
            // Kept links may have been left down by an earlier run
            self.host.links.set_link_up(&params.shim_name)?;
        }
        report.push(STEP_SHIM, outcome);

        let route = if self
            .host
            .links
            .route_exists(&params.route_target, &params.shim_name)?
        {
            StepOutcome::Skipped(format!(
                "route {} via {} already present",
                params.route_target, params.shim_name
            ))
        } else {
            self.host
                .links
                .add_route(&params.route_target, &params.shim_name)?;
            StepOutcome::Success
        };
        report.push(STEP_ROUTE, route);

        step_heading(&format!("Persisting {} across reboots", params.shim_name));
        report.push(
            STEP_PERSIST,
            persist_shim(&params, &self.opts.paths, self.host.services, self.opts.dry_run)?,
        );
        Ok(())
    }
}
