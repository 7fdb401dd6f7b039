use crate::system::{MacvlanNetwork, VlanConnection};
use crate::validate::{Cidr, Ipv4Syntax, NetworkName, VlanId};

/// Which link the shim interface is stacked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShimParent {
    /// The VLAN interface (`<parent>.<id>`).
    Vlan,
    /// The physical parent NIC.
    Physical,
}

impl ShimParent {
    pub fn parse(s: &str) -> Result<ShimParent, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vlan" | "v" => Ok(ShimParent::Vlan),
            "physical" | "phys" | "p" => Ok(ShimParent::Physical),
            _ => Err("answer 'vlan' or 'physical'".to_string()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShimParent::Vlan => "vlan",
            ShimParent::Physical => "physical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimPlan {
    pub parent: ShimParent,
    /// Host address on the shim, e.g. `10.32.11.250/32`.
    pub address: Option<Cidr>,
}

/// Everything the provisioner needs, decided up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanPlan {
    pub parent: String,
    pub vlan_id: VlanId,
    pub subnet: Cidr,
    pub gateway: Ipv4Syntax,
    pub network_name: NetworkName,
    pub ip_range: Option<Cidr>,
    pub shim: Option<ShimPlan>,
}

impl VlanPlan {
    pub fn connection_name(&self) -> String {
        format!("vlan{}", self.vlan_id)
    }

    pub fn vlan_interface(&self) -> String {
        format!("{}.{}", self.parent, self.vlan_id)
    }

    pub fn shim_name(&self) -> String {
        format!("macvlan{}-shim", self.vlan_id)
    }

    /// Link the shim sits on, when a shim is planned.
    pub fn shim_parent_interface(&self) -> Option<String> {
        self.shim.as_ref().map(|s| match s.parent {
            ShimParent::Vlan => self.vlan_interface(),
            ShimParent::Physical => self.parent.clone(),
        })
    }

    /// Destination routed through the shim: the container IP range when set, else the subnet.
    pub fn route_target(&self) -> &Cidr {
        self.ip_range.as_ref().unwrap_or(&self.subnet)
    }

    pub fn vlan_connection(&self) -> VlanConnection {
        VlanConnection {
            name: self.connection_name(),
            interface: self.vlan_interface(),
            parent: self.parent.clone(),
            vlan_id: self.vlan_id.get(),
        }
    }

    pub fn macvlan_network(&self) -> MacvlanNetwork {
        MacvlanNetwork {
            name: self.network_name.to_string(),
            subnet: self.subnet.to_string(),
            gateway: self.gateway.to_string(),
            ip_range: self.ip_range.as_ref().map(ToString::to_string),
            parent: self.vlan_interface(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::validate::{validate_cidr, validate_gateway, validate_network_name, validate_vlan_id};

    pub(crate) fn plan(shim: Option<ShimParent>) -> VlanPlan {
        VlanPlan {
            parent: "enp3s0".to_string(),
            vlan_id: validate_vlan_id("10").unwrap(),
            subnet: validate_cidr("10.32.10.0/24").unwrap(),
            gateway: validate_gateway("10.32.10.1").unwrap(),
            network_name: validate_network_name("vlan10_net").unwrap(),
            ip_range: None,
            shim: shim.map(|parent| ShimPlan {
                parent,
                address: None,
            }),
        }
    }
}
