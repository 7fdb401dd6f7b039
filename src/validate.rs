//! Input validators for interactive and flag-provided values.
//!
//! Each validator returns the parsed value or a short message suitable for a re-prompt.
//! Address validators check syntax only: octet ranges and host bits are not inspected.

use std::fmt;

use crate::errors::DockhandError;
use crate::system::LinkConfigurator;

pub const VLAN_ID_MIN: u16 = 1;
pub const VLAN_ID_MAX: u16 = 4094;

/// IEEE 802.1Q VLAN tag in `[1, 4094]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VlanId(u16);

impl VlanId {
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = String;

    fn try_from(v: u16) -> Result<Self, Self::Error> {
        if (VLAN_ID_MIN..=VLAN_ID_MAX).contains(&v) {
            Ok(VlanId(v))
        } else {
            Err(format!(
                "VLAN ID must be between {VLAN_ID_MIN} and {VLAN_ID_MAX}"
            ))
        }
    }
}

/// Dotted-quad address with a `/prefix`, e.g. `10.32.11.0/24`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cidr(String);

impl Cidr {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address part without the prefix.
    pub fn address(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dotted-quad address without a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ipv4Syntax(String);

impl Ipv4Syntax {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ipv4Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Docker network name matching `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkName(String);

impl NetworkName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn validate_non_empty(input: &str) -> Result<String, String> {
    let t = input.trim();
    if t.is_empty() {
        Err("value must not be empty".to_string())
    } else {
        Ok(t.to_string())
    }
}

/// Non-empty and present on the host right now.
///
/// The outer error is a failed query (missing `ip`, exec failure) and ends the run; the
/// inner one rejects the answer.
pub fn validate_interface(
    input: &str,
    links: &dyn LinkConfigurator,
) -> Result<Result<String, String>, DockhandError> {
    let name = match validate_non_empty(input) {
        Ok(n) => n,
        Err(msg) => return Ok(Err(msg)),
    };
    if let Err(msg) = crate::util::reject_newlines(&name, "interface name") {
        return Ok(Err(msg));
    }
    if links.link_exists(&name)? {
        Ok(Ok(name))
    } else {
        Ok(Err(format!("interface '{name}' does not exist")))
    }
}

pub fn validate_vlan_id(input: &str) -> Result<VlanId, String> {
    let t = input.trim();
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "VLAN ID must be a number between {VLAN_ID_MIN} and {VLAN_ID_MAX}"
        ));
    }
    // Digits only, so a parse failure means overflow
    let v: u16 = t.parse().map_err(|_| {
        format!("VLAN ID must be between {VLAN_ID_MIN} and {VLAN_ID_MAX}")
    })?;
    VlanId::try_from(v)
}

fn is_dotted_quad(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| (1..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_digit()))
}

pub fn validate_cidr(input: &str) -> Result<Cidr, String> {
    let t = input.trim();
    let err = || format!("'{t}' is not in CIDR notation (e.g. 10.32.11.0/24)");
    let (addr, prefix) = t.split_once('/').ok_or_else(err)?;
    if !is_dotted_quad(addr)
        || !(1..=2).contains(&prefix.len())
        || !prefix.chars().all(|c| c.is_ascii_digit())
    {
        return Err(err());
    }
    Ok(Cidr(t.to_string()))
}

pub fn validate_gateway(input: &str) -> Result<Ipv4Syntax, String> {
    let t = input.trim();
    if is_dotted_quad(t) {
        Ok(Ipv4Syntax(t.to_string()))
    } else {
        Err(format!("'{t}' is not an IPv4 address (e.g. 10.32.11.1)"))
    }
}

pub fn validate_network_name(input: &str) -> Result<NetworkName, String> {
    let t = input.trim();
    if !t.is_empty()
        && t
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(NetworkName(t.to_string()))
    } else {
        Err("network name may only contain letters, digits, '_' and '-'".to_string())
    }
}
