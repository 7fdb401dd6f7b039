//! Interactive adapter: turn flags, config defaults and prompts into a `VlanPlan`.
//!
//! Precedence per field: a flag value is used as the answer (re-asked only when invalid and
//! interactive); a config value becomes the prompt default.

use crate::config::VlanSettings;
use crate::errors::DockhandError;
use crate::system::LinkConfigurator;
use crate::ui::{ask_checked, ask_optional, confirm, Prompter};
use crate::validate::{
    validate_cidr, validate_gateway, validate_interface, validate_network_name, validate_vlan_id,
};

use super::plan::{ShimParent, ShimPlan, VlanPlan};

/// Answers supplied up front (CLI flags).
#[derive(Debug, Clone, Default)]
pub struct VlanAnswers {
    pub parent: Option<String>,
    pub vlan_id: Option<String>,
    pub subnet: Option<String>,
    pub gateway: Option<String>,
    pub network_name: Option<String>,
    pub ip_range: Option<String>,
    pub shim: Option<bool>,
    pub shim_parent: Option<ShimParent>,
    pub shim_address: Option<String>,
}

fn field<T, F>(
    p: &mut dyn Prompter,
    question: &str,
    given: Option<&str>,
    default: Option<&str>,
    validate: F,
) -> Result<T, DockhandError>
where
    F: Fn(&str) -> Result<T, String>,
{
    checked_field(p, question, given, default, |s| Ok(validate(s)))
}

/// `field` for validators that query the host; query failures are returned, not re-asked.
fn checked_field<T, F>(
    p: &mut dyn Prompter,
    question: &str,
    given: Option<&str>,
    default: Option<&str>,
    check: F,
) -> Result<T, DockhandError>
where
    F: Fn(&str) -> Result<Result<T, String>, DockhandError>,
{
    if let Some(v) = given {
        match check(v)? {
            Ok(t) => return Ok(t),
            Err(msg) if !p.interactive() => {
                return Err(DockhandError::InvalidInput(format!("{question}: {msg}")))
            }
            Err(msg) => p.say(&format!("  {msg}")),
        }
    }
    ask_checked(p, question, default, check)
}

fn optional_field<T, F>(
    p: &mut dyn Prompter,
    question: &str,
    given: Option<&str>,
    validate: F,
) -> Result<Option<T>, DockhandError>
where
    F: Fn(&str) -> Result<T, String>,
{
    if let Some(v) = given {
        match validate(v) {
            Ok(t) => return Ok(Some(t)),
            Err(msg) if !p.interactive() => {
                return Err(DockhandError::InvalidInput(format!("{question}: {msg}")))
            }
            Err(msg) => p.say(&format!("  {msg}")),
        }
    }
    ask_optional(p, question, validate)
}

pub fn collect_plan(
    p: &mut dyn Prompter,
    links: &dyn LinkConfigurator,
    given: &VlanAnswers,
    defaults: &VlanSettings,
) -> Result<VlanPlan, DockhandError> {
    let parent = checked_field(
        p,
        "Parent network interface (e.g. enp3s0)",
        given.parent.as_deref(),
        defaults.parent.as_deref(),
        |s| validate_interface(s, links),
    )?;
    let default_id = defaults.vlan_id.map(|v| v.to_string());
    let vlan_id = field(
        p,
        "VLAN ID (1-4094)",
        given.vlan_id.as_deref(),
        default_id.as_deref(),
        validate_vlan_id,
    )?;
    let subnet = field(
        p,
        "Subnet (CIDR, e.g. 10.32.11.0/24)",
        given.subnet.as_deref(),
        defaults.subnet.as_deref(),
        validate_cidr,
    )?;
    let gateway = field(
        p,
        "Gateway (e.g. 10.32.11.1)",
        given.gateway.as_deref(),
        defaults.gateway.as_deref(),
        validate_gateway,
    )?;
    let default_name = defaults
        .network_name
        .clone()
        .unwrap_or_else(|| format!("vlan{vlan_id}_net"));
    let network_name = field(
        p,
        "Docker network name",
        given.network_name.as_deref(),
        Some(default_name.as_str()),
        validate_network_name,
    )?;
    let ip_range = optional_field(
        p,
        "Container IP range (CIDR, empty for the whole subnet)",
        given.ip_range.as_deref().or(defaults.ip_range.as_deref()),
        validate_cidr,
    )?;

    let want_shim = match given.shim.or(defaults.shim) {
        Some(v) => v,
        None => confirm(
            p,
            "Create a macvlan shim so this host can reach the containers?",
            false,
        )?,
    };
    let shim = if want_shim {
        let given_parent = given.shim_parent.map(|sp| sp.as_str().to_string());
        let parent_kind = field(
            p,
            "Attach the shim to the VLAN interface or the physical interface? (vlan/physical)",
            given_parent.as_deref(),
            Some(defaults.shim_parent.as_deref().unwrap_or("vlan")),
            ShimParent::parse,
        )?;
        let address = optional_field(
            p,
            "Host address for the shim (CIDR, e.g. 10.32.11.250/32; empty for none)",
            given.shim_address.as_deref().or(defaults.shim_address.as_deref()),
            validate_cidr,
        )?;
        Some(ShimPlan {
            parent: parent_kind,
            address,
        })
    } else {
        None
    };

    Ok(VlanPlan {
        parent,
        vlan_id,
        subnet,
        gateway,
        network_name,
        ip_range,
        shim,
    })
}

/// Multi-line summary shown before the user confirms.
pub fn describe_plan(plan: &VlanPlan) -> Vec<String> {
    let mut lines = vec![
        format!("  parent interface: {}", plan.parent),
        format!("  VLAN ID:          {}", plan.vlan_id),
        format!("  VLAN connection:  {} ({})", plan.connection_name(), plan.vlan_interface()),
        format!("  subnet:           {}", plan.subnet),
        format!("  gateway:          {}", plan.gateway),
        format!(
            "  IP range:         {}",
            plan.ip_range
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "(whole subnet)".to_string())
        ),
        format!("  Docker network:   {}", plan.network_name),
    ];
    match (&plan.shim, plan.shim_parent_interface()) {
        (Some(shim), Some(on)) => {
            lines.push(format!("  shim:             {} on {}", plan.shim_name(), on));
            if let Some(addr) = &shim.address {
                lines.push(format!("  shim address:     {addr}"));
            }
            lines.push(format!("  shim route:       {}", plan.route_target()));
        }
        _ => lines.push("  shim:             (none)".to_string()),
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::LinkState;
    use crate::testing::FakeHost;
    use crate::ui::{DefaultsPrompter, ScriptedPrompter};

    fn host() -> FakeHost {
        let h = FakeHost::new();
        h.add_link("enp3s0", LinkState::Up);
        h
    }

    #[test]
    fn interactive_collection_reprompts_bad_values() {
        let links = host();
        let mut p = ScriptedPrompter::new([
            "eth9",          // missing interface
            "enp3s0",
            "5000",          // out of range
            "10",
            "10.32.10/24",   // malformed
            "10.32.10.0/24",
            "10.32.10.1",
            "",              // default network name
            "",              // no ip range
            "y",             // shim
            "",              // default: vlan
            "10.32.10.250/32",
        ]);
        let plan = collect_plan(&mut p, &links, &VlanAnswers::default(), &VlanSettings::default()).unwrap();
        assert_eq!(p.remaining(), 0);
        assert_eq!(p.messages.len(), 3);
        assert_eq!(plan.parent, "enp3s0");
        assert_eq!(plan.vlan_id.get(), 10);
        assert_eq!(plan.network_name.as_str(), "vlan10_net");
        assert!(plan.ip_range.is_none());
        let shim = plan.shim.expect("shim");
        assert_eq!(shim.parent, ShimParent::Vlan);
        assert_eq!(shim.address.map(|a| a.to_string()), Some("10.32.10.250/32".to_string()));
    }

    #[test]
    fn flags_skip_prompts() {
        let links = host();
        let given = VlanAnswers {
            parent: Some("enp3s0".to_string()),
            vlan_id: Some("20".to_string()),
            subnet: Some("10.0.20.0/24".to_string()),
            gateway: Some("10.0.20.1".to_string()),
            network_name: Some("iot".to_string()),
            ip_range: Some("10.0.20.128/25".to_string()),
            shim: Some(false),
            ..VlanAnswers::default()
        };
        let mut p = ScriptedPrompter::new(Vec::<String>::new());
        let plan = collect_plan(&mut p, &links, &given, &VlanSettings::default()).unwrap();
        assert!(p.questions.is_empty(), "{:?}", p.questions);
        assert_eq!(plan.network_name.as_str(), "iot");
        assert!(plan.shim.is_none());
    }

    #[test]
    fn non_interactive_rejects_invalid_flag() {
        let links = host();
        let given = VlanAnswers {
            parent: Some("enp3s0".to_string()),
            vlan_id: Some("0".to_string()),
            ..VlanAnswers::default()
        };
        let err = collect_plan(&mut DefaultsPrompter, &links, &given, &VlanSettings::default()).unwrap_err();
        assert!(matches!(err, DockhandError::InvalidInput(_)), "{err:?}");
    }

    #[test]
    fn non_interactive_uses_config_defaults() {
        let links = host();
        let defaults = VlanSettings {
            parent: Some("enp3s0".to_string()),
            vlan_id: Some(30),
            subnet: Some("10.0.30.0/24".to_string()),
            gateway: Some("10.0.30.1".to_string()),
            ..VlanSettings::default()
        };
        let plan = collect_plan(&mut DefaultsPrompter, &links, &VlanAnswers::default(), &defaults).unwrap();
        assert_eq!(plan.vlan_id.get(), 30);
        assert_eq!(plan.network_name.as_str(), "vlan30_net");
        assert!(plan.shim.is_none());
    }

    struct NoIpTool;

    impl LinkConfigurator for NoIpTool {
        fn link_exists(&self, _name: &str) -> Result<bool, DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
        fn link_state(&self, _name: &str) -> Result<LinkState, DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
        fn set_link_up(&self, _name: &str) -> Result<(), DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
        fn add_macvlan(&self, _name: &str, _parent: &str) -> Result<(), DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
        fn delete_link(&self, _name: &str) -> Result<(), DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
        fn add_address(&self, _name: &str, _cidr: &str) -> Result<(), DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
        fn route_exists(&self, _destination: &str, _dev: &str) -> Result<bool, DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
        fn add_route(&self, _destination: &str, _dev: &str) -> Result<(), DockhandError> {
            Err(DockhandError::MissingDependency("ip".to_string()))
        }
    }

    #[test]
    fn missing_ip_tool_ends_collection_instead_of_reprompting() {
        let mut p = ScriptedPrompter::new(["enp3s0", "enp3s0", "enp3s0"]);
        let err = collect_plan(&mut p, &NoIpTool, &VlanAnswers::default(), &VlanSettings::default())
            .unwrap_err();
        assert!(matches!(err, DockhandError::MissingDependency(ref t) if t == "ip"), "{err:?}");
        assert_eq!(p.questions.len(), 1, "{:?}", p.questions);
        assert!(p.messages.is_empty(), "{:?}", p.messages);
    }

    #[test]
    fn missing_ip_tool_is_fatal_for_flag_values_too() {
        let given = VlanAnswers {
            parent: Some("enp3s0".to_string()),
            ..VlanAnswers::default()
        };
        let err = collect_plan(&mut DefaultsPrompter, &NoIpTool, &given, &VlanSettings::default())
            .unwrap_err();
        assert!(matches!(err, DockhandError::MissingDependency(_)), "{err:?}");
    }

    #[test]
    fn summary_mentions_shim_route() {
        let links = host();
        let given = VlanAnswers {
            parent: Some("enp3s0".to_string()),
            vlan_id: Some("10".to_string()),
            subnet: Some("10.32.10.0/24".to_string()),
            gateway: Some("10.32.10.1".to_string()),
            network_name: Some("n".to_string()),
            shim: Some(true),
            shim_parent: Some(ShimParent::Physical),
            ..VlanAnswers::default()
        };
        let mut p = ScriptedPrompter::new([""]);
        let plan = collect_plan(&mut p, &links, &given, &VlanSettings::default()).unwrap();
        let text = describe_plan(&plan).join("\n");
        assert!(text.contains("macvlan10-shim on enp3s0"), "{text}");
        assert!(text.contains("shim route:       10.32.10.0/24"), "{text}");
    }
}
