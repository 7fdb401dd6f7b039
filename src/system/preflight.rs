//! Up-front PATH checks so a run fails before the first prompt instead of halfway through.

use crate::errors::DockhandError;

/// Tools the VLAN provisioner shells out to.
pub const VLAN_TOOLS: &[&str] = &["nmcli", "ip", "docker", "systemctl"];

/// Tools the Docker installer needs before Docker itself exists.
pub const INSTALL_TOOLS: &[&str] = &["dnf", "systemctl"];

/// First tool in `tools` for which `present` is false becomes the error.
pub fn require_tools_with<F>(tools: &[&str], present: F) -> Result<(), DockhandError>
where
    F: Fn(&str) -> bool,
{
    match tools.iter().find(|t| !present(t)) {
        Some(missing) => Err(DockhandError::MissingDependency((*missing).to_string())),
        None => Ok(()),
    }
}

/// `require_tools_with` against the real PATH.
pub fn require_tools(tools: &[&str]) -> Result<(), DockhandError> {
    require_tools_with(tools, |t| which::which(t).is_ok())
}
