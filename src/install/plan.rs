use crate::errors::DockhandError;
use crate::ui::{ask_validated, confirm, Prompter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PortainerMode {
    #[default]
    None,
    /// Portainer CE server with its web UI.
    Server,
    /// Portainer agent, managed from a server elsewhere.
    Agent,
}

impl PortainerMode {
    pub fn parse(s: &str) -> Result<PortainerMode, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "n" | "0" => Ok(PortainerMode::None),
            "server" | "s" | "1" => Ok(PortainerMode::Server),
            "agent" | "a" | "2" => Ok(PortainerMode::Agent),
            _ => Err("answer 'none', 'server' or 'agent'".to_string()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortainerMode::None => "none",
            PortainerMode::Server => "server",
            PortainerMode::Agent => "agent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub remove_conflicting: bool,
    /// Account appended to the `docker` group.
    pub add_user_to_group: Option<String>,
    pub portainer: PortainerMode,
}

/// Answers supplied up front (CLI flags).
#[derive(Debug, Clone, Default)]
pub struct InstallAnswers {
    pub remove_conflicting: Option<bool>,
    pub add_user: Option<bool>,
    pub portainer: Option<PortainerMode>,
}

/// The login behind `sudo`, else `$USER`; `None` for root or when unknown.
pub fn invoking_user<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    ["SUDO_USER", "USER"]
        .iter()
        .filter_map(|k| lookup(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .filter(|v| v != "root")
}

pub fn collect_install_plan(
    p: &mut dyn Prompter,
    given: &InstallAnswers,
    user: Option<&str>,
) -> Result<InstallPlan, DockhandError> {
    let remove_conflicting = match given.remove_conflicting {
        Some(v) => v,
        None => confirm(
            p,
            "Remove conflicting distribution Docker packages first?",
            true,
        )?,
    };
    let add_user_to_group = match user {
        Some(u) => {
            let add = match given.add_user {
                Some(v) => v,
                None => confirm(
                    p,
                    &format!("Add user '{u}' to the docker group?"),
                    true,
                )?,
            };
            add.then(|| u.to_string())
        }
        None => None,
    };
    let portainer = match given.portainer {
        Some(m) => m,
        None => ask_validated(
            p,
            "Deploy Portainer? (none/server/agent)",
            Some(PortainerMode::None.as_str()),
            PortainerMode::parse,
        )?,
    };
    Ok(InstallPlan {
        remove_conflicting,
        add_user_to_group,
        portainer,
    })
}
