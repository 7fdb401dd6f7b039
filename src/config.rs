#![allow(clippy::module_name_repetitions)]
//! Layered settings: built-in defaults, then a YAML file, then `DOCKHAND_*` environment.
//!
//! CLI flags are applied last by the command handlers.
//!
//! File lookup order: `--config <file>`, `$DOCKHAND_CONFIG`, `~/.config/dockhand/config.yaml`
//! (only when present). An explicitly named file that cannot be read is an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::DockhandError;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub launcher: LauncherSettings,
    pub docker: DockerSettings,
    pub vlan: VlanSettings,
    pub exec: ExecSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherSettings {
    /// `owner/repo` on GitHub. No built-in default.
    pub repo: Option<String>,
    pub branch: String,
    /// Directory inside the repository; empty for the root.
    pub path: String,
    /// The launcher's own script name, hidden from the menu.
    pub self_name: String,
    pub shell: String,
    pub api_base: String,
    pub token: Option<String>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            repo: None,
            branch: "main".to_string(),
            path: String::new(),
            self_name: "setup.sh".to_string(),
            shell: "bash".to_string(),
            api_base: "https://api.github.com".to_string(),
            token: None,
        }
    }
}

impl LauncherSettings {
    pub fn repo_parts(&self) -> Result<(String, String), DockhandError> {
        let raw = self.repo.as_deref().map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return Err(DockhandError::Config(
                "launcher repository not configured; set DOCKHAND_LAUNCHER_REPO=owner/repo or launcher.repo in the config file".to_string(),
            ));
        }
        match raw.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok((owner.to_string(), repo.to_string()))
            }
            _ => Err(DockhandError::Config(format!(
                "launcher repository '{raw}' must have the form owner/repo"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DockerSettings {
    pub repo_url: String,
    pub packages: Vec<String>,
    pub conflicting_packages: Vec<String>,
    pub portainer_image: String,
    pub agent_image: String,
    pub portainer_volume: String,
}

impl Default for DockerSettings {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            repo_url: "https://download.docker.com/linux/fedora/docker-ce.repo".to_string(),
            packages: owned(&[
                "docker-ce",
                "docker-ce-cli",
                "containerd.io",
                "docker-buildx-plugin",
                "docker-compose-plugin",
            ]),
            conflicting_packages: owned(&[
                "docker",
                "docker-client",
                "docker-client-latest",
                "docker-common",
                "docker-latest",
                "docker-latest-logrotate",
                "docker-logrotate",
                "docker-selinux",
                "docker-engine-selinux",
                "docker-engine",
            ]),
            portainer_image: "portainer/portainer-ce:latest".to_string(),
            agent_image: "portainer/agent:latest".to_string(),
            portainer_volume: "portainer_data".to_string(),
        }
    }
}

/// Prompt defaults and tuning for the VLAN provisioner.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VlanSettings {
    pub parent: Option<String>,
    pub vlan_id: Option<u16>,
    pub subnet: Option<String>,
    pub gateway: Option<String>,
    pub network_name: Option<String>,
    pub ip_range: Option<String>,
    pub shim: Option<bool>,
    /// `vlan` or `physical`.
    pub shim_parent: Option<String>,
    pub shim_address: Option<String>,
    pub activation_attempts: u32,
    pub poll_interval: String,
    /// Seconds the boot script waits for the shim parent.
    pub boot_wait_secs: u32,
    pub bin_dir: PathBuf,
    pub unit_dir: PathBuf,
}

impl Default for VlanSettings {
    fn default() -> Self {
        Self {
            parent: None,
            vlan_id: None,
            subnet: None,
            gateway: None,
            network_name: None,
            ip_range: None,
            shim: None,
            shim_parent: None,
            shim_address: None,
            activation_attempts: 10,
            poll_interval: "1s".to_string(),
            boot_wait_secs: 30,
            bin_dir: PathBuf::from("/usr/local/bin"),
            unit_dir: PathBuf::from("/etc/systemd/system"),
        }
    }
}

impl VlanSettings {
    pub fn poll_interval(&self) -> Result<Duration, DockhandError> {
        parse_duration_field("vlan.poll_interval", &self.poll_interval)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExecSettings {
    /// Timeout for read-only queries (`nmcli ... show`, `docker network ls`).
    pub query_timeout: String,
}

impl Default for ExecSettings {
    fn default() -> Self {
        Self {
            query_timeout: "30s".to_string(),
        }
    }
}

impl ExecSettings {
    pub fn query_timeout(&self) -> Result<Duration, DockhandError> {
        parse_duration_field("exec.query_timeout", &self.query_timeout)
    }
}

fn parse_duration_field(field: &str, value: &str) -> Result<Duration, DockhandError> {
    humantime::parse_duration(value.trim())
        .map_err(|e| DockhandError::Config(format!("{field}: invalid duration '{value}': {e}")))
}

pub fn default_config_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".config").join("dockhand").join("config.yaml"))
}

impl Settings {
    pub fn from_yaml(text: &str) -> Result<Settings, DockhandError> {
        if text.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(text).map_err(|e| DockhandError::Config(e.to_string()))
    }

    /// Resolve the file layer (see module docs) and apply the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Settings, DockhandError> {
        let env_path = std::env::var("DOCKHAND_CONFIG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let named = explicit.map(Path::to_path_buf).or(env_path);

        let mut settings = match named {
            Some(path) => {
                let text = fs::read_to_string(&path).map_err(|e| {
                    DockhandError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_yaml(&text)
                    .map_err(|e| DockhandError::Config(format!("{}: {e}", path.display())))?
            }
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading config");
                    let text = fs::read_to_string(&path)?;
                    Self::from_yaml(&text)
                        .map_err(|e| DockhandError::Config(format!("{}: {e}", path.display())))?
                }
                None => Settings::default(),
            },
        };
        settings.apply_env(|k| std::env::var(k).ok())?;
        Ok(settings)
    }

    /// Overlay environment values; `lookup` is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), DockhandError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("DOCKHAND_LAUNCHER_REPO") {
            self.launcher.repo = Some(v);
        }
        if let Some(v) = get("DOCKHAND_LAUNCHER_BRANCH") {
            self.launcher.branch = v;
        }
        if let Some(v) = get("DOCKHAND_LAUNCHER_PATH") {
            self.launcher.path = v;
        }
        if let Some(v) = get("DOCKHAND_LAUNCHER_SHELL") {
            self.launcher.shell = v;
        }
        if let Some(v) = get("DOCKHAND_GITHUB_API") {
            self.launcher.api_base = v;
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.launcher.token = Some(v);
        }
        if let Some(v) = get("DOCKHAND_ACTIVATION_ATTEMPTS") {
            self.vlan.activation_attempts = v.parse().map_err(|_| {
                DockhandError::Config(format!("DOCKHAND_ACTIVATION_ATTEMPTS: not a number: {v}"))
            })?;
        }
        if let Some(v) = get("DOCKHAND_EXEC_TIMEOUT") {
            parse_duration_field("DOCKHAND_EXEC_TIMEOUT", &v)?;
            self.exec.query_timeout = v;
        }
        Ok(())
    }
}
