//! Boot persistence for the macvlan shim: a generated script plus a oneshot systemd unit.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{DockhandError, StepOutcome};
use crate::system::ServiceManager;
use crate::util::{shell_escape, ScriptBuilder};

use super::plan::{ShimParent, VlanPlan};

/// Inputs of the generated script and unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimParams {
    pub vlan_id: u16,
    pub connection_name: String,
    pub shim_name: String,
    pub shim_parent: String,
    pub parent_is_vlan: bool,
    pub route_target: String,
    pub address: Option<String>,
    pub wait_secs: u32,
}

impl ShimParams {
    /// `None` when the plan has no shim.
    pub fn from_plan(plan: &VlanPlan, wait_secs: u32) -> Option<ShimParams> {
        let shim = plan.shim.as_ref()?;
        Some(ShimParams {
            vlan_id: plan.vlan_id.get(),
            connection_name: plan.connection_name(),
            shim_name: plan.shim_name(),
            shim_parent: plan.shim_parent_interface()?,
            parent_is_vlan: shim.parent == ShimParent::Vlan,
            route_target: plan.route_target().to_string(),
            address: shim.address.as_ref().map(ToString::to_string),
            wait_secs,
        })
    }

    pub fn unit_name(&self) -> String {
        format!("{}.service", self.shim_name)
    }

    pub fn script_name(&self) -> String {
        format!("{}.sh", self.shim_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistPaths {
    pub bin_dir: PathBuf,
    pub unit_dir: PathBuf,
}

impl Default for PersistPaths {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("/usr/local/bin"),
            unit_dir: PathBuf::from("/etc/systemd/system"),
        }
    }
}

impl PersistPaths {
    pub fn script_path(&self, params: &ShimParams) -> PathBuf {
        self.bin_dir.join(params.script_name())
    }

    pub fn unit_path(&self, params: &ShimParams) -> PathBuf {
        self.unit_dir.join(params.unit_name())
    }
}

pub fn render_shim_script(params: &ShimParams) -> io::Result<String> {
    let mut s = ScriptBuilder::new();
    s.line("#!/bin/bash")
        .line(format!(
            "# Recreates {} for VLAN {} at boot. Generated by dockhand; edits are overwritten.",
            params.shim_name, params.vlan_id
        ))
        .line("set -u")
        .blank()
        .line(format!("SHIM={}", shell_escape(&params.shim_name)))
        .line(format!("PARENT={}", shell_escape(&params.shim_parent)))
        .line(format!("ROUTE={}", shell_escape(&params.route_target)))
        .line(format!(
            "ADDRESS={}",
            shell_escape(params.address.as_deref().unwrap_or(""))
        ))
        .line(format!("WAIT_SECS={}", params.wait_secs))
        .blank()
        .open("link_is_up() {")
        .line("ip -o link show dev \"$1\" 2>/dev/null | grep -qE 'state UP|[<,]UP[,>]'")
        .close("}")
        .blank();

    if params.shim_parent.contains('.') {
        // A dotted parent is a VLAN interface that NetworkManager brings up on its own schedule
        s.line("# $PARENT is a VLAN interface; NetworkManager may still be activating it")
            .open("for i in $(seq 1 \"$WAIT_SECS\"); do")
            .open("if link_is_up \"$PARENT\"; then")
            .line("break")
            .close("fi")
            .open("if [ \"$i\" -eq $((WAIT_SECS / 2)) ]; then")
            .line(format!(
                "nmcli connection up {} >/dev/null 2>&1 || true",
                shell_escape(&params.connection_name)
            ))
            .close("fi")
            .line("sleep 1")
            .close("done");
    } else {
        s.open("for i in $(seq 1 \"$WAIT_SECS\"); do")
            .line("link_is_up \"$PARENT\" && break")
            .line("sleep 1")
            .close("done");
    }

    s.blank()
        .open("if ! link_is_up \"$PARENT\"; then")
        .line("echo \"dockhand: $PARENT is not up after ${WAIT_SECS}s; not creating $SHIM\" >&2")
        .line("exit 1")
        .close("fi")
        .blank()
        .open("if ! ip link show dev \"$SHIM\" >/dev/null 2>&1; then")
        .line("ip link add \"$SHIM\" link \"$PARENT\" type macvlan mode bridge")
        .close("fi")
        .open("if [ -n \"$ADDRESS\" ] && ! ip -o addr show dev \"$SHIM\" | grep -qF \" $ADDRESS \"; then")
        .line("ip addr add \"$ADDRESS\" dev \"$SHIM\"")
        .close("fi")
        .line("ip link set \"$SHIM\" up")
        .open("if [ -z \"$(ip route show \"$ROUTE\" dev \"$SHIM\")\" ]; then")
        .line("ip route add \"$ROUTE\" dev \"$SHIM\"")
        .close("fi");
    s.build()
}

pub fn render_shim_unit(params: &ShimParams, script_path: &Path) -> io::Result<String> {
    let ordering = if params.parent_is_vlan {
        "network-online.target NetworkManager.service"
    } else {
        "network-online.target"
    };
    let mut u = ScriptBuilder::new();
    u.line("[Unit]")
        .line(format!(
            "Description=macvlan shim {} for VLAN {} (dockhand)",
            params.shim_name, params.vlan_id
        ))
        .line(format!("After={ordering}"))
        .line(format!("Wants={ordering}"))
        .line("Before=docker.service")
        .blank()
        .line("[Service]")
        .line("Type=oneshot")
        .line(format!("ExecStart={}", script_path.display()))
        .line("RemainAfterExit=yes")
        .blank()
        .line("[Install]")
        .line("WantedBy=multi-user.target");
    u.build()
}

fn write_file(path: &Path, contents: &str, mode: u32) -> Result<(), DockhandError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).map_err(|e| {
        DockhandError::Message(format!("failed to write {}: {e}", path.display()))
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;
    Ok(())
}

/// Write script and unit, reload systemd and enable the unit.
///
/// Write failures are fatal. Reload/enable failures only warn: the shim created in this
/// session keeps working until the next reboot.
pub fn persist_shim(
    params: &ShimParams,
    paths: &PersistPaths,
    services: &dyn ServiceManager,
    dry_run: bool,
) -> Result<StepOutcome, DockhandError> {
    let script_path = paths.script_path(params);
    let unit_path = paths.unit_path(params);
    let script = render_shim_script(params)?;
    let unit = render_shim_unit(params, &script_path)?;

    if dry_run {
        let use_err = crate::color_enabled_stderr();
        crate::log_info_stderr(
            use_err,
            &format!("dockhand: dry-run: would write {}", script_path.display()),
        );
        crate::log_info_stderr(
            use_err,
            &format!("dockhand: dry-run: would write {}", unit_path.display()),
        );
    } else {
        write_file(&script_path, &script, 0o755)?;
        write_file(&unit_path, &unit, 0o644)?;
        tracing::info!(script = %script_path.display(), unit = %unit_path.display(), "wrote shim persistence files");
    }

    let unit_name = params.unit_name();
    if let Err(e) = services.daemon_reload() {
        return Ok(StepOutcome::Warning(format!(
            "systemctl daemon-reload failed ({e}); {unit_name} not enabled, {} will not survive a reboot",
            params.shim_name
        )));
    }
    if let Err(e) = services.enable(&unit_name, false) {
        return Ok(StepOutcome::Warning(format!(
            "could not enable {unit_name} ({e}); {} will not survive a reboot",
            params.shim_name
        )));
    }
    Ok(StepOutcome::Success)
}
