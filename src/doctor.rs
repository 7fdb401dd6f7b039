use std::path::Path;
use std::time::Duration;

use crate::config::Settings;
use crate::install::{read_os_release, OS_RELEASE_PATH};
use crate::util::exec::{ExecRequest, ExecService};
use crate::util::first_line;
use crate::{color_enabled_stderr, paint};

/// Flag that prints a version banner for `tool`.
pub fn version_flag(tool: &str) -> &'static str {
    match tool {
        "ip" => "-V",
        _ => "--version",
    }
}

fn tool_line(exec: &ExecService, tool: &str) -> String {
    let use_err = color_enabled_stderr();
    let Ok(path) = which::which(tool) else {
        return paint(use_err, "\x1b[31;1m", "(not found)");
    };
    let req = ExecRequest::new(&path)
        .arg(version_flag(tool))
        .capture_output(true);
    let version = match exec.run(req) {
        Ok(out) => {
            let text = if out.stdout.trim().is_empty() {
                out.stderr
            } else {
                out.stdout
            };
            first_line(&text).unwrap_or("(no version output)").to_string()
        }
        Err(e) => format!("(version unavailable: {e})"),
    };
    format!("{} {}", paint(use_err, "\x1b[34;1m", &path.display().to_string()), version)
}

pub fn run_doctor(settings: &Settings) {
    let use_err = color_enabled_stderr();
    eprintln!("dockhand doctor");
    eprintln!();
    eprintln!("  version: v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "  build:   {} ({}, {})",
        env!("DOCKHAND_BUILD_DATE"),
        env!("DOCKHAND_BUILD_TARGET"),
        env!("DOCKHAND_BUILD_PROFILE")
    );
    eprintln!(
        "  host:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    match read_os_release(Path::new(OS_RELEASE_PATH)) {
        Ok(os) => {
            let note = if os.is_fedora() { "" } else { " (not Fedora)" };
            eprintln!("  os:      {}{note}", os.display_name());
        }
        Err(e) => eprintln!("  os:      unknown ({e})"),
    }
    let euid = nix::unistd::geteuid();
    let root = if euid.is_root() {
        paint(use_err, "\x1b[32;1m", "yes")
    } else {
        paint(use_err, "\x1b[33;1m", "no (docker and vlan need sudo)")
    };
    eprintln!("  euid:    {} root: {root}", euid.as_raw());
    eprintln!();

    let exec = ExecService::new(Duration::from_secs(5));
    let shell = settings.launcher.shell.as_str();
    let mut tools = vec!["dnf", "systemctl", "docker", "nmcli", "ip", "sudo"];
    if !tools.contains(&shell) {
        tools.push(shell);
    }
    for tool in tools {
        eprintln!("  {:<10} {}", format!("{tool}:"), tool_line(&exec, tool));
    }
    eprintln!();

    let repo = match settings.launcher.repo_parts() {
        Ok((owner, repo)) => format!(
            "{owner}/{repo}@{}{}",
            settings.launcher.branch,
            if settings.launcher.path.is_empty() {
                String::new()
            } else {
                format!(":{}", settings.launcher.path)
            }
        ),
        Err(_) => paint(use_err, "\x1b[33m", "(not configured; set DOCKHAND_LAUNCHER_REPO)"),
    };
    eprintln!("  launcher repository: {repo}");
    eprintln!(
        "  github token:        {}",
        if settings.launcher.token.is_some() { "set" } else { "unset" }
    );
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iproute_uses_short_version_flag() {
        assert_eq!(version_flag("ip"), "-V");
        assert_eq!(version_flag("docker"), "--version");
    }
}
