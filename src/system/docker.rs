/*!
Container engine access through the `docker` CLI.

Existence checks list names with `--format {{.Name}}` and compare exactly, since
`docker network inspect` also matches ID prefixes.
*/
use super::{CommandLine, CommandRunner, ContainerEngineClient, ContainerRun, MacvlanNetwork};
use crate::errors::DockhandError;

pub struct DockerCli<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> DockerCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn names(&self, args: &[&str]) -> Result<Vec<String>, DockhandError> {
        let cmd = CommandLine::new("docker").args(args.iter().copied());
        let out = self.runner.query(&cmd)?.into_result(&cmd)?;
        Ok(parse_names(&out.stdout))
    }

    fn apply(&self, cmd: CommandLine) -> Result<(), DockhandError> {
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }
}

pub fn parse_names(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Arguments after `docker` for a macvlan network.
pub fn network_create_args(net: &MacvlanNetwork) -> Vec<String> {
    let mut args = vec![
        "network".to_string(),
        "create".to_string(),
        "-d".to_string(),
        "macvlan".to_string(),
        format!("--subnet={}", net.subnet),
        format!("--gateway={}", net.gateway),
    ];
    if let Some(range) = &net.ip_range {
        args.push(format!("--ip-range={range}"));
    }
    args.push("-o".to_string());
    args.push(format!("parent={}", net.parent));
    args.push(net.name.clone());
    args
}

/// Arguments after `docker` for a detached container.
pub fn container_run_args(run: &ContainerRun) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        run.name.clone(),
    ];
    if let Some(policy) = &run.restart {
        args.push(format!("--restart={policy}"));
    }
    for p in &run.ports {
        args.push("-p".to_string());
        args.push(p.clone());
    }
    for v in &run.volumes {
        args.push("-v".to_string());
        args.push(v.clone());
    }
    args.push(run.image.clone());
    args
}

impl ContainerEngineClient for DockerCli<'_> {
    fn network_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self
            .names(&["network", "ls", "--format", "{{.Name}}"])?
            .iter()
            .any(|n| n == name))
    }

    fn remove_network(&self, name: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("docker").args(["network", "rm", name]))
    }

    fn create_network(&self, network: &MacvlanNetwork) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("docker").args(network_create_args(network)))
    }

    fn volume_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self
            .names(&["volume", "ls", "--format", "{{.Name}}"])?
            .iter()
            .any(|n| n == name))
    }

    fn create_volume(&self, name: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("docker").args(["volume", "create", name]))
    }

    fn container_exists(&self, name: &str) -> Result<bool, DockhandError> {
        Ok(self
            .names(&["ps", "-a", "--format", "{{.Names}}"])?
            .iter()
            .any(|n| n == name))
    }

    fn remove_container(&self, name: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("docker").args(["rm", "-f", name]))
    }

    fn run_container(&self, run: &ContainerRun) -> Result<(), DockhandError> {
        // Streamed so image pull progress is visible
        self.apply(
            CommandLine::new("docker")
                .args(container_run_args(run))
                .streamed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(ip_range: Option<&str>) -> MacvlanNetwork {
        MacvlanNetwork {
            name: "vlan10_net".to_string(),
            subnet: "10.32.10.0/24".to_string(),
            gateway: "10.32.10.1".to_string(),
            ip_range: ip_range.map(str::to_string),
            parent: "enp3s0.10".to_string(),
        }
    }

    #[test]
    fn network_args_without_range() {
        assert_eq!(
            network_create_args(&net(None)).join(" "),
            "network create -d macvlan --subnet=10.32.10.0/24 --gateway=10.32.10.1 -o parent=enp3s0.10 vlan10_net"
        );
    }

    #[test]
    fn network_args_with_range() {
        let args = network_create_args(&net(Some("10.32.10.192/27")));
        assert!(args.contains(&"--ip-range=10.32.10.192/27".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("vlan10_net"));
    }

    #[test]
    fn container_args_order() {
        let run = ContainerRun {
            name: "portainer".to_string(),
            image: "portainer/portainer-ce:latest".to_string(),
            ports: vec!["9443:9443".to_string()],
            volumes: vec!["portainer_data:/data".to_string()],
            restart: Some("always".to_string()),
        };
        assert_eq!(
            container_run_args(&run).join(" "),
            "run -d --name portainer --restart=always -p 9443:9443 -v portainer_data:/data portainer/portainer-ce:latest"
        );
    }

    #[test]
    fn parse_names_skips_blanks() {
        assert_eq!(parse_names("bridge\n\nhost\n none \n"), vec!["bridge", "host", "none"]);
    }
}
