//! Portainer server/agent container definitions.
use crate::config::DockerSettings;
use crate::errors::DockhandError;
use crate::reconcile::Resource;
use crate::system::{ContainerEngineClient, ContainerRun};

use super::plan::PortainerMode;

pub const SERVER_CONTAINER: &str = "portainer";
pub const AGENT_CONTAINER: &str = "portainer_agent";
pub const DOCKER_SOCKET: &str = "/var/run/docker.sock";
pub const SERVER_HTTPS_PORT: u16 = 9443;

/// Container to run for `mode`; `None` when Portainer is not wanted.
pub fn portainer_container(mode: PortainerMode, settings: &DockerSettings) -> Option<ContainerRun> {
    let socket = format!("{DOCKER_SOCKET}:{DOCKER_SOCKET}");
    match mode {
        PortainerMode::None => None,
        PortainerMode::Server => Some(ContainerRun {
            name: SERVER_CONTAINER.to_string(),
            image: settings.portainer_image.clone(),
            ports: vec![
                "8000:8000".to_string(),
                format!("{SERVER_HTTPS_PORT}:{SERVER_HTTPS_PORT}"),
            ],
            volumes: vec![socket, format!("{}:/data", settings.portainer_volume)],
            restart: Some("always".to_string()),
        }),
        PortainerMode::Agent => Some(ContainerRun {
            name: AGENT_CONTAINER.to_string(),
            image: settings.agent_image.clone(),
            ports: vec!["9001:9001".to_string()],
            volumes: vec![
                socket,
                "/var/lib/docker/volumes:/var/lib/docker/volumes".to_string(),
            ],
            restart: Some("always".to_string()),
        }),
    }
}

pub fn server_url_hint(host: &str) -> String {
    format!("https://{host}:{SERVER_HTTPS_PORT}")
}

pub struct ContainerResource<'a> {
    pub docker: &'a dyn ContainerEngineClient,
    pub run: ContainerRun,
}

impl Resource for ContainerResource<'_> {
    fn describe(&self) -> String {
        format!("container '{}'", self.run.name)
    }
    fn exists(&self) -> Result<bool, DockhandError> {
        self.docker.container_exists(&self.run.name)
    }
    fn delete(&self) -> Result<(), DockhandError> {
        self.docker.remove_container(&self.run.name)
    }
    fn create(&self) -> Result<(), DockhandError> {
        self.docker.run_container(&self.run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::docker::container_run_args;

    #[test]
    fn server_container_matches_published_layout() {
        let run = portainer_container(PortainerMode::Server, &DockerSettings::default()).unwrap();
        assert_eq!(
            container_run_args(&run).join(" "),
            "run -d --name portainer --restart=always -p 8000:8000 -p 9443:9443 \
             -v /var/run/docker.sock:/var/run/docker.sock -v portainer_data:/data \
             portainer/portainer-ce:latest"
        );
    }

    #[test]
    fn agent_mounts_volume_dir() {
        let run = portainer_container(PortainerMode::Agent, &DockerSettings::default()).unwrap();
        assert_eq!(run.name, "portainer_agent");
        assert_eq!(run.ports, vec!["9001:9001".to_string()]);
        assert!(run
            .volumes
            .contains(&"/var/lib/docker/volumes:/var/lib/docker/volumes".to_string()));
    }

    #[test]
    fn none_means_no_container() {
        assert!(portainer_container(PortainerMode::None, &DockerSettings::default()).is_none());
        assert_eq!(server_url_hint("nas"), "https://nas:9443");
    }
}
