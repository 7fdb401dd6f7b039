use super::{CommandLine, CommandRunner, NetworkManagerClient, VlanConnection};
use crate::errors::DockhandError;

/// NetworkManager through `nmcli`.
pub struct Nmcli<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Nmcli<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

/// Parse `nmcli -t -f NAME connection show`: one name per line, `\:` escapes literal colons.
pub fn parse_connection_names(out: &str) -> Vec<String> {
    out.lines()
        .map(|l| l.trim_end().replace("\\:", ":"))
        .filter(|l| !l.is_empty())
        .collect()
}

pub fn vlan_add_command(conn: &VlanConnection) -> CommandLine {
    CommandLine::new("nmcli").args([
        "connection".to_string(),
        "add".to_string(),
        "type".to_string(),
        "vlan".to_string(),
        "con-name".to_string(),
        conn.name.clone(),
        "ifname".to_string(),
        conn.interface.clone(),
        "dev".to_string(),
        conn.parent.clone(),
        "id".to_string(),
        conn.vlan_id.to_string(),
        // The host stays off the container subnet; containers get addresses from Docker
        "ipv4.method".to_string(),
        "disabled".to_string(),
        "ipv6.method".to_string(),
        "ignore".to_string(),
        "connection.autoconnect".to_string(),
        "yes".to_string(),
    ])
}

impl NetworkManagerClient for Nmcli<'_> {
    fn connection_exists(&self, name: &str) -> Result<bool, DockhandError> {
        let cmd = CommandLine::new("nmcli").args(["-t", "-f", "NAME", "connection", "show"]);
        let out = self.runner.query(&cmd)?.into_result(&cmd)?;
        Ok(parse_connection_names(&out.stdout)
            .iter()
            .any(|n| n == name))
    }

    fn delete_connection(&self, name: &str) -> Result<(), DockhandError> {
        let cmd = CommandLine::new("nmcli").args(["connection", "delete", name]);
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }

    fn add_vlan_connection(&self, conn: &VlanConnection) -> Result<(), DockhandError> {
        let cmd = vlan_add_command(conn);
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }

    fn activate_connection(&self, name: &str) -> Result<(), DockhandError> {
        let cmd = CommandLine::new("nmcli").args(["connection", "up", name]);
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_terse_connection_names() {
        let out = "Wired connection 1\nvlan10\ndocker0\nweird\\:name\n\n";
        assert_eq!(
            parse_connection_names(out),
            vec![
                "Wired connection 1".to_string(),
                "vlan10".to_string(),
                "docker0".to_string(),
                "weird:name".to_string()
            ]
        );
    }

    #[test]
    fn vlan_add_command_shape() {
        let conn = VlanConnection {
            name: "vlan10".to_string(),
            interface: "enp3s0.10".to_string(),
            parent: "enp3s0".to_string(),
            vlan_id: 10,
        };
        let preview = vlan_add_command(&conn).preview();
        assert!(preview.starts_with("nmcli connection add type vlan con-name vlan10"), "{preview}");
        assert!(preview.contains("ifname enp3s0.10 dev enp3s0 id 10"), "{preview}");
        assert!(preview.contains("ipv4.method disabled"), "{preview}");
    }
}
