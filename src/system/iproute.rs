use super::{CommandLine, CommandRunner, LinkConfigurator, LinkState};
use crate::errors::DockhandError;

/// Kernel links and routes through `ip` (iproute2).
pub struct IpRoute<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> IpRoute<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn apply(&self, cmd: CommandLine) -> Result<(), DockhandError> {
        self.runner.apply(&cmd)?.into_result(&cmd).map(|_| ())
    }
}

/// Parse one line of `ip -o link show dev X`.
///
/// `state UP` wins; virtual links (macvlan on some drivers, loopback) report `state UNKNOWN`,
/// in which case the `UP` flag inside `<...>` decides.
pub fn parse_link_state(line: &str) -> LinkState {
    let mut words = line.split_whitespace();
    let mut state = None;
    while let Some(w) = words.next() {
        if w == "state" {
            state = words.next();
            break;
        }
    }
    match state {
        Some("UP") => LinkState::Up,
        Some("DOWN") | Some("LOWERLAYERDOWN") | Some("NOTPRESENT") => LinkState::Down,
        _ => {
            let flags = line
                .split_once('<')
                .and_then(|(_, rest)| rest.split_once('>'))
                .map(|(f, _)| f)
                .unwrap_or("");
            if flags.split(',').any(|f| f == "UP") {
                LinkState::Up
            } else if state.is_some() {
                LinkState::Unknown
            } else {
                LinkState::Down
            }
        }
    }
}

impl LinkConfigurator for IpRoute<'_> {
    fn link_exists(&self, name: &str) -> Result<bool, DockhandError> {
        let cmd = CommandLine::new("ip").args(["link", "show", "dev", name]);
        let out = self.runner.query(&cmd)?;
        Ok(out.success())
    }

    fn link_state(&self, name: &str) -> Result<LinkState, DockhandError> {
        let cmd = CommandLine::new("ip").args(["-o", "link", "show", "dev", name]);
        let out = self.runner.query(&cmd)?;
        if !out.success() {
            return Ok(LinkState::Down);
        }
        Ok(out
            .stdout
            .lines()
            .next()
            .map(parse_link_state)
            .unwrap_or(LinkState::Down))
    }

    fn set_link_up(&self, name: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("ip").args(["link", "set", name, "up"]))
    }

    fn add_macvlan(&self, name: &str, parent: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("ip").args([
            "link", "add", name, "link", parent, "type", "macvlan", "mode", "bridge",
        ]))
    }

    fn delete_link(&self, name: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("ip").args(["link", "delete", name]))
    }

    fn add_address(&self, name: &str, cidr: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("ip").args(["addr", "add", cidr, "dev", name]))
    }

    fn route_exists(&self, destination: &str, dev: &str) -> Result<bool, DockhandError> {
        let cmd = CommandLine::new("ip").args(["route", "show", destination, "dev", dev]);
        let out = self.runner.query(&cmd)?;
        Ok(out.success() && !out.stdout.trim().is_empty())
    }

    fn add_route(&self, destination: &str, dev: &str) -> Result<(), DockhandError> {
        self.apply(CommandLine::new("ip").args(["route", "add", destination, "dev", dev]))
    }
}
