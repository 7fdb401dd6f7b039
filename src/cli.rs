use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use dockhand::{PortainerMode, ShimParent};

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct DockerArgs {
    /// Deploy Portainer: none, server or agent
    #[arg(long, value_enum)]
    pub(crate) portainer: Option<PortainerMode>,

    /// Remove conflicting distribution packages without asking
    #[arg(long = "remove-conflicting", conflicts_with = "keep_conflicting")]
    pub(crate) remove_conflicting: bool,

    /// Keep conflicting distribution packages
    #[arg(long = "keep-conflicting")]
    pub(crate) keep_conflicting: bool,

    /// Do not add the invoking user to the docker group
    #[arg(long = "no-user-group")]
    pub(crate) no_user_group: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct VlanArgs {
    /// Parent network interface, e.g. enp3s0
    #[arg(long)]
    pub(crate) parent: Option<String>,

    /// VLAN ID (1-4094)
    #[arg(long = "vlan-id")]
    pub(crate) vlan_id: Option<String>,

    /// Subnet in CIDR notation, e.g. 10.32.11.0/24
    #[arg(long)]
    pub(crate) subnet: Option<String>,

    /// Gateway address, e.g. 10.32.11.1
    #[arg(long)]
    pub(crate) gateway: Option<String>,

    /// Docker network name
    #[arg(long = "network")]
    pub(crate) network: Option<String>,

    /// Container IP range in CIDR notation
    #[arg(long = "ip-range")]
    pub(crate) ip_range: Option<String>,

    /// Create a macvlan shim so the host can reach the containers
    #[arg(long, conflicts_with = "no_shim")]
    pub(crate) shim: bool,

    /// Do not create a shim
    #[arg(long = "no-shim")]
    pub(crate) no_shim: bool,

    /// Link the shim sits on
    #[arg(long = "shim-parent", value_enum)]
    pub(crate) shim_parent: Option<ShimParent>,

    /// Host address for the shim in CIDR notation, e.g. 10.32.11.250/32
    #[arg(long = "shim-address")]
    pub(crate) shim_address: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct LaunchArgs {
    /// Print the available scripts and exit
    #[arg(long)]
    pub(crate) list: bool,

    /// Run this script instead of choosing from the menu
    #[arg(long)]
    pub(crate) script: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Install Docker CE (and optionally Portainer) on Fedora
    Docker(DockerArgs),
    /// Create a VLAN connection, optional macvlan shim, and a Docker macvlan network
    #[command(
        after_long_help = "Examples:\n  sudo dockhand vlan\n  sudo dockhand vlan --parent enp3s0 --vlan-id 11 --subnet 10.32.11.0/24 --gateway 10.32.11.1 --network vlan11_net --no-shim\n"
    )]
    Vlan(VlanArgs),
    /// Pick a shell script from the configured GitHub repository and run it
    Launch(LaunchArgs),
    /// Show environment diagnostics
    Doctor,
}

#[derive(Parser, Debug)]
#[command(
    name = "dockhand",
    version,
    about = "Provision Docker, Portainer and VLAN-backed macvlan networks on Fedora hosts.",
    after_help = "\n"
)]
pub(crate) struct Cli {
    /// Print detailed execution info
    #[arg(long, global = true)]
    pub(crate) verbose: bool,

    /// Suppress startup banner output
    #[arg(long, short = 'q', global = true)]
    pub(crate) quiet: bool,

    /// Print state-changing commands instead of running them
    #[arg(long = "dry-run", global = true)]
    pub(crate) dry_run: bool,

    /// Never prompt; take defaults and fail when a required value is missing
    #[arg(long = "non-interactive", global = true)]
    pub(crate) non_interactive: bool,

    /// Configuration file (default: ~/.config/dockhand/config.yaml)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub(crate) color: Option<dockhand::ColorMode>,

    #[command(subcommand)]
    pub(crate) command: Command,
}
