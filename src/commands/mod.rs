use std::process::ExitCode;

use dockhand::{
    acquire_lock, collect_install_plan, collect_plan, color_enabled_stderr, confirm, describe_plan,
    exit_code_for, invoking_user, log_error_stderr, log_info_stderr, require_tools,
    server_url_hint, ActivationPolicy, DefaultsPrompter, DockerCli, DockerInstaller,
    DockhandError, Dnf, GithubSource, Host, InstallAnswers, InstallHost, InstallOptions, IpRoute,
    LaunchOptions, LaunchOutcome, Launcher, Nmcli, PersistPaths, PortainerMode, Prompter,
    ProvisionOptions, Provisioner, Settings, ShellExecutor, SystemRunner, Systemctl,
    TerminalPrompter, Usermod, VlanAnswers, INSTALL_TOOLS, VLAN_TOOLS,
};

use crate::banner::print_startup_banner;
use crate::cli::{Cli, DockerArgs, LaunchArgs, VlanArgs};

fn finish(result: Result<(), DockhandError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error_stderr(color_enabled_stderr(), &format!("dockhand: {e}"));
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn prompter(cli: &Cli) -> Box<dyn Prompter> {
    if cli.non_interactive {
        Box::new(DefaultsPrompter)
    } else {
        Box::new(TerminalPrompter)
    }
}

fn require_root() -> Result<(), DockhandError> {
    if nix::unistd::geteuid().is_root() {
        Ok(())
    } else {
        Err(DockhandError::NotRoot)
    }
}

fn host_name() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "<host>".to_string())
}

pub fn run_docker(cli: &Cli, args: &DockerArgs) -> ExitCode {
    finish(docker(cli, args))
}

fn docker(cli: &Cli, args: &DockerArgs) -> Result<(), DockhandError> {
    let settings = Settings::load(cli.config.as_deref())?;
    require_root()?;
    require_tools(INSTALL_TOOLS)?;
    let _lock = acquire_lock()?;
    if !cli.quiet {
        print_startup_banner("docker", cli.dry_run);
    }

    let runner = SystemRunner::new(settings.exec.query_timeout()?, cli.dry_run);
    let mut p = prompter(cli);
    let answers = InstallAnswers {
        remove_conflicting: match (args.remove_conflicting, args.keep_conflicting) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        add_user: args.no_user_group.then_some(false),
        portainer: args.portainer,
    };
    let user = invoking_user(|k| std::env::var(k).ok());
    let plan = collect_install_plan(p.as_mut(), &answers, user.as_deref())?;

    let (dnf, systemctl, docker, usermod) = (
        Dnf::new(&runner),
        Systemctl::new(&runner),
        DockerCli::new(&runner),
        Usermod::new(&runner),
    );
    let host = InstallHost {
        packages: &dnf,
        services: &systemctl,
        docker: &docker,
        accounts: &usermod,
    };
    let opts = InstallOptions {
        settings: settings.docker.clone(),
        dry_run: cli.dry_run,
        ..InstallOptions::default()
    };
    let report = DockerInstaller::new(host, opts).run(&plan, p.as_mut())?;
    report.print_summary("Docker installation summary");
    if plan.portainer == PortainerMode::Server {
        log_info_stderr(
            color_enabled_stderr(),
            &format!("Portainer: {}", server_url_hint(&host_name())),
        );
    }
    Ok(())
}

pub fn run_vlan(cli: &Cli, args: &VlanArgs) -> ExitCode {
    finish(vlan(cli, args))
}

fn vlan(cli: &Cli, args: &VlanArgs) -> Result<(), DockhandError> {
    let settings = Settings::load(cli.config.as_deref())?;
    require_root()?;
    require_tools(VLAN_TOOLS)?;
    let _lock = acquire_lock()?;
    if !cli.quiet {
        print_startup_banner("vlan", cli.dry_run);
    }

    let runner = SystemRunner::new(settings.exec.query_timeout()?, cli.dry_run);
    let (nmcli, ip, docker, systemctl) = (
        Nmcli::new(&runner),
        IpRoute::new(&runner),
        DockerCli::new(&runner),
        Systemctl::new(&runner),
    );
    let mut p = prompter(cli);
    let answers = VlanAnswers {
        parent: args.parent.clone(),
        vlan_id: args.vlan_id.clone(),
        subnet: args.subnet.clone(),
        gateway: args.gateway.clone(),
        network_name: args.network.clone(),
        ip_range: args.ip_range.clone(),
        shim: match (args.shim, args.no_shim) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        shim_parent: args.shim_parent,
        shim_address: args.shim_address.clone(),
    };
    let plan = collect_plan(p.as_mut(), &ip, &answers, &settings.vlan)?;

    p.show("");
    p.show("Planned configuration:");
    for line in describe_plan(&plan) {
        p.show(&line);
    }
    if !confirm(p.as_mut(), "Proceed?", true)? {
        log_info_stderr(color_enabled_stderr(), "dockhand: nothing changed.");
        return Ok(());
    }

    let opts = ProvisionOptions {
        activation: ActivationPolicy {
            attempts: settings.vlan.activation_attempts,
            interval: settings.vlan.poll_interval()?,
        },
        paths: PersistPaths {
            bin_dir: settings.vlan.bin_dir.clone(),
            unit_dir: settings.vlan.unit_dir.clone(),
        },
        boot_wait_secs: settings.vlan.boot_wait_secs,
        dry_run: cli.dry_run,
    };
    let host = Host {
        nm: &nmcli,
        links: &ip,
        docker: &docker,
        services: &systemctl,
    };
    let report = Provisioner::new(host, opts).run(&plan, p.as_mut())?;
    report.print_summary("VLAN provisioning summary");
    Ok(())
}

pub fn run_launch(cli: &Cli, args: &LaunchArgs) -> ExitCode {
    finish(launch(cli, args))
}

fn launch(cli: &Cli, args: &LaunchArgs) -> Result<(), DockhandError> {
    let settings = Settings::load(cli.config.as_deref())?;
    let timeout = settings.exec.query_timeout()?;
    let source = GithubSource::from_settings(&settings.launcher, timeout)?;
    let runner = SystemRunner::new(timeout, cli.dry_run);
    let use_sudo = !nix::unistd::geteuid().is_root();
    let executor = ShellExecutor::new(&runner, settings.launcher.shell.clone(), use_sudo);
    let opts = LaunchOptions {
        self_name: settings.launcher.self_name.clone(),
        list_only: args.list,
        script: args.script.clone(),
    };
    let mut p = prompter(cli);
    match Launcher::new(&source, &executor, opts).run(p.as_mut())? {
        LaunchOutcome::Listed(names) => {
            for name in names {
                println!("{name}");
            }
        }
        LaunchOutcome::Declined => {
            log_info_stderr(color_enabled_stderr(), "dockhand: nothing run.");
        }
        LaunchOutcome::Ran { script } => {
            tracing::info!(script = %script, "script finished");
        }
    }
    Ok(())
}

pub fn run_doctor(cli: &Cli) -> ExitCode {
    if !cli.quiet {
        print_startup_banner("doctor", false);
    }
    // Diagnostics still run with a broken config file; report it and use defaults
    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            dockhand::warn_print(&e.to_string());
            Settings::default()
        }
    };
    dockhand::run_doctor(&settings);
    ExitCode::SUCCESS
}
