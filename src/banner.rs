pub(crate) fn print_startup_banner(subcommand: &str, dry_run: bool) {
    let version = env!("CARGO_PKG_VERSION");
    let use_err = dockhand::color_enabled_stderr();
    eprintln!();
    eprintln!("──────────────────────────────────────────────────────────────────────");
    eprintln!(
        "{}",
        dockhand::paint(
            use_err,
            "\x1b[1m",
            &format!("  dockhand v{version}  -  Fedora Docker & VLAN provisioning  ({subcommand})")
        )
    );
    eprintln!("──────────────────────────────────────────────────────────────────────");
    eprintln!(
        "  host: {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if dry_run {
        dockhand::log_warn_stderr(
            use_err,
            "  dry-run: state-changing commands are printed, not executed",
        );
    }
    eprintln!();
}
