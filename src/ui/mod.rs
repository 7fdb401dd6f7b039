pub mod prompt;

pub use prompt::{
    ask_checked, ask_optional, ask_validated, choose_index, confirm, DefaultsPrompter, Prompter, ScriptedPrompter,
    TerminalPrompter,
};

/// Print a standardized warning line to stderr (color-aware).
pub fn warn_print(msg: &str) {
    let use_err = crate::color_enabled_stderr();
    eprintln!(
        "{}",
        crate::paint(use_err, "\x1b[33;1m", &format!("warning: {}", msg))
    );
}

/// Print a step heading, e.g. `==> Creating VLAN connection vlan10`.
pub fn step_heading(msg: &str) {
    let use_err = crate::color_enabled_stderr();
    eprintln!();
    eprintln!("{}", crate::paint(use_err, "\x1b[34;1m", &format!("==> {msg}")));
}
