//! Terminal color for dockhand's stderr status lines.
//!
//! Only stderr is ever colored: step results, warnings, prompts and menus go there. Stdout
//! carries nothing but the `launch --list` script names, which stay plain so they can be piped.
//! Whether color is on is decided once per process from, in order: `NO_COLOR`, the `--color`
//! flag, `DOCKHAND_COLOR`, then whether stderr is a terminal. Callers read
//! `color_enabled_stderr()` once per function and pass the flag to `paint` and the `log_*`
//! helpers.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

const RESET: &str = "\x1b[0m";
const INFO: &str = "\x1b[36;1m";
const SUCCESS: &str = "\x1b[32;1m";
const WARN: &str = "\x1b[33m";
const ERROR: &str = "\x1b[31;1m";

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// `Auto` follows the terminal; the other two ignore it.
    pub fn enabled(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => is_tty,
        }
    }
}

static FLAG_MODE: OnceCell<ColorMode> = OnceCell::new();

/// Records the `--color` flag. Later calls are ignored.
pub fn set_color_mode(mode: ColorMode) {
    let _ = FLAG_MODE.set(mode);
}

/// Accepts the clap names plus on/off style booleans, as written in `DOCKHAND_COLOR`.
pub fn parse_color_mode(s: &str) -> Option<ColorMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(ColorMode::Auto),
        "always" | "on" | "true" | "yes" => Some(ColorMode::Always),
        "never" | "off" | "false" | "no" => Some(ColorMode::Never),
        _ => None,
    }
}

fn decide(no_color: bool, flag: Option<ColorMode>, env: Option<ColorMode>, is_tty: bool) -> bool {
    if no_color {
        return false;
    }
    flag.or(env).map_or(is_tty, |mode| mode.enabled(is_tty))
}

pub fn color_enabled_stderr() -> bool {
    let env = std::env::var("DOCKHAND_COLOR")
        .ok()
        .and_then(|v| parse_color_mode(&v));
    decide(
        std::env::var_os("NO_COLOR").is_some(),
        FLAG_MODE.get().copied(),
        env,
        atty::is(atty::Stream::Stderr),
    )
}

/// `s` wrapped in `code` and a reset, or `s` untouched when `enabled` is false.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}{RESET}")
    } else {
        s.to_string()
    }
}

pub fn log_info_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, INFO, msg));
}

pub fn log_success_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, SUCCESS, msg));
}

pub fn log_warn_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, WARN, msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, ERROR, msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_mode_accepts_aliases() {
        assert_eq!(parse_color_mode("ON"), Some(ColorMode::Always));
        assert_eq!(parse_color_mode(" never "), Some(ColorMode::Never));
        assert_eq!(parse_color_mode("auto"), Some(ColorMode::Auto));
        assert_eq!(parse_color_mode("rainbow"), None);
    }

    #[test]
    fn no_color_overrides_flag_and_env() {
        assert!(!decide(true, Some(ColorMode::Always), Some(ColorMode::Always), true));
    }

    #[test]
    fn flag_beats_env_and_env_beats_tty() {
        assert!(decide(false, Some(ColorMode::Always), Some(ColorMode::Never), false));
        assert!(!decide(false, None, Some(ColorMode::Never), true));
        assert!(decide(false, None, Some(ColorMode::Auto), true));
        assert!(!decide(false, None, None, false));
    }

    #[test]
    fn paint_is_identity_when_disabled() {
        assert_eq!(paint(false, "\x1b[31m", "x"), "x");
        assert_eq!(paint(true, "\x1b[31m", "x"), "\x1b[31mx\x1b[0m");
    }
}
