//! Interactive prompting behind a trait, so flows can be driven from tests.
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::errors::DockhandError;
use crate::{color_enabled_stderr, paint};

pub trait Prompter {
    /// Ask one question and return the raw answer line; `Ok(None)` on end of input.
    fn read_answer(&mut self, question: &str, default: Option<&str>) -> io::Result<Option<String>>;

    /// Show a one-line message (validation failures, hints).
    fn say(&mut self, line: &str);

    /// Plain informational output, such as a menu.
    fn show(&mut self, line: &str) {
        eprintln!("{line}");
    }

    /// False when answers must come from defaults.
    fn interactive(&self) -> bool {
        true
    }
}

fn render_question(question: &str, default: Option<&str>) -> String {
    match default {
        Some(d) if !d.is_empty() => format!("{question} [{d}]: "),
        _ => format!("{question}: "),
    }
}

/// Reads answers from stdin, writes questions to stderr.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_answer(&mut self, question: &str, default: Option<&str>) -> io::Result<Option<String>> {
        let use_err = color_enabled_stderr();
        eprint!("{}", paint(use_err, "\x1b[1m", &render_question(question, default)));
        io::stderr().flush()?;
        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            eprintln!();
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn say(&mut self, line: &str) {
        let use_err = color_enabled_stderr();
        eprintln!("{}", paint(use_err, "\x1b[31m", line));
    }
}

/// Answers every question with its default (`--non-interactive`).
#[derive(Debug, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn read_answer(&mut self, _question: &str, default: Option<&str>) -> io::Result<Option<String>> {
        Ok(default.map(str::to_string))
    }

    fn say(&mut self, line: &str) {
        let use_err = color_enabled_stderr();
        eprintln!("{}", paint(use_err, "\x1b[33m", line));
    }

    fn interactive(&self) -> bool {
        false
    }
}

/// Replays canned answers and records what was asked; used by tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
    pub messages: Vec<String>,
    pub shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
            messages: Vec::new(),
            shown: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_answer(&mut self, question: &str, _default: Option<&str>) -> io::Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front())
    }

    fn say(&mut self, line: &str) {
        self.messages.push(line.to_string());
    }

    fn show(&mut self, line: &str) {
        self.shown.push(line.to_string());
    }
}

/// Ask until `validate` accepts the answer; an empty answer takes `default`.
///
/// There is no retry limit; only end of input stops the loop (as `Aborted`).
pub fn ask_validated<T, F>(
    p: &mut dyn Prompter,
    question: &str,
    default: Option<&str>,
    validate: F,
) -> Result<T, DockhandError>
where
    F: Fn(&str) -> Result<T, String>,
{
    ask_checked(p, question, default, |s| Ok(validate(s)))
}

/// Like `ask_validated`, for validators that consult the host: `Err` from `check` ends the
/// loop, `Ok(Err(msg))` re-prompts with `msg`.
pub fn ask_checked<T, F>(
    p: &mut dyn Prompter,
    question: &str,
    default: Option<&str>,
    check: F,
) -> Result<T, DockhandError>
where
    F: Fn(&str) -> Result<Result<T, String>, DockhandError>,
{
    if !p.interactive() {
        let value = default.ok_or_else(|| {
            DockhandError::InvalidInput(format!("{question}: no value given (non-interactive)"))
        })?;
        return check(value)?
            .map_err(|msg| DockhandError::InvalidInput(format!("{question}: {msg}")));
    }
    loop {
        let answer = p.read_answer(question, default)?.ok_or(DockhandError::Aborted)?;
        let candidate = match (answer.trim().is_empty(), default) {
            (true, Some(d)) => d.to_string(),
            _ => answer,
        };
        match check(&candidate)? {
            Ok(v) => return Ok(v),
            Err(msg) => p.say(&format!("  {msg}")),
        }
    }
}

/// Optional value: an empty answer means "none".
pub fn ask_optional<T, F>(
    p: &mut dyn Prompter,
    question: &str,
    validate: F,
) -> Result<Option<T>, DockhandError>
where
    F: Fn(&str) -> Result<T, String>,
{
    if !p.interactive() {
        return Ok(None);
    }
    loop {
        let answer = p.read_answer(question, None)?.ok_or(DockhandError::Aborted)?;
        if answer.trim().is_empty() {
            return Ok(None);
        }
        match validate(&answer) {
            Ok(v) => return Ok(Some(v)),
            Err(msg) => p.say(&format!("  {msg}")),
        }
    }
}

pub fn parse_yes_no(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

pub fn confirm(p: &mut dyn Prompter, question: &str, default: bool) -> Result<bool, DockhandError> {
    let hint = if default { "Y/n" } else { "y/N" };
    let q = format!("{question} ({hint})");
    if !p.interactive() {
        return Ok(default);
    }
    loop {
        let answer = p.read_answer(&q, None)?.ok_or(DockhandError::Aborted)?;
        if answer.trim().is_empty() {
            return Ok(default);
        }
        match parse_yes_no(&answer) {
            Some(v) => return Ok(v),
            None => p.say("  please answer 'y' or 'n'"),
        }
    }
}

/// Pick one of `count` numbered entries; `q` returns `None`.
pub fn choose_index(
    p: &mut dyn Prompter,
    question: &str,
    count: usize,
) -> Result<Option<usize>, DockhandError> {
    if !p.interactive() {
        return Err(DockhandError::InvalidInput(
            "a selection is required (non-interactive)".to_string(),
        ));
    }
    loop {
        let answer = p.read_answer(question, None)?.ok_or(DockhandError::Aborted)?;
        let t = answer.trim();
        if t.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match t.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            _ => p.say(&format!("  enter a number between 1 and {count}, or 'q' to quit")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_vlan_id;

    #[test]
    fn ask_validated_reprompts_until_valid() {
        let mut p = ScriptedPrompter::new(["abc", "0", "4095", "10"]);
        let id = ask_validated(&mut p, "VLAN ID", None, validate_vlan_id).unwrap();
        assert_eq!(id.get(), 10);
        assert_eq!(p.questions.len(), 4);
        assert_eq!(p.messages.len(), 3);
    }

    #[test]
    fn ask_validated_uses_default_on_empty() {
        let mut p = ScriptedPrompter::new([""]);
        let id = ask_validated(&mut p, "VLAN ID", Some("20"), validate_vlan_id).unwrap();
        assert_eq!(id.get(), 20);
    }

    #[test]
    fn end_of_input_aborts() {
        let mut p = ScriptedPrompter::new(["nope"]);
        let err = ask_validated(&mut p, "VLAN ID", None, validate_vlan_id).unwrap_err();
        assert!(matches!(err, DockhandError::Aborted));
    }

    #[test]
    fn non_interactive_requires_default() {
        let mut p = DefaultsPrompter;
        let err = ask_validated(&mut p, "VLAN ID", None, validate_vlan_id).unwrap_err();
        assert!(matches!(err, DockhandError::InvalidInput(_)));
        let ok = ask_validated(&mut p, "VLAN ID", Some("30"), validate_vlan_id).unwrap();
        assert_eq!(ok.get(), 30);
    }

    #[test]
    fn ask_checked_stops_on_query_failure() {
        let mut p = ScriptedPrompter::new(["eth0", "eth0"]);
        let err = ask_checked::<String, _>(&mut p, "Parent interface", None, |_| {
            Err(DockhandError::MissingDependency("ip".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, DockhandError::MissingDependency(_)));
        assert_eq!(p.questions.len(), 1);
        assert_eq!(p.remaining(), 1);
        assert!(p.messages.is_empty());
    }

    #[test]
    fn confirm_parses_and_defaults() {
        let mut p = ScriptedPrompter::new(["maybe", "YES", ""]);
        assert!(confirm(&mut p, "Continue?", false).unwrap());
        assert!(!confirm(&mut p, "Continue?", false).unwrap());
        assert_eq!(p.messages.len(), 1);
        assert!(p.questions[0].ends_with("(y/N)"));
    }

    #[test]
    fn choose_index_rejects_out_of_range() {
        let mut p = ScriptedPrompter::new(["0", "4", "x", "3"]);
        assert_eq!(choose_index(&mut p, "Select", 3).unwrap(), Some(2));
        assert_eq!(p.questions.len(), 4);
        let mut q = ScriptedPrompter::new(["q"]);
        assert_eq!(choose_index(&mut q, "Select", 3).unwrap(), None);
    }

    #[test]
    fn ask_optional_empty_is_none() {
        let mut p = ScriptedPrompter::new(["", "bad", "10.0.0.0/24"]);
        assert!(ask_optional(&mut p, "IP range", crate::validate::validate_cidr)
            .unwrap()
            .is_none());
        let got = ask_optional(&mut p, "IP range", crate::validate::validate_cidr).unwrap();
        assert_eq!(got.map(|c| c.to_string()), Some("10.0.0.0/24".to_string()));
    }
}
