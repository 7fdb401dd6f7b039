//! Per-step outcomes of a run, printed as the closing summary.
use crate::errors::StepOutcome;
use crate::{color_enabled_stderr, log_success_stderr, log_warn_stderr, paint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn push(&mut self, name: impl Into<String>, outcome: StepOutcome) {
        self.steps.push(StepReport {
            name: name.into(),
            outcome,
        });
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match &s.outcome {
                StepOutcome::Warning(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn outcome_of(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.name == name).map(|s| &s.outcome)
    }

    /// One line per step, e.g. `  docker network: skipped (Docker network 'x' already exists; keeping it)`.
    pub fn summary_lines(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|s| match &s.outcome {
                StepOutcome::Success => format!("  {}: {}", s.name, s.outcome.label()),
                StepOutcome::Skipped(why) | StepOutcome::Warning(why) => {
                    format!("  {}: {} ({why})", s.name, s.outcome.label())
                }
            })
            .collect()
    }

    pub fn print_summary(&self, title: &str) {
        let use_err = color_enabled_stderr();
        eprintln!();
        eprintln!("{}", paint(use_err, "\x1b[1m", title));
        for line in self.summary_lines() {
            eprintln!("{line}");
        }
        let warnings = self.warnings();
        if warnings.is_empty() {
            log_success_stderr(use_err, "dockhand: done.");
        } else {
            log_warn_stderr(
                use_err,
                &format!("dockhand: done with {} warning(s).", warnings.len()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_reasons() {
        let mut r = RunReport::default();
        r.push("docker service", StepOutcome::Success);
        r.push("portainer", StepOutcome::Skipped("keeping it".to_string()));
        r.push("user group", StepOutcome::Warning("usermod failed".to_string()));
        let lines = r.summary_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("(keeping it)"), "{lines:?}");
        assert_eq!(r.warnings(), vec!["usermod failed"]);
        assert!(matches!(r.outcome_of("portainer"), Some(StepOutcome::Skipped(_))));
        assert!(r.outcome_of("missing").is_none());
    }
}
