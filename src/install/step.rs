//! Step runner: show the failure, then let the user decide whether to keep going.
use crate::errors::{DockhandError, StepOutcome};
use crate::ui::{confirm, step_heading, Prompter};
use crate::{color_enabled_stderr, log_error_stderr};

/// Failures a user may choose to push past. Missing tools, bad configuration and
/// aborts always stop the run.
pub fn is_recoverable(e: &DockhandError) -> bool {
    matches!(
        e,
        DockhandError::CommandFailed { .. }
            | DockhandError::Io(_)
            | DockhandError::Exec(_)
            | DockhandError::Message(_)
    )
}

/// Run one installer step under a heading. On a recoverable failure the error is printed and
/// the user is asked "Continue anyway?" (default no); yes turns it into a warning.
pub fn run_step<F>(
    p: &mut dyn Prompter,
    label: &str,
    step: F,
) -> Result<StepOutcome, DockhandError>
where
    F: FnOnce() -> Result<StepOutcome, DockhandError>,
{
    step_heading(label);
    match step() {
        Ok(outcome) => {
            tracing::info!(step = label, outcome = outcome.label(), "step finished");
            Ok(outcome)
        }
        Err(e) if !is_recoverable(&e) => Err(e),
        Err(e) => {
            log_error_stderr(color_enabled_stderr(), &format!("dockhand: {label}: {e}"));
            if confirm(p, "Continue anyway?", false)? {
                tracing::warn!(step = label, error = %e, "continuing after failure");
                Ok(StepOutcome::Warning(format!("{label} failed: {}", first_error_line(&e))))
            } else {
                Err(e)
            }
        }
    }
}

fn first_error_line(e: &DockhandError) -> String {
    e.to_string().lines().next().unwrap_or_default().to_string()
}
