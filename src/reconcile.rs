//! Existence check, then create or ask before delete-and-recreate.
//!
//! Shared by every named external resource (NetworkManager connections, links, Docker
//! networks and containers). There is no locking: concurrent runs may both observe the
//! same state.

use crate::errors::{DockhandError, StepOutcome};
use crate::ui::{confirm, Prompter};

/// A named external resource that can be checked for, removed and created.
pub trait Resource {
    /// Human-readable label, e.g. `VLAN connection 'vlan10'`.
    fn describe(&self) -> String;
    fn exists(&self) -> Result<bool, DockhandError>;
    fn delete(&self) -> Result<(), DockhandError>;
    fn create(&self) -> Result<(), DockhandError>;
}

pub fn reconcile(
    resource: &dyn Resource,
    prompter: &mut dyn Prompter,
) -> Result<StepOutcome, DockhandError> {
    let label = resource.describe();
    if !resource.exists()? {
        tracing::info!(resource = %label, "creating");
        resource.create()?;
        return Ok(StepOutcome::Success);
    }

    let recreate = confirm(
        prompter,
        &format!("{label} already exists. Delete and recreate it?"),
        false,
    )?;
    if !recreate {
        tracing::info!(resource = %label, "keeping existing");
        return Ok(StepOutcome::Skipped(format!("{label} already exists; keeping it")));
    }

    // Best effort: a failed delete is reported, creation is still attempted
    let delete_warning = match resource.delete() {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(resource = %label, error = %e, "delete failed");
            Some(format!("failed to delete {label}: {e}"))
        }
    };
    resource.create()?;
    Ok(match delete_warning {
        Some(w) => StepOutcome::Warning(w),
        None => StepOutcome::Success,
    })
}
