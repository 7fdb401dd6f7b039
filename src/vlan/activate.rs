//! Wait for an interface to come up: a fixed number of checks, fixed interval, one manual fallback.
use std::time::Duration;

use crate::errors::{DockhandError, StepOutcome};
use crate::system::{LinkConfigurator, LinkState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

fn poll_up(
    links: &dyn LinkConfigurator,
    interface: &str,
    policy: &ActivationPolicy,
) -> Result<bool, DockhandError> {
    for attempt in 1..=policy.attempts.max(1) {
        if links.link_state(interface)? == LinkState::Up {
            tracing::debug!(interface, attempt, "link is up");
            return Ok(true);
        }
        if attempt < policy.attempts {
            std::thread::sleep(policy.interval);
        }
    }
    Ok(false)
}

/// Poll until `interface` reports UP; if it never does, try `ip link set up` once and re-check.
pub fn wait_for_link_up(
    links: &dyn LinkConfigurator,
    interface: &str,
    policy: &ActivationPolicy,
) -> Result<StepOutcome, DockhandError> {
    if poll_up(links, interface, policy)? {
        return Ok(StepOutcome::Success);
    }

    tracing::warn!(interface, attempts = policy.attempts, "link still down; trying manual bring-up");
    links.set_link_up(interface)?;
    let fallback = ActivationPolicy {
        attempts: 1,
        interval: policy.interval,
    };
    if poll_up(links, interface, &fallback)? {
        return Ok(StepOutcome::Warning(format!(
            "{interface} only came up after a manual 'ip link set {interface} up'"
        )));
    }
    Err(DockhandError::Message(format!(
        "interface {interface} did not come up after {} checks and a manual bring-up",
        policy.attempts
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    fn fast(attempts: u32) -> ActivationPolicy {
        ActivationPolicy {
            attempts,
            interval: Duration::ZERO,
        }
    }

    #[test]
    fn succeeds_once_link_reports_up() {
        let host = FakeHost::new();
        host.add_link("enp3s0.10", LinkState::Down);
        host.up_after_polls("enp3s0.10", 3);
        let out = wait_for_link_up(&host, "enp3s0.10", &fast(5)).unwrap();
        assert_eq!(out, StepOutcome::Success);
        assert_eq!(host.state_polls("enp3s0.10"), 3);
        assert!(!host.ran("ip link set enp3s0.10 up"));
    }

    #[test]
    fn manual_bring_up_is_the_fallback() {
        let host = FakeHost::new();
        host.add_link("enp3s0.10", LinkState::Down);
        let out = wait_for_link_up(&host, "enp3s0.10", &fast(5)).unwrap();
        assert!(out.is_warning(), "{out:?}");
        assert_eq!(host.state_polls("enp3s0.10"), 6);
        assert!(host.ran("ip link set enp3s0.10 up"));
    }

    #[test]
    fn stuck_link_is_fatal() {
        let host = FakeHost::new();
        host.add_link("enp3s0.10", LinkState::Down);
        host.refuse_up("enp3s0.10");
        let err = wait_for_link_up(&host, "enp3s0.10", &fast(2)).unwrap_err();
        assert!(err.to_string().contains("did not come up"), "{err}");
        assert_eq!(host.state_polls("enp3s0.10"), 3);
    }
}
