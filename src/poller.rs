//! Completion polling for asynchronous vendors.
//!
//! A template-based vendor answers create/update by accepting a job; the
//! poller then queries the provisioning status at a fixed interval until it
//! terminates. The interval is fixed rather than exponential: provisioning
//! latency here is dominated by a roughly constant image-pull/cold-start
//! cost, not by contention.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::vendor::Deployment;

/// Status reported by one provisioning query.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// Job accepted, not yet started.
    Pending,
    /// Job in progress.
    Running,
    /// Job done; the service is reachable.
    Finished(Deployment),
    /// Job failed; the vendor gave up.
    Failed(String),
}

/// Terminal outcome of a poll loop.
///
/// `TimedOut` is deliberately not a failure: the resource may still be
/// provisioning, the poller just could not confirm it within its budget.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Provisioning finished; the deployment is live.
    Completed(Deployment),
    /// Provisioning failed with a vendor-supplied reason.
    Failed(String),
    /// The attempt budget or deadline ran out while still in progress.
    TimedOut,
}

/// Attempt budget and cadence for one poll loop.
///
/// Total wait is bounded by `max_attempts * interval` (the poller does not
/// sleep after the final attempt). A `deadline`, if set, is checked before
/// each attempt and cancels the loop with [`PollOutcome::TimedOut`].
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Maximum number of status queries.
    pub max_attempts: u32,
    /// Fixed wait between queries.
    pub interval: Duration,
    /// Optional caller-supplied cutoff.
    pub deadline: Option<Instant>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        // Bounds total wait to 30 minutes of provisioning
        Self {
            max_attempts: 45,
            interval: Duration::from_secs(40),
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Policy with the given attempt budget and interval, no deadline.
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            deadline: None,
        }
    }

    /// Set a caller-supplied deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Poll `query` until the provisioning of `name` terminates.
///
/// `Finished` and `Failed` stop the loop immediately; `Pending`/`Running`
/// consume an attempt and wait out the interval. A query error propagates
/// as-is, since an indeterminate status is a vendor failure, not a timeout.
pub fn await_completion<F>(name: &str, policy: &PollPolicy, mut query: F) -> Result<PollOutcome>
where
    F: FnMut() -> Result<PollState>,
{
    for attempt in 1..=policy.max_attempts {
        if let Some(deadline) = policy.deadline {
            if Instant::now() >= deadline {
                log::warn!("Deadline reached while waiting for {}", name);
                return Ok(PollOutcome::TimedOut);
            }
        }

        match query()? {
            PollState::Finished(deployment) => {
                log::info!("Deployment of {} finished after {} poll(s)", name, attempt);
                return Ok(PollOutcome::Completed(deployment));
            }
            PollState::Failed(reason) => {
                log::error!("Deployment of {} failed: {}", name, reason);
                return Ok(PollOutcome::Failed(reason));
            }
            PollState::Pending | PollState::Running => {
                log::debug!(
                    "Deployment of {} still in progress (attempt {}/{})",
                    name,
                    attempt,
                    policy.max_attempts
                );
                if attempt < policy.max_attempts {
                    std::thread::sleep(policy.interval);
                }
            }
        }
    }

    log::warn!(
        "Deployment of {} not confirmed after {} attempts; it may still be provisioning",
        name,
        policy.max_attempts
    );
    Ok(PollOutcome::TimedOut)
}
