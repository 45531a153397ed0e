//! Application service: wait for a launched instance to reach `running`.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::{Duration, Instant};

use crate::application::ports::ComputeProvider;
use crate::domain::instance::{InstanceStatus, ProvisionedInstance};

/// Delay between two status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Give up waiting for `running` after this long.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(900);

/// Retry policy for status polling.
///
/// Provider errors during polling never abort the wait; they are logged and
/// retried after `interval` like any non-`running` status. The wait ends on
/// `running`, on a terminal state, or when a configured bound is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Overall bound on the wait. `None` polls forever.
    pub timeout: Option<Duration>,
    /// Bound on the number of status requests. `None` means no limit.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_POLL_TIMEOUT),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    /// Poll every `interval` until `running`, however long it takes.
    #[must_use]
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
            max_attempts: None,
        }
    }

    fn exhausted(&self, attempt: u32, started: Instant) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
            || self
                .timeout
                .is_some_and(|timeout| started.elapsed() + self.interval > timeout)
    }
}

/// How the wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The instance reported `running`; carries that snapshot.
    Running(ProvisionedInstance),
    /// The instance never reported `running`.
    Stalled {
        /// Last status successfully observed, if any request succeeded.
        last_status: Option<InstanceStatus>,
        /// `true` when the policy bound was hit, `false` on a terminal state.
        exhausted: bool,
    },
}

/// Poll `instance_id` until it is `running` or `policy` gives up.
pub async fn wait_until_running(
    compute: &impl ComputeProvider,
    instance_id: &str,
    policy: &PollPolicy,
) -> PollOutcome {
    let started = Instant::now();
    let mut last_status = None;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match compute.describe_instance(instance_id).await {
            Ok(instance) if instance.status == InstanceStatus::Running => {
                tracing::info!(instance_id, attempt, "instance running");
                return PollOutcome::Running(instance);
            }
            Ok(instance) if instance.status.is_terminal() => {
                tracing::warn!(instance_id, status = %instance.status, "instance entered a terminal state");
                return PollOutcome::Stalled {
                    last_status: Some(instance.status),
                    exhausted: false,
                };
            }
            Ok(instance) => {
                tracing::debug!(instance_id, attempt, status = %instance.status, "instance not running yet");
                last_status = Some(instance.status);
            }
            Err(e) => {
                tracing::warn!(instance_id, attempt, error = %format!("{e:#}"), "status poll failed; retrying");
            }
        }

        if policy.exhausted(attempt, started) {
            return PollOutcome::Stalled {
                last_status,
                exhausted: true,
            };
        }
        tokio::time::sleep(policy.interval).await;
    }
}
