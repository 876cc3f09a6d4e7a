//! Poll a job until it reaches a terminal state.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use uuid::Uuid;

use crate::client::{ApiClient, ClientError, models::JobReport};

/// Bounded polling schedule with multiplicative backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub backoff_factor: f64,
    pub max_duration: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            backoff_factor: 1.5,
            max_duration: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    /// Scaled interval, saturating at `max_interval`. Factors below 1 (or
    /// NaN) hold the interval steady.
    fn next_interval(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.backoff_factor.max(1.0);

        Duration::try_from_secs_f64(scaled)
            .map_or(self.max_interval, |next| next.min(self.max_interval))
    }
}

/// Read the job's status until it is terminal, calling `on_report` with each
/// observation. The first error response ends the loop.
///
/// # Errors
///
/// Returns [`ClientError::PollTimeout`] once `max_duration` has passed
/// without a terminal status, or the error of the failing call.
pub async fn poll_until_terminal(
    client: &ApiClient,
    job: Uuid,
    policy: PollPolicy,
    mut on_report: impl FnMut(&JobReport),
) -> Result<JobReport, ClientError> {
    let started = Instant::now();
    let mut interval = policy.initial_interval;

    loop {
        let report = client.get_job(job).await?;

        on_report(&report);

        if report.status.is_terminal() {
            return Ok(report);
        }

        let elapsed = started.elapsed();

        if elapsed >= policy.max_duration {
            return Err(ClientError::PollTimeout { elapsed });
        }

        sleep(interval.min(policy.max_duration - elapsed)).await;

        interval = policy.next_interval(interval);
    }
}
