//! Client-side status polling.
//!
//! A cooperative timed loop: read the cheap status endpoint on a fixed
//! interval until the session reaches a terminal status or a wall-clock
//! timeout elapses. The timeout is a client-only give-up — nothing is
//! written back to the server, the session simply stops being watched.
//! Returning from the loop drops both the interval and the timeout future,
//! so no pending timer leaks past cancellation.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;

use wabridge_core::SessionStatus;

use crate::ApiClient;

/// Poll timing: 3-second interval, 5-minute overall budget by default.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(300),
        }
    }
}

/// How a polling run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The session reached a terminal status.
    Terminal(SessionStatus),
    /// The wall-clock budget ran out first. Soft failure only — the stored
    /// session is left untouched.
    TimedOut { last_seen: SessionStatus },
}

/// Poll the server until `session_id` reaches a terminal status or the
/// configured timeout elapses. Request failures surface immediately; there
/// are no retries.
pub async fn poll_until_terminal(
    client: &ApiClient,
    session_id: &str,
    config: &PollConfig,
) -> Result<PollOutcome> {
    poll_with(
        || async { Ok(client.session_status(session_id).await?.status) },
        config,
    )
    .await
}

/// Generic poll loop over any status source. Split out from
/// `poll_until_terminal` so the timing behavior is testable without HTTP.
pub async fn poll_with<F, Fut>(mut fetch: F, config: &PollConfig) -> Result<PollOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<SessionStatus>>,
{
    let deadline = tokio::time::Instant::now() + config.timeout;
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_seen = SessionStatus::Connecting;
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                tracing::warn!(
                    "gave up polling after {:?} (last seen: {last_seen})",
                    config.timeout,
                );
                return Ok(PollOutcome::TimedOut { last_seen });
            }
            _ = ticker.tick() => {
                let status = fetch().await?;
                last_seen = status;
                if status.is_terminal() {
                    return Ok(PollOutcome::Terminal(status));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_terminal_status() {
        let calls = AtomicUsize::new(0);
        let outcome = poll_with(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok(if n < 2 {
                    SessionStatus::Connecting
                } else {
                    SessionStatus::Active
                })
            },
            &PollConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Terminal(SessionStatus::Active));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_is_terminal_too() {
        let outcome = poll_with(|| async { Ok(SessionStatus::Failed) }, &PollConfig::default())
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Terminal(SessionStatus::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_writing_anything_back() {
        let outcome = poll_with(|| async { Ok(SessionStatus::Connecting) }, &PollConfig::default())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                last_seen: SessionStatus::Connecting
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_surface_immediately() {
        let result = poll_with(
            || async { anyhow::bail!("connection refused") },
            &PollConfig::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
