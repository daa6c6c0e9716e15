use std::{future::Future, time::Duration};

use crate::{Error, Remote, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub base_backoff: Duration,
	pub max_backoff: Duration,
}
impl RetryPolicy {
	/// Delay before attempt `attempt + 1`, doubling from the base and capped at the maximum.
	pub fn backoff(&self, attempt: u32) -> Duration {
		let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));

		self.base_backoff.saturating_mul(factor).min(self.max_backoff)
	}
}

impl From<&torque_config::Retry> for RetryPolicy {
	fn from(cfg: &torque_config::Retry) -> Self {
		Self {
			max_attempts: cfg.max_attempts.max(1),
			base_backoff: Duration::from_millis(cfg.base_backoff_ms),
			max_backoff: Duration::from_millis(cfg.max_backoff_ms),
		}
	}
}

/// Bounds a single remote call by `timeout`.
pub async fn timed<T, Fut>(remote: Remote, timeout: Duration, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	match tokio::time::timeout(timeout, fut).await {
		Ok(result) => result,
		Err(_) => Err(Error::Timeout { remote, timeout_ms: timeout.as_millis() as u64 }),
	}
}

/// Runs a read-only call under `timeout`, retrying unavailable or slow remotes.
///
/// Only idempotent reads go through here. Completions are never retried.
pub async fn read<T, F, Fut>(
	policy: RetryPolicy,
	remote: Remote,
	timeout: Duration,
	mut call: F,
) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let mut attempt = 1;

	loop {
		match timed(remote, timeout, call()).await {
			Ok(value) => return Ok(value),
			Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
				let delay = policy.backoff(attempt);

				tracing::warn!(
					remote = remote.as_str(),
					attempt,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"Remote call failed. Retrying."
				);
				tokio::time::sleep(delay).await;

				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicU32, Ordering};

	use super::*;

	fn instant_policy(max_attempts: u32) -> RetryPolicy {
		RetryPolicy { max_attempts, base_backoff: Duration::ZERO, max_backoff: Duration::ZERO }
	}

	#[test]
	fn backoff_doubles_and_caps() {
		let policy = RetryPolicy {
			max_attempts: 5,
			base_backoff: Duration::from_millis(100),
			max_backoff: Duration::from_millis(350),
		};

		assert_eq!(policy.backoff(1), Duration::from_millis(100));
		assert_eq!(policy.backoff(2), Duration::from_millis(200));
		assert_eq!(policy.backoff(3), Duration::from_millis(350));
		assert_eq!(policy.backoff(40), Duration::from_millis(350));
	}

	#[tokio::test]
	async fn retries_unavailable_until_success() {
		let calls = AtomicU32::new(0);
		let value = read(instant_policy(3), Remote::Graph, Duration::from_secs(1), || {
			let n = calls.fetch_add(1, Ordering::SeqCst);

			async move {
				if n < 2 {
					Err(Error::Unavailable { remote: Remote::Graph, message: "down".to_string() })
				} else {
					Ok(n)
				}
			}
		})
		.await
		.expect("third attempt should succeed");

		assert_eq!(value, 2);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn gives_up_after_max_attempts() {
		let calls = AtomicU32::new(0);
		let err = read(instant_policy(2), Remote::Embedding, Duration::from_secs(1), || {
			calls.fetch_add(1, Ordering::SeqCst);

			async {
				Err::<(), _>(Error::Unavailable {
					remote: Remote::Embedding,
					message: "down".to_string(),
				})
			}
		})
		.await
		.expect_err("should fail");

		assert!(matches!(err, Error::Unavailable { .. }));
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn query_errors_are_not_retried() {
		let calls = AtomicU32::new(0);
		let err = read(instant_policy(5), Remote::Graph, Duration::from_secs(1), || {
			calls.fetch_add(1, Ordering::SeqCst);

			async { Err::<(), _>(Error::Query { message: "bad index".to_string() }) }
		})
		.await
		.expect_err("should fail");

		assert!(matches!(err, Error::Query { .. }));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn slow_calls_time_out() {
		let err = timed(Remote::Completion, Duration::from_millis(5), async {
			tokio::time::sleep(Duration::from_secs(5)).await;

			Ok(())
		})
		.await
		.expect_err("should time out");

		assert!(matches!(err, Error::Timeout { remote: Remote::Completion, timeout_ms: 5 }));
	}
}
