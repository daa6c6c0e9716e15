use std::future::Future;

use futures::{StreamExt, stream};

/// Runs `f` over `items` with at most `limit` calls in flight.
///
/// Outputs keep the order of `items`. Dropping the returned future cancels every call still
/// pending.
pub async fn join_bounded<I, F, Fut, T>(items: I, limit: usize, f: F) -> Vec<T>
where
	I: IntoIterator,
	F: FnMut(I::Item) -> Fut,
	Fut: Future<Output = T>,
{
	stream::iter(items).map(f).buffered(limit.max(1)).collect().await
}

#[cfg(test)]
mod tests {
	use std::{
		sync::{
			Arc,
			atomic::{AtomicUsize, Ordering},
		},
		time::Duration,
	};

	use super::*;

	#[tokio::test]
	async fn never_exceeds_the_limit_and_keeps_input_order() {
		let active = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));
		let out = join_bounded(0..12_u64, 3, |n| {
			let active = active.clone();
			let peak = peak.clone();

			async move {
				let now = active.fetch_add(1, Ordering::SeqCst) + 1;

				peak.fetch_max(now, Ordering::SeqCst);
				tokio::time::sleep(Duration::from_millis(12 - n)).await;
				active.fetch_sub(1, Ordering::SeqCst);

				n * 10
			}
		})
		.await;

		assert_eq!(out, (0..12_u64).map(|n| n * 10).collect::<Vec<_>>());
		assert!(peak.load(Ordering::SeqCst) <= 3);
	}

	#[tokio::test]
	async fn zero_limit_still_makes_progress() {
		let out = join_bounded(["a", "b"], 0, |s| async move { s.len() }).await;

		assert_eq!(out, vec![1, 1]);
	}
}
