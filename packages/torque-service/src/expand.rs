use tracing::warn;

use torque_domain::{FusedResult, NeighborhoodEntry};

use crate::{Remote, TorqueService, fanout, retry};

impl TorqueService {
	/// One-hop evidence for every result, flattened in result order.
	///
	/// Duplicates across results are kept. A failed expansion is logged and contributes nothing.
	pub async fn expand(&self, results: &[FusedResult]) -> Vec<NeighborhoodEntry> {
		let per_result = fanout::join_bounded(
			results.iter().map(|result| result.node.clone()).collect::<Vec<_>>(),
			self.cfg.retrieval.expansion_concurrency as usize,
			|node| async move {
				let outcome = retry::read(self.retry_policy(), Remote::Graph, self.call_timeout(), || {
					self.graph.neighborhood(&node)
				})
				.await;

				match outcome {
					Ok(entries) => entries,
					Err(err) => {
						warn!(
							label = node.label().as_str(),
							name = node.name(),
							error = %err,
							"Expansion failed."
						);

						Vec::new()
					},
				}
			},
		)
		.await;

		per_result.into_iter().flatten().collect()
	}
}

/// Renders entries as `type: name` lines for the answer prompt.
pub fn evidence_lines(entries: &[NeighborhoodEntry]) -> Vec<String> {
	entries.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_type_and_name() {
		let entries = vec![
			NeighborhoodEntry { kind: "Procedures".to_string(), name: "Check fuse F12".to_string() },
			NeighborhoodEntry { kind: "Procedures".to_string(), name: "Check fuse F12".to_string() },
		];

		assert_eq!(
			evidence_lines(&entries),
			vec!["Procedures: Check fuse F12", "Procedures: Check fuse F12"]
		);
	}
}
