use tracing::warn;

use torque_domain::{FusedResult, Label, ScoredCandidate, fusion, lucene};

use crate::{Error, Remote, Result, TorqueService, fanout, retry};

impl TorqueService {
	/// Hybrid search over a single label.
	///
	/// Without a query vector only the lexical channel contributes. A failing channel is logged
	/// and counts as empty.
	pub async fn search(
		&self,
		query_text: &str,
		query_vector: Option<&[f32]>,
		label: Label,
	) -> Vec<FusedResult> {
		let (vector, lexical) =
			tokio::join!(self.vector_channel(query_vector, label), self.lexical_channel(query_text, label));
		let fused = fusion::fuse_channels(&vector, &lexical, self.fusion_params());

		tracing::debug!(
			label = label.as_str(),
			vector_hits = vector.len(),
			lexical_hits = lexical.len(),
			fused = fused.len(),
			"Label search finished."
		);

		fused
	}

	/// Searches every target label and merges the results into a global top K.
	pub async fn retrieve(&self, query_text: &str, query_vector: Option<&[f32]>) -> Vec<FusedResult> {
		let labels = self.cfg.retrieval.target_labels.iter().copied();
		let per_label = fanout::join_bounded(
			labels,
			self.cfg.retrieval.label_concurrency as usize,
			|label| self.search(query_text, query_vector, label),
		)
		.await;

		fusion::merge_labels(per_label, self.cfg.retrieval.top_k as usize)
	}

	pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let texts = vec![text.to_string()];
		let vectors = retry::read(self.retry_policy(), Remote::Embedding, self.call_timeout(), || {
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts)
		})
		.await?;

		vectors
			.into_iter()
			.next()
			.filter(|vector| !vector.is_empty())
			.ok_or(Error::Empty { remote: Remote::Embedding })
	}

	async fn vector_channel(&self, query_vector: Option<&[f32]>, label: Label) -> Vec<ScoredCandidate> {
		let Some(vector) = query_vector else {
			return Vec::new();
		};
		let top_k = self.cfg.retrieval.top_k;
		let threshold = self.cfg.retrieval.similarity_threshold;
		let result = retry::read(self.retry_policy(), Remote::Graph, self.call_timeout(), || {
			self.graph.vector_top_k(label, vector, top_k, threshold)
		})
		.await;

		match result {
			Ok(hits) => hits,
			Err(err) => {
				warn!(label = label.as_str(), error = %err, "Vector channel failed.");

				Vec::new()
			},
		}
	}

	async fn lexical_channel(&self, query_text: &str, label: Label) -> Vec<ScoredCandidate> {
		let escaped = lucene::escape(query_text.trim());

		if escaped.is_empty() {
			return Vec::new();
		}

		let top_k = self.cfg.retrieval.top_k;
		let result = retry::read(self.retry_policy(), Remote::Graph, self.call_timeout(), || {
			self.graph.fulltext_top_k(label, &escaped, top_k)
		})
		.await;

		match result {
			Ok(hits) => hits,
			Err(err) => {
				warn!(label = label.as_str(), error = %err, "Lexical channel failed.");

				Vec::new()
			},
		}
	}
}
