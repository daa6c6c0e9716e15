use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use torque_domain::{Channel, Label, NeighborhoodEntry, NodeRef, ScoredCandidate};

use crate::{
	Error, Result,
	queries::Query,
};

/// Graph store reached through the Neo4j HTTP transactional endpoint.
///
/// Each statement is committed in its own request, so no session or transaction handle is ever
/// shared between concurrent callers. Only the pooled HTTP client is.
pub struct Neo4jStore {
	client: Client,
	commit_url: String,
	username: String,
	password: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
	#[serde(default)]
	results: Vec<StatementResult>,
	#[serde(default)]
	errors: Vec<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
	columns: Vec<String>,
	#[serde(default)]
	data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
	row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
	code: String,
	message: String,
}

impl Neo4jStore {
	pub fn new(cfg: &torque_config::Graph) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let commit_url =
			format!("{}/db/{}/tx/commit", cfg.uri.trim_end_matches('/'), cfg.database.trim());

		Ok(Self {
			client,
			commit_url,
			username: cfg.username.clone(),
			password: cfg.password.clone(),
		})
	}

	/// Top `top_k` nodes of `label` by cosine similarity, keeping only scores `>= threshold`.
	pub async fn vector_top_k(
		&self,
		label: Label,
		vector: &[f32],
		top_k: u32,
		threshold: f32,
	) -> Result<Vec<ScoredCandidate>> {
		let params = serde_json::json!({
			"index_name": label.vector_index(),
			"top_k": top_k,
			"query_vector": vector,
			"threshold": threshold,
		});
		let result = self.run(Query::VectorTopK, params).await?;

		parse_scored(&result, label, Channel::Vector)
	}

	/// Full-text search over the label's index. `query_text` must already be escaped.
	pub async fn fulltext_top_k(
		&self,
		label: Label,
		query_text: &str,
		top_k: u32,
	) -> Result<Vec<ScoredCandidate>> {
		let params = serde_json::json!({
			"index_name": label.fulltext_index(),
			"query_text": query_text,
			"top_k": top_k,
		});
		let result = self.run(Query::FulltextTopK, params).await?;

		parse_scored(&result, label, Channel::Fulltext)
	}

	/// One-hop evidence around `node`.
	///
	/// A `Problem` is expanded directly. Any other node is first resolved to the problems that
	/// own it, and those problems are expanded instead.
	pub async fn neighborhood(&self, node: &NodeRef) -> Result<Vec<NeighborhoodEntry>> {
		let (query, params) = neighborhood_statement(node);
		let result = self.run(query, params).await?;

		parse_neighborhood(&result)
	}

	async fn run(&self, query: Query, parameters: Value) -> Result<StatementResult> {
		let body = serde_json::json!({
			"statements": [{
				"statement": query.cypher(),
				"parameters": parameters,
				"resultDataContents": ["row"],
			}]
		});
		let res = self
			.client
			.post(&self.commit_url)
			.basic_auth(&self.username, Some(&self.password))
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		take_single_result(query, json)
	}
}

/// Problems expand forward. Any other node is matched by name and label to its owning problems.
fn neighborhood_statement(node: &NodeRef) -> (Query, Value) {
	match node.label() {
		Label::Problem =>
			(Query::ProblemNeighborhood, serde_json::json!({ "node_name": node.name() })),
		label => (
			Query::EvidenceNeighborhood,
			serde_json::json!({ "node_name": node.name(), "label": label.as_str() }),
		),
	}
}

fn take_single_result(query: Query, json: Value) -> Result<StatementResult> {
	let response: CommitResponse = serde_json::from_value(json)?;

	if let Some(err) = response.errors.into_iter().next() {
		return Err(Error::Query { query: query.name(), code: err.code, message: err.message });
	}

	response.results.into_iter().next().ok_or_else(|| {
		Error::InvalidResponse(format!("No result returned for {}.", query.name()))
	})
}

fn column(result: &StatementResult, name: &str) -> Result<usize> {
	result
		.columns
		.iter()
		.position(|column| column == name)
		.ok_or_else(|| Error::InvalidResponse(format!("Missing column {name}.")))
}

fn parse_scored(
	result: &StatementResult,
	label: Label,
	channel: Channel,
) -> Result<Vec<ScoredCandidate>> {
	let name_idx = column(result, "name")?;
	let score_idx = column(result, "score")?;
	let mut out = Vec::with_capacity(result.data.len());

	for data in &result.data {
		let name = data.row.get(name_idx).and_then(Value::as_str).unwrap_or_default();
		let Some(node) = NodeRef::new(name, label) else {
			tracing::warn!(label = label.as_str(), "Skipping scored node without a name.");

			continue;
		};
		let Some(score) = data.row.get(score_idx).and_then(Value::as_f64) else {
			tracing::warn!(label = label.as_str(), name, "Skipping scored node without a score.");

			continue;
		};

		out.push(ScoredCandidate { node, raw_score: score as f32, channel });
	}

	Ok(out)
}

fn parse_neighborhood(result: &StatementResult) -> Result<Vec<NeighborhoodEntry>> {
	let label_idx = column(result, "label")?;
	let name_idx = column(result, "name")?;

	Ok(result
		.data
		.iter()
		.filter_map(|data| {
			let kind = data.row.get(label_idx).and_then(Value::as_str)?;
			let name = data.row.get(name_idx).and_then(Value::as_str)?;

			(!kind.is_empty() && !name.trim().is_empty())
				.then(|| NeighborhoodEntry { kind: kind.to_string(), name: name.to_string() })
		})
		.collect())
}
