use serde::Deserialize;
use serde_json::{Map, Value};

use torque_domain::Label;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub retrieval: Retrieval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Live conversations kept in memory. The least valuable are evicted beyond this.
	#[serde(default = "default_conversation_capacity")]
	pub conversation_capacity: u64,
	/// A conversation untouched for this long is dropped.
	#[serde(default = "default_conversation_idle_ms")]
	pub conversation_idle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub graph: Graph,
}

/// Neo4j HTTP endpoint, e.g. `http://localhost:7474`.
#[derive(Debug, Clone, Deserialize)]
pub struct Graph {
	pub uri: String,
	#[serde(default = "default_database")]
	pub database: String,
	pub username: String,
	pub password: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	/// Omitted from the request when unset so the model default applies.
	pub dimensions: Option<u32>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
	/// Fusion weight of the vector channel.
	pub alpha: f32,
	pub top_k: u32,
	pub similarity_threshold: f32,
	#[serde(default = "default_target_labels")]
	pub target_labels: Vec<Label>,
	#[serde(default = "default_concurrency")]
	pub label_concurrency: u32,
	#[serde(default = "default_concurrency")]
	pub expansion_concurrency: u32,
	/// Outer bound on every remote call the service makes, completions included.
	/// Provider `timeout_ms` values must fit inside it.
	pub call_timeout_ms: u64,
	/// Search with the rephrased query instead of the user's original wording.
	#[serde(default)]
	pub use_rephrased_query: bool,
	/// Keep the lexical channel running when the query cannot be embedded.
	#[serde(default)]
	pub lexical_fallback: bool,
	#[serde(default)]
	pub retry: Retry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retry {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	pub base_backoff_ms: u64,
	pub max_backoff_ms: u64,
}
impl Default for Retry {
	fn default() -> Self {
		Self { max_attempts: 3, base_backoff_ms: 200, max_backoff_ms: 2_000 }
	}
}

fn default_conversation_capacity() -> u64 {
	10_000
}

fn default_conversation_idle_ms() -> u64 {
	30 * 60 * 1_000
}

fn default_database() -> String {
	"neo4j".to_string()
}

fn default_target_labels() -> Vec<Label> {
	vec![Label::SuspectArea, Label::Symptom]
}

fn default_concurrency() -> u32 {
	5
}
