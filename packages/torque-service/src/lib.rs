pub mod advisor;
pub mod expand;
pub mod fanout;
pub mod prompt;
pub mod retry;
pub mod search;

mod error;

pub use advisor::{AdvisorReply, AdvisorStage, FALLBACK_ANSWER};
pub use error::{Error, Remote, Result};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use torque_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use torque_domain::{FusionParams, Label, NeighborhoodEntry, NodeRef, ScoredCandidate};
use torque_providers::{completion, embedding};
use torque_storage::neo4j::Neo4jStore;

use crate::retry::RetryPolicy;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, Result<String>>;
}

/// Read-only access to the repair graph.
pub trait GraphStore
where
	Self: Send + Sync,
{
	fn vector_top_k<'a>(
		&'a self,
		label: Label,
		vector: &'a [f32],
		top_k: u32,
		threshold: f32,
	) -> BoxFuture<'a, Result<Vec<ScoredCandidate>>>;

	/// `query_text` arrives already escaped for the full-text index.
	fn fulltext_top_k<'a>(
		&'a self,
		label: Label,
		query_text: &'a str,
		top_k: u32,
	) -> BoxFuture<'a, Result<Vec<ScoredCandidate>>>;

	fn neighborhood<'a>(&'a self, node: &'a NodeRef) -> BoxFuture<'a, Result<Vec<NeighborhoodEntry>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		completion: Arc<dyn CompletionProvider>,
	) -> Self {
		Self { embedding, completion }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), completion: provider }
	}
}

pub struct TorqueService {
	pub cfg: Config,
	pub graph: Arc<dyn GraphStore>,
	pub providers: Providers,
}
impl TorqueService {
	pub fn new(cfg: Config, graph: Neo4jStore) -> Self {
		Self { cfg, graph: Arc::new(graph), providers: Providers::default() }
	}

	pub fn with_parts(cfg: Config, graph: Arc<dyn GraphStore>, providers: Providers) -> Self {
		Self { cfg, graph, providers }
	}

	pub(crate) fn fusion_params(&self) -> FusionParams {
		FusionParams {
			alpha: self.cfg.retrieval.alpha,
			top_k: self.cfg.retrieval.top_k as usize,
			similarity_threshold: self.cfg.retrieval.similarity_threshold,
		}
	}

	pub(crate) fn call_timeout(&self) -> Duration {
		Duration::from_millis(self.cfg.retrieval.call_timeout_ms)
	}

	pub(crate) fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy::from(&self.cfg.retrieval.retry)
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			embedding::embed(cfg, texts)
				.await
				.map_err(|err| Error::from_provider(Remote::Embedding, err))
		})
	}
}

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			completion::complete(cfg, prompt)
				.await
				.map_err(|err| Error::from_provider(Remote::Completion, err))
		})
	}
}

impl GraphStore for Neo4jStore {
	fn vector_top_k<'a>(
		&'a self,
		label: Label,
		vector: &'a [f32],
		top_k: u32,
		threshold: f32,
	) -> BoxFuture<'a, Result<Vec<ScoredCandidate>>> {
		Box::pin(async move { Ok(Neo4jStore::vector_top_k(self, label, vector, top_k, threshold).await?) })
	}

	fn fulltext_top_k<'a>(
		&'a self,
		label: Label,
		query_text: &'a str,
		top_k: u32,
	) -> BoxFuture<'a, Result<Vec<ScoredCandidate>>> {
		Box::pin(async move { Ok(Neo4jStore::fulltext_top_k(self, label, query_text, top_k).await?) })
	}

	fn neighborhood<'a>(&'a self, node: &'a NodeRef) -> BoxFuture<'a, Result<Vec<NeighborhoodEntry>>> {
		Box::pin(async move { Ok(Neo4jStore::neighborhood(self, node).await?) })
	}
}
