mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Graph, LlmProviderConfig, Providers, Retrieval, Retry,
	Service, Storage,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::validation("service.http_bind must be non-empty."));
	}
	if cfg.service.conversation_capacity == 0 {
		return Err(Error::validation("service.conversation_capacity must be greater than zero."));
	}
	if cfg.service.conversation_idle_ms == 0 {
		return Err(Error::validation("service.conversation_idle_ms must be greater than zero."));
	}
	if cfg.storage.graph.uri.trim().is_empty() {
		return Err(Error::validation("storage.graph.uri must be non-empty."));
	}
	if cfg.storage.graph.database.trim().is_empty() {
		return Err(Error::validation("storage.graph.database must be non-empty."));
	}
	if cfg.storage.graph.timeout_ms == 0 {
		return Err(Error::validation("storage.graph.timeout_ms must be greater than zero."));
	}

	for (label, key) in
		[("embedding", &cfg.providers.embedding.api_key), ("llm", &cfg.providers.llm.api_key)]
	{
		if key.trim().is_empty() {
			return Err(Error::validation(format!("Provider {label} api_key must be non-empty.")));
		}
	}
	for (label, timeout_ms) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("llm", cfg.providers.llm.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::validation(format!(
				"Provider {label} timeout_ms must be greater than zero."
			)));
		}
	}

	if cfg.providers.embedding.dimensions == Some(0) {
		return Err(Error::validation(
			"providers.embedding.dimensions must be greater than zero when set.",
		));
	}
	if !cfg.providers.llm.temperature.is_finite() || cfg.providers.llm.temperature < 0.0 {
		return Err(Error::validation(
			"providers.llm.temperature must be a finite number, zero or greater.",
		));
	}

	validate_retrieval(&cfg.retrieval)?;

	for (label, timeout_ms) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("llm", cfg.providers.llm.timeout_ms),
	] {
		if timeout_ms > cfg.retrieval.call_timeout_ms {
			return Err(Error::validation(format!(
				"Provider {label} timeout_ms must not exceed retrieval.call_timeout_ms."
			)));
		}
	}

	Ok(())
}

fn validate_retrieval(retrieval: &Retrieval) -> Result<()> {
	for (label, value) in
		[("alpha", retrieval.alpha), ("similarity_threshold", retrieval.similarity_threshold)]
	{
		if !value.is_finite() {
			return Err(Error::validation(format!("retrieval.{label} must be a finite number.")));
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::validation(format!(
				"retrieval.{label} must be in the range 0.0-1.0."
			)));
		}
	}

	if retrieval.top_k == 0 {
		return Err(Error::validation("retrieval.top_k must be greater than zero."));
	}
	if retrieval.target_labels.is_empty() {
		return Err(Error::validation("retrieval.target_labels must be non-empty."));
	}

	let mut seen = HashSet::new();

	for label in &retrieval.target_labels {
		if !seen.insert(*label) {
			return Err(Error::validation(format!(
				"retrieval.target_labels lists {label} more than once."
			)));
		}
	}

	if retrieval.label_concurrency == 0 {
		return Err(Error::validation("retrieval.label_concurrency must be greater than zero."));
	}
	if retrieval.expansion_concurrency == 0 {
		return Err(Error::validation(
			"retrieval.expansion_concurrency must be greater than zero.",
		));
	}
	if retrieval.call_timeout_ms == 0 {
		return Err(Error::validation("retrieval.call_timeout_ms must be greater than zero."));
	}
	if retrieval.retry.max_attempts == 0 {
		return Err(Error::validation("retrieval.retry.max_attempts must be greater than zero."));
	}
	if retrieval.retry.base_backoff_ms > retrieval.retry.max_backoff_ms {
		return Err(Error::validation(
			"retrieval.retry.base_backoff_ms must not exceed retrieval.retry.max_backoff_ms.",
		));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	trim_trailing_slash(&mut cfg.storage.graph.uri);
	trim_trailing_slash(&mut cfg.providers.embedding.api_base);
	trim_trailing_slash(&mut cfg.providers.llm.api_base);
}

fn trim_trailing_slash(value: &mut String) {
	let trimmed = value.trim().trim_end_matches('/').to_string();

	*value = trimmed;
}
