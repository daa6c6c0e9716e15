use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Sends `prompt` as a single user message and returns the first choice's text.
///
/// An empty string is returned as-is; callers decide whether that counts as a failure.
pub async fn complete(cfg: &torque_config::LlmProviderConfig, prompt: &str) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_response(&json)
}

fn parse_completion_response(json: &Value) -> Result<String> {
	let message = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing choices[0].message.".to_string(),
		})?;

	match message.get("content") {
		Some(Value::String(content)) => Ok(content.clone()),
		Some(Value::Null) | None => Ok(String::new()),
		Some(_) => Err(Error::InvalidResponse {
			message: "Completion message content must be a string.".to_string(),
		}),
	}
}
