use reqwest::header::{AUTHORIZATION, HeaderName};
use serde_json::{Map, Value};

#[test]
fn builds_bearer_auth_header() {
	let headers =
		torque_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn forwards_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("OpenAI-Organization".to_string(), Value::String("org-1".to_string()));

	let headers =
		torque_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");
	let name = HeaderName::from_static("openai-organization");

	assert_eq!(headers.get(name).expect("Missing default header."), "org-1");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("X-Retries".to_string(), Value::from(3));

	let err = torque_providers::auth_headers("secret", &defaults)
		.expect_err("Expected invalid header config.");

	assert!(matches!(err, torque_providers::Error::InvalidConfig { .. }));
	assert!(!err.is_transient());
}
