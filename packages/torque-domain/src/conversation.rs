use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	User,
	Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
	pub role: Role,
	pub content: String,
	/// Query the answer was generated for. Only set on assistant turns.
	pub query: Option<String>,
}
impl Turn {
	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into(), query: None }
	}

	pub fn assistant(query: impl Into<String>, answer: impl Into<String>) -> Self {
		Self { role: Role::Assistant, content: answer.into(), query: Some(query.into()) }
	}

	/// Text fed back to the rephrasing prompt.
	pub fn history_text(&self) -> String {
		match (&self.role, &self.query) {
			(Role::Assistant, Some(query)) => format!("user_query:{query},response:{}", self.content),
			_ => self.content.clone(),
		}
	}
}

/// Append-only turn log for a single conversation.
///
/// There is no interior mutability: the owner hands out `&mut` to exactly one turn at a time.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
	turns: Vec<Turn>,
}
impl ConversationState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, turn: Turn) {
		self.turns.push(turn);
	}

	pub fn turns(&self) -> &[Turn] {
		&self.turns
	}

	pub fn len(&self) -> usize {
		self.turns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.turns.is_empty()
	}

	/// History text of the most recent assistant turn, or an empty string.
	pub fn latest_assistant_content(&self) -> String {
		self.turns
			.iter()
			.rev()
			.find(|turn| turn.role == Role::Assistant)
			.map(Turn::history_text)
			.unwrap_or_default()
	}
}
