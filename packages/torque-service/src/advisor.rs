use serde::Serialize;
use tracing::warn;

use torque_domain::{ConversationState, FusedResult, Turn};

use crate::{Error, Remote, Result, TorqueService, expand, prompt, retry};

/// Answer recorded when the completion service fails or returns nothing.
pub const FALLBACK_ANSWER: &str =
	"Sorry, an answer could not be generated right now. Please try again shortly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorStage {
	AwaitingQuery,
	Rephrasing,
	Retrieving,
	Expanding,
	Generating,
}
impl AdvisorStage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::AwaitingQuery => "awaiting_query",
			Self::Rephrasing => "rephrasing",
			Self::Retrieving => "retrieving",
			Self::Expanding => "expanding",
			Self::Generating => "generating",
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvisorReply {
	pub answer: String,
	/// Query the answer was generated for, after rephrasing.
	pub query_used: String,
	pub evidence: Vec<String>,
	pub results: Vec<FusedResult>,
}

impl TorqueService {
	/// Runs one conversational turn and records it in `conversation`.
	///
	/// Only a blank query is an error. Remote failures degrade the turn instead of aborting it,
	/// and a blank query leaves `conversation` untouched.
	pub async fn ask(&self, conversation: &mut ConversationState, query: &str) -> Result<AdvisorReply> {
		let query = query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let history = conversation.latest_assistant_content();

		conversation.push(Turn::user(query));

		enter(AdvisorStage::Rephrasing);

		let query_used = self.rephrase_query(&history, query).await;

		enter(AdvisorStage::Retrieving);

		// Search runs on the user's own wording by default. Only generation sees the rephrased
		// query unless `use_rephrased_query` is set.
		let search_text: &str =
			if self.cfg.retrieval.use_rephrased_query { &query_used } else { query };
		let results = self.retrieve_text(search_text).await;

		enter(AdvisorStage::Expanding);

		let entries = self.expand(&results).await;
		let evidence = expand::evidence_lines(&entries);

		enter(AdvisorStage::Generating);

		let answer = self.generate(&evidence, &query_used).await;

		conversation.push(Turn::assistant(query_used.as_str(), answer.as_str()));

		enter(AdvisorStage::AwaitingQuery);

		tracing::debug!(
			results = results.len(),
			evidence = evidence.len(),
			turns = conversation.len(),
			"Advisor turn finished."
		);

		Ok(AdvisorReply { answer, query_used, evidence, results })
	}

	async fn rephrase_query(&self, history: &str, query: &str) -> String {
		let text = prompt::rephrase(history, query);

		match self.complete(&text).await {
			Ok(rephrased) if !rephrased.trim().is_empty() => rephrased.trim().to_string(),
			Ok(_) => query.to_string(),
			Err(err) => {
				warn!(error = %err, "Rephrasing failed. Using the original query.");

				query.to_string()
			},
		}
	}

	async fn retrieve_text(&self, text: &str) -> Vec<FusedResult> {
		match self.embed_query(text).await {
			Ok(vector) => self.retrieve(text, Some(&vector)).await,
			Err(err) if self.cfg.retrieval.lexical_fallback => {
				warn!(error = %err, "Query embedding failed. Falling back to lexical search.");

				self.retrieve(text, None).await
			},
			Err(err) => {
				warn!(error = %err, "Query embedding failed. Continuing without evidence.");

				Vec::new()
			},
		}
	}

	async fn generate(&self, evidence: &[String], query: &str) -> String {
		let text = prompt::answer(evidence, query);

		match self.complete(&text).await {
			Ok(answer) if !answer.trim().is_empty() => answer,
			Ok(_) => {
				warn!("Completion returned an empty answer.");

				FALLBACK_ANSWER.to_string()
			},
			Err(err) => {
				warn!(error = %err, "Answer generation failed.");

				FALLBACK_ANSWER.to_string()
			},
		}
	}

	// Timed but never retried.
	async fn complete(&self, text: &str) -> Result<String> {
		retry::timed(
			Remote::Completion,
			self.call_timeout(),
			self.providers.completion.complete(&self.cfg.providers.llm, text),
		)
		.await
	}
}

fn enter(stage: AdvisorStage) {
	tracing::debug!(stage = stage.as_str(), "Advisor stage.");
}
