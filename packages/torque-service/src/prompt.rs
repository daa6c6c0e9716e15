//! Prompt text sent to the completion service.

pub fn rephrase(history: &str, query: &str) -> String {
	let instructions = "Rewrite the follow-up query below so it can be searched on its own. \
Replace pronouns and indirect references with the vehicles, parts and problems they refer to in \
the conversation history. Keep the original intent. If the query is already self-contained, \
return it unchanged. Return only the query, with no explanation.";

	format!("{instructions}\n\nConversation history:\n{history}\n\nQuery:\n{query}")
}

pub fn answer(evidence: &[String], query: &str) -> String {
	let instructions = "You are an automobile service advisor answering a technician or vehicle \
owner. Use only the repair knowledge listed under Evidence. Keep any numeric values it gives, \
such as pressures, voltages or temperatures. When several problems or procedures match, list \
each one. Prefer short bullet points.\n\
If the evidence does not cover the query, say that no relevant repair information was found \
and do not answer from general knowledge.";
	let evidence = if evidence.is_empty() { "(none)".to_string() } else { evidence.join("\n") };

	format!("{instructions}\n\nEvidence:\n{evidence}\n\nQuery:\n{query}")
}
