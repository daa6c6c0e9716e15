/// Characters with meaning in Lucene query syntax.
pub const RESERVED: [char; 17] =
	['+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/'];

/// Prefixes every reserved character with a backslash so the text is matched literally.
pub fn escape(query: &str) -> String {
	let mut out = String::with_capacity(query.len() + 8);

	for ch in query.chars() {
		if RESERVED.contains(&ch) {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}
