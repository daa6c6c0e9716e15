use std::fmt;

use serde::Serialize;

use crate::Label;

/// A graph node identified by its name within a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
	name: String,
	label: Label,
}
impl NodeRef {
	/// Returns `None` for blank names.
	pub fn new(name: impl Into<String>, label: Label) -> Option<Self> {
		let name = name.into();

		if name.trim().is_empty() {
			return None;
		}

		Some(Self { name, label })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn label(&self) -> Label {
		self.label
	}
}

/// A node one hop away from a retrieved result, used only as prompt evidence.
///
/// `kind` stays a plain string because it is whatever label the store reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NeighborhoodEntry {
	#[serde(rename = "type")]
	pub kind: String,
	pub name: String,
}

impl fmt::Display for NeighborhoodEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.kind, self.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_blank_names() {
		assert!(NodeRef::new("", Label::Symptom).is_none());
		assert!(NodeRef::new("  \t", Label::Symptom).is_none());

		let node = NodeRef::new("ac_not_cooling", Label::Symptom).expect("node expected");

		assert_eq!(node.name(), "ac_not_cooling");
		assert_eq!(node.label(), Label::Symptom);
	}

	#[test]
	fn renders_evidence_line() {
		let entry = NeighborhoodEntry {
			kind: "Procedures".to_string(),
			name: "check refrigerant pressure".to_string(),
		};

		assert_eq!(entry.to_string(), "Procedures: check refrigerant pressure");
		assert_eq!(
			serde_json::to_value(&entry).expect("serialize failed"),
			serde_json::json!({ "type": "Procedures", "name": "check refrigerant pressure" })
		);
	}
}
