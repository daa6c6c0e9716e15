use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("Unknown node label {0:?}.")]
pub struct UnknownLabel(pub String);

/// Node labels present in the repair knowledge graph.
///
/// Every label owns one vector index and one full-text index. Index names are fixed strings so
/// that no caller-provided text is ever spliced into a query.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Label {
	Problem,
	Symptom,
	Procedures,
	SuspectArea,
	AdditionalInfo,
	BasicInfo,
	SubComponent,
	TestProcedures,
}
impl Label {
	pub const ALL: [Self; 8] = [
		Self::Problem,
		Self::Symptom,
		Self::Procedures,
		Self::SuspectArea,
		Self::AdditionalInfo,
		Self::BasicInfo,
		Self::SubComponent,
		Self::TestProcedures,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Problem => "Problem",
			Self::Symptom => "Symptom",
			Self::Procedures => "Procedures",
			Self::SuspectArea => "SuspectArea",
			Self::AdditionalInfo => "AdditionalInfo",
			Self::BasicInfo => "BasicInfo",
			Self::SubComponent => "SubComponent",
			Self::TestProcedures => "TestProcedures",
		}
	}

	pub fn vector_index(self) -> &'static str {
		match self {
			Self::Problem => "vectorIndex_Problem",
			Self::Symptom => "vectorIndex_Symptom",
			Self::Procedures => "vectorIndex_Procedures",
			Self::SuspectArea => "vectorIndex_SuspectArea",
			Self::AdditionalInfo => "vectorIndex_AdditionalInfo",
			Self::BasicInfo => "vectorIndex_BasicInfo",
			Self::SubComponent => "vectorIndex_SubComponent",
			Self::TestProcedures => "vectorIndex_TestProcedures",
		}
	}

	pub fn fulltext_index(self) -> &'static str {
		match self {
			Self::Problem => "search_Problem",
			Self::Symptom => "search_Symptom",
			Self::Procedures => "search_Procedures",
			Self::SuspectArea => "search_SuspectArea",
			Self::AdditionalInfo => "search_AdditionalInfo",
			Self::BasicInfo => "search_BasicInfo",
			Self::SubComponent => "search_SubComponent",
			Self::TestProcedures => "search_TestProcedures",
		}
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Label {
	type Err = UnknownLabel;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|label| label.as_str() == s.trim())
			.ok_or_else(|| UnknownLabel(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn index_names_follow_label() {
		for label in Label::ALL {
			assert_eq!(label.vector_index(), format!("vectorIndex_{}", label.as_str()));
			assert_eq!(label.fulltext_index(), format!("search_{}", label.as_str()));
		}
	}

	#[test]
	fn parses_known_labels_only() {
		assert_eq!("SuspectArea".parse::<Label>().expect("parse failed"), Label::SuspectArea);
		assert_eq!(" Symptom ".parse::<Label>().expect("parse failed"), Label::Symptom);
		assert!("Symptom) DETACH DELETE n //".parse::<Label>().is_err());
		assert!("symptom".parse::<Label>().is_err());
	}
}
