//! Cypher statements issued against the repair graph.
//!
//! Every statement is a compile-time constant. Index names, node names, vectors and search text
//! travel as parameters only.

macro_rules! evidence_relations {
	() => {
		"HAS_PROCEDURES|HAS_SUBCOMPONENT|HAS_TESTPROCEDURES|HAS_SUBPROBLEM|HAS_ADDITIONALINFO|HAS_SYMPTOM|HAS_SUSPECTAREA|HAS_BASICINFO"
	};
}

pub const VECTOR_TOP_K: &str = "\
CALL db.index.vector.queryNodes($index_name, $top_k, $query_vector)
YIELD node, score
WHERE score >= $threshold
RETURN node.name AS name, score
ORDER BY score DESC";

pub const FULLTEXT_TOP_K: &str = "\
CALL db.index.fulltext.queryNodes($index_name, $query_text)
YIELD node, score
RETURN node.name AS name, score
ORDER BY score DESC
LIMIT $top_k";

pub const PROBLEM_NEIGHBORHOOD: &str = concat!(
	"MATCH (problem:Problem {name: $node_name})-[:",
	evidence_relations!(),
	"]->(child)\n",
	"RETURN labels(child)[0] AS label, child.name AS name\n",
	"ORDER BY label, name",
);

pub const EVIDENCE_NEIGHBORHOOD: &str = concat!(
	"MATCH (problem:Problem)-[:",
	evidence_relations!(),
	"]->(node {name: $node_name})\n",
	"WHERE $label IN labels(node)\n",
	"WITH DISTINCT problem\n",
	"MATCH (problem)-[:",
	evidence_relations!(),
	"]->(child)\n",
	"RETURN labels(child)[0] AS label, child.name AS name\n",
	"ORDER BY problem.name, label, name",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
	VectorTopK,
	FulltextTopK,
	ProblemNeighborhood,
	EvidenceNeighborhood,
}
impl Query {
	pub fn name(self) -> &'static str {
		match self {
			Self::VectorTopK => "vector_top_k",
			Self::FulltextTopK => "fulltext_top_k",
			Self::ProblemNeighborhood => "problem_neighborhood",
			Self::EvidenceNeighborhood => "evidence_neighborhood",
		}
	}

	pub fn cypher(self) -> &'static str {
		match self {
			Self::VectorTopK => VECTOR_TOP_K,
			Self::FulltextTopK => FULLTEXT_TOP_K,
			Self::ProblemNeighborhood => PROBLEM_NEIGHBORHOOD,
			Self::EvidenceNeighborhood => EVIDENCE_NEIGHBORHOOD,
		}
	}
}
