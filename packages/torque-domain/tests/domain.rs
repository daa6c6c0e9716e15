use torque_domain::{
	Channel, FusedResult, FusionParams, Label, NodeRef, ScoredCandidate,
	fusion::{fuse_channels, merge_labels},
	lucene,
};

fn hit(name: &str, label: Label, score: f32, channel: Channel) -> ScoredCandidate {
	ScoredCandidate {
		node: NodeRef::new(name, label).expect("Node name must be non-empty."),
		raw_score: score,
		channel,
	}
}

#[test]
fn ac_not_cooling_fuses_into_single_result() {
	let params = FusionParams { alpha: 0.6, top_k: 5, similarity_threshold: 0.75 };
	let vector = vec![hit("ac_not_cooling", Label::Symptom, 0.91, Channel::Vector)];
	let lexical = vec![hit("ac_not_cooling", Label::Symptom, 12.0, Channel::Fulltext)];
	let per_label = fuse_channels(&vector, &lexical, params);
	let merged = merge_labels([per_label, Vec::new()], params.top_k);

	assert_eq!(merged.len(), 1);
	assert_eq!(merged[0].node.name(), "ac_not_cooling");
	assert!((merged[0].confidence_score - 0.946).abs() < 1e-6);
}

#[test]
fn fusion_is_idempotent() {
	let params = FusionParams { alpha: 0.3, top_k: 4, similarity_threshold: 0.5 };
	let vector = vec![
		hit("blower motor", Label::SuspectArea, 0.77, Channel::Vector),
		hit("cabin filter", Label::SuspectArea, 0.77, Channel::Vector),
		hit("relay", Label::SuspectArea, 0.6, Channel::Vector),
	];
	let lexical = vec![
		hit("relay", Label::SuspectArea, 3.2, Channel::Fulltext),
		hit("fuse", Label::SuspectArea, 6.4, Channel::Fulltext),
	];
	let first: Vec<FusedResult> = fuse_channels(&vector, &lexical, params);
	let second: Vec<FusedResult> = fuse_channels(&vector, &lexical, params);

	assert_eq!(first, second);
	assert!(first.len() <= 4);
}

#[test]
fn labels_deserialize_from_graph_names() {
	let labels: Vec<Label> =
		serde_json::from_str(r#"["SuspectArea", "Symptom", "TestProcedures"]"#)
			.expect("Failed to parse labels.");

	assert_eq!(labels, vec![Label::SuspectArea, Label::Symptom, Label::TestProcedures]);
	assert!(serde_json::from_str::<Label>(r#""Engine""#).is_err());
}

#[test]
fn lexical_query_is_escaped() {
	assert_eq!(lucene::escape("a+b"), "a\\+b");
	assert_eq!(lucene::escape("(12V) ~ok?"), "\\(12V\\) \\~ok\\?");
}
