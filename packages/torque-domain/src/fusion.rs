//! Score normalization and weighted fusion of vector and lexical evidence.
//!
//! All functions here are pure. Concurrency lives in the service layer, and the ordering
//! produced here is total, so results never depend on which remote call finished first.

use std::{
	cmp::Ordering,
	collections::{HashMap, hash_map::Entry},
};

use serde::Serialize;

use crate::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
	Vector,
	Fulltext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
	pub node: NodeRef,
	pub raw_score: f32,
	pub channel: Channel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedResult {
	pub node: NodeRef,
	pub confidence_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
	/// Weight of the vector channel; the lexical channel gets `1 - alpha`.
	pub alpha: f32,
	pub top_k: usize,
	pub similarity_threshold: f32,
}

#[derive(Debug)]
struct Evidence {
	node: NodeRef,
	vector: Option<f32>,
	lexical: Option<f32>,
}

/// Fuses the two channels of one label search into at most `top_k` results.
pub fn fuse_channels(
	vector: &[ScoredCandidate],
	lexical: &[ScoredCandidate],
	params: FusionParams,
) -> Vec<FusedResult> {
	if params.top_k == 0 {
		return Vec::new();
	}

	let mut by_name: HashMap<&str, Evidence> = HashMap::new();
	let mut order: Vec<&str> = Vec::new();

	for (node, score) in normalize_vector(vector, params) {
		let slot = match by_name.entry(node.name()) {
			Entry::Occupied(entry) => entry.into_mut(),
			Entry::Vacant(entry) => {
				order.push(node.name());
				entry.insert(Evidence { node: node.clone(), vector: None, lexical: None })
			},
		};

		slot.vector = Some(slot.vector.map_or(score, |prev| prev.max(score)));
	}
	for (node, score) in normalize_lexical(lexical, params.top_k) {
		let slot = match by_name.entry(node.name()) {
			Entry::Occupied(entry) => entry.into_mut(),
			Entry::Vacant(entry) => {
				order.push(node.name());
				entry.insert(Evidence { node: node.clone(), vector: None, lexical: None })
			},
		};

		slot.lexical = Some(slot.lexical.map_or(score, |prev| prev.max(score)));
	}

	let alpha = params.alpha;
	let mut fused: Vec<FusedResult> = order
		.into_iter()
		.filter_map(|name| by_name.remove(name))
		.map(|evidence| FusedResult {
			confidence_score: confidence(alpha, evidence.vector, evidence.lexical),
			node: evidence.node,
		})
		.collect();

	fused.sort_by(cmp_fused);
	fused.truncate(params.top_k);

	fused
}

/// Merges per-label results, keeping the best confidence per node name.
pub fn merge_labels<I>(per_label: I, top_k: usize) -> Vec<FusedResult>
where
	I: IntoIterator<Item = Vec<FusedResult>>,
{
	let mut best: HashMap<String, FusedResult> = HashMap::new();

	for result in per_label.into_iter().flatten() {
		match best.entry(result.node.name().to_string()) {
			Entry::Occupied(mut entry) =>
				if cmp_fused(&result, entry.get()) == Ordering::Less {
					entry.insert(result);
				},
			Entry::Vacant(entry) => {
				entry.insert(result);
			},
		}
	}

	let mut merged: Vec<FusedResult> = best.into_values().collect();

	merged.sort_by(cmp_fused);
	merged.truncate(top_k);

	merged
}

/// `alpha * v + (1 - alpha) * f`; an absent channel contributes zero.
pub fn confidence(alpha: f32, vector: Option<f32>, lexical: Option<f32>) -> f32 {
	alpha * vector.unwrap_or(0.0) + (1.0 - alpha) * lexical.unwrap_or(0.0)
}

/// Confidence descending, then node name ascending, then label name ascending.
pub fn cmp_fused(left: &FusedResult, right: &FusedResult) -> Ordering {
	cmp_f32_desc(left.confidence_score, right.confidence_score)
		.then_with(|| left.node.name().cmp(right.node.name()))
		.then_with(|| left.node.label().as_str().cmp(right.node.label().as_str()))
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

fn normalize_vector(
	candidates: &[ScoredCandidate],
	params: FusionParams,
) -> Vec<(&NodeRef, f32)> {
	let mut kept: Vec<(&NodeRef, f32)> = candidates
		.iter()
		.filter(|candidate| candidate.raw_score.is_finite())
		.filter(|candidate| candidate.raw_score >= params.similarity_threshold)
		.map(|candidate| (&candidate.node, candidate.raw_score.clamp(0.0, 1.0)))
		.collect();

	kept.sort_by(|left, right| {
		cmp_f32_desc(left.1, right.1).then_with(|| left.0.name().cmp(right.0.name()))
	});
	kept.truncate(params.top_k);

	kept
}

fn normalize_lexical(candidates: &[ScoredCandidate], top_k: usize) -> Vec<(&NodeRef, f32)> {
	let mut kept: Vec<(&NodeRef, f32)> = candidates
		.iter()
		.filter(|candidate| candidate.raw_score.is_finite())
		.map(|candidate| (&candidate.node, candidate.raw_score))
		.collect();

	kept.sort_by(|left, right| {
		cmp_f32_desc(left.1, right.1).then_with(|| left.0.name().cmp(right.0.name()))
	});
	kept.truncate(top_k);

	let max = kept.iter().map(|(_, score)| *score).fold(0.0_f32, f32::max);

	kept.into_iter()
		.map(|(node, score)| {
			let normalized = if max > 0.0 { (score / max).clamp(0.0, 1.0) } else { 0.0 };

			(node, normalized)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Label;

	const EPS: f32 = 1e-6;

	fn candidate(name: &str, label: Label, score: f32, channel: Channel) -> ScoredCandidate {
		ScoredCandidate {
			node: NodeRef::new(name, label).expect("node expected"),
			raw_score: score,
			channel,
		}
	}

	fn params(alpha: f32, top_k: usize, threshold: f32) -> FusionParams {
		FusionParams { alpha, top_k, similarity_threshold: threshold }
	}

	fn fused(name: &str, label: Label, score: f32) -> FusedResult {
		FusedResult {
			node: NodeRef::new(name, label).expect("node expected"),
			confidence_score: score,
		}
	}

	#[test]
	fn sums_both_channels_for_shared_node() {
		let vector = [candidate("ac_not_cooling", Label::Symptom, 0.91, Channel::Vector)];
		let lexical = [candidate("ac_not_cooling", Label::Symptom, 12.0, Channel::Fulltext)];
		let out = fuse_channels(&vector, &lexical, params(0.6, 5, 0.75));

		assert_eq!(out.len(), 1);
		assert!((out[0].confidence_score - 0.946).abs() < EPS, "got {}", out[0].confidence_score);
	}

	#[test]
	fn weighted_sum_is_not_max() {
		let vector = [candidate("x", Label::Symptom, 0.8, Channel::Vector)];
		let lexical = [
			candidate("x", Label::Symptom, 5.0, Channel::Fulltext),
			candidate("y", Label::Symptom, 10.0, Channel::Fulltext),
		];
		let out = fuse_channels(&vector, &lexical, params(0.5, 5, 0.0));
		let x = out.iter().find(|r| r.node.name() == "x").expect("x expected");

		assert!((x.confidence_score - (0.5 * 0.8 + 0.5 * 0.5)).abs() < EPS);
		assert_ne!(x.confidence_score, f32::max(0.5 * 0.8, 0.5 * 0.5));
	}

	#[test]
	fn lexical_only_scores_are_relative_to_max() {
		let lexical = [
			candidate("first", Label::Symptom, 8.0, Channel::Fulltext),
			candidate("second", Label::Symptom, 4.0, Channel::Fulltext),
		];
		let out = fuse_channels(&[], &lexical, params(0.6, 5, 0.75));

		assert_eq!(out.len(), 2);
		assert_eq!(out[0].node.name(), "first");
		assert!((out[0].confidence_score - 0.4).abs() < EPS);
		assert_eq!(out[1].node.name(), "second");
		assert!((out[1].confidence_score - 0.2).abs() < EPS);
	}

	#[test]
	fn drops_vector_hits_below_threshold() {
		let vector = [
			candidate("keep", Label::SuspectArea, 0.8, Channel::Vector),
			candidate("drop", Label::SuspectArea, 0.5, Channel::Vector),
		];
		let out = fuse_channels(&vector, &[], params(1.0, 5, 0.75));

		assert_eq!(out.len(), 1);
		assert_eq!(out[0].node.name(), "keep");
	}

	#[test]
	fn zero_max_relevance_normalizes_to_zero() {
		let lexical = [candidate("flat", Label::Symptom, 0.0, Channel::Fulltext)];
		let out = fuse_channels(&[], &lexical, params(0.6, 5, 0.75));

		assert_eq!(out.len(), 1);
		assert_eq!(out[0].confidence_score, 0.0);
	}

	#[test]
	fn truncates_and_breaks_ties_by_name() {
		let lexical: Vec<ScoredCandidate> = ["delta", "alpha", "charlie", "bravo"]
			.into_iter()
			.map(|name| candidate(name, Label::Symptom, 3.0, Channel::Fulltext))
			.collect();
		let out = fuse_channels(&[], &lexical, params(0.6, 3, 0.75));
		let names: Vec<&str> = out.iter().map(|r| r.node.name()).collect();

		assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
	}

	#[test]
	fn output_is_sorted_unique_and_bounded() {
		let vector = [
			candidate("a", Label::Symptom, 0.99, Channel::Vector),
			candidate("b", Label::Symptom, 0.80, Channel::Vector),
			candidate("a", Label::Symptom, 0.90, Channel::Vector),
		];
		let lexical = [
			candidate("c", Label::Symptom, 2.0, Channel::Fulltext),
			candidate("b", Label::Symptom, 9.0, Channel::Fulltext),
			candidate("d", Label::Symptom, 1.0, Channel::Fulltext),
		];
		let out = fuse_channels(&vector, &lexical, params(0.6, 3, 0.75));

		assert!(out.len() <= 3);
		assert!(out.windows(2).all(|w| w[0].confidence_score >= w[1].confidence_score));

		let mut names: Vec<&str> = out.iter().map(|r| r.node.name()).collect();

		names.sort_unstable();
		names.dedup();

		assert_eq!(names.len(), out.len());
	}

	#[test]
	fn merge_keeps_highest_confidence_per_name() {
		let symptoms = vec![fused("leak", Label::Symptom, 0.3), fused("noise", Label::Symptom, 0.5)];
		let areas = vec![fused("leak", Label::SuspectArea, 0.7), fused("fan", Label::SuspectArea, 0.1)];
		let out = merge_labels([symptoms, areas], 5);
		let summary: Vec<(&str, Label)> =
			out.iter().map(|r| (r.node.name(), r.node.label())).collect();

		assert_eq!(
			summary,
			vec![("leak", Label::SuspectArea), ("noise", Label::Symptom), ("fan", Label::SuspectArea)]
		);
	}

	#[test]
	fn merge_is_independent_of_input_order() {
		let first = vec![fused("a", Label::Symptom, 0.4), fused("b", Label::Symptom, 0.4)];
		let second = vec![fused("a", Label::SuspectArea, 0.4), fused("c", Label::SuspectArea, 0.9)];
		let forward = merge_labels([first.clone(), second.clone()], 2);
		let backward = merge_labels([second, first], 2);

		assert_eq!(forward, backward);
		assert_eq!(forward[0].node.name(), "c");
		assert_eq!(forward[1].node.name(), "a");
		assert_eq!(forward[1].node.label(), Label::SuspectArea);
	}
}
