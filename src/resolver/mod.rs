//! Duplicate pair resolution.
//!
//! Given similar pairs and per-folder quality scores, classify each pair as
//! "prefer one side" or "ambiguous". Classification only - nothing here
//! deletes, moves, or prompts. Ties and missing scores both resolve to
//! [`Decision::Ambiguous`]: the tool never invents a preference ahead of an
//! irreversible action.

use std::collections::BTreeMap;

use crate::model::{Decision, PairKey, QualityBreakdown, SimilarityResult};

pub struct DuplicateResolver;

impl DuplicateResolver {
    /// One decision per input pair, decided independently.
    pub fn resolve(
        pairs: &[(PairKey, SimilarityResult)],
        quality_by_path: &BTreeMap<String, QualityBreakdown>,
    ) -> BTreeMap<PairKey, Decision> {
        pairs
            .iter()
            .map(|(key, _)| {
                let decision = Self::decide(key, quality_by_path);
                (key.clone(), decision)
            })
            .collect()
    }

    fn decide(
        key: &PairKey,
        quality_by_path: &BTreeMap<String, QualityBreakdown>,
    ) -> Decision {
        let (Some(first), Some(second)) = (
            quality_by_path.get(&key.first),
            quality_by_path.get(&key.second),
        ) else {
            tracing::warn!(
                target: "resolver",
                "Missing quality score for pair {} / {}",
                key.first,
                key.second
            );
            return Decision::Ambiguous;
        };

        if first.total_score > second.total_score {
            Decision::Prefer {
                keep: key.first.clone(),
                discard: key.second.clone(),
            }
        } else if second.total_score > first.total_score {
            Decision::Prefer {
                keep: key.second.clone(),
                discard: key.first.clone(),
            }
        } else {
            Decision::Ambiguous
        }
    }
}
