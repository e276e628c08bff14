use rayon::prelude::*;

use crate::matcher::{match_folded, FoldedQuery};
use crate::model::{Candidate, ScoredCandidate};

pub const DEFAULT_PARALLEL_THRESHOLD: usize = 50;

/// Ranks candidates against `query`, best first.
///
/// An empty (or all-space) query returns every candidate with score 0 in
/// snapshot order. Otherwise non-matching candidates are dropped and ties keep
/// their snapshot order.
pub fn rank(candidates: &[Candidate], query: &str, parallel_threshold: usize) -> Vec<ScoredCandidate> {
    let folded_query = FoldedQuery::new(query);
    if folded_query.is_empty() {
        return candidates
            .iter()
            .map(|candidate| ScoredCandidate {
                candidate: candidate.clone(),
                score: 0,
            })
            .collect();
    }

    // Indexed parallel collect keeps input order, so the stable sort below
    // sees the same sequence either way.
    let mut scored: Vec<(i64, &Candidate)> = if candidates.len() > parallel_threshold {
        candidates
            .par_iter()
            .filter_map(|candidate| score_candidate(candidate, &folded_query).map(|s| (s, candidate)))
            .collect()
    } else {
        candidates
            .iter()
            .filter_map(|candidate| score_candidate(candidate, &folded_query).map(|s| (s, candidate)))
            .collect()
    };

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .map(|(score, candidate)| ScoredCandidate {
            candidate: candidate.clone(),
            score,
        })
        .collect()
}

/// Best of the title score (weighted 1.5x) and the owner score.
pub fn score_candidate(candidate: &Candidate, query: &FoldedQuery) -> Option<i64> {
    let title = match_folded(query, candidate.folded_title()).map(weight_title);
    let owner = match_folded(query, candidate.folded_owner());

    let best = match (title, owner) {
        (Some(title), Some(owner)) => title.max(owner),
        (Some(title), None) => title,
        (None, Some(owner)) => owner,
        (None, None) => return None,
    };

    (best > 0).then_some(best)
}

fn weight_title(score: i64) -> i64 {
    score * 3 / 2
}

#[cfg(test)]
mod tests {
    use super::{score_candidate, weight_title};
    use crate::matcher::FoldedQuery;
    use crate::model::{Candidate, SourceRef};

    #[test]
    fn title_weight_rounds_down() {
        assert_eq!(weight_title(5020), 7530);
        assert_eq!(weight_title(3), 4);
        assert_eq!(weight_title(1), 1);
    }

    #[test]
    fn owner_only_match_is_unweighted() {
        let candidate = Candidate::new(0, "Inbox", "Mail", SourceRef::Window { pid: 1, handle: 9 });
        let score = score_candidate(&candidate, &FoldedQuery::new("mail"));
        assert_eq!(score, Some(10_000));
    }

    #[test]
    fn title_match_beats_equal_owner_match() {
        let candidate = Candidate::new(0, "Mail", "Mail", SourceRef::Window { pid: 1, handle: 9 });
        let score = score_candidate(&candidate, &FoldedQuery::new("mail"));
        assert_eq!(score, Some(15_000));
    }
}
