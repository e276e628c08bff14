//! Fuzzy subsequence scoring of a query against one text field.
//!
//! Scores are only meaningful relative to each other: an exact match beats a
//! prefix match, which beats any scattered subsequence match.

use crate::model::{fold_char, FoldedText};

pub const EXACT_MATCH_SCORE: i64 = 10_000;
pub const PREFIX_MATCH_BASE: i64 = 5_000;
pub const PREFIX_MATCH_PER_CHAR: i64 = 10;

const CONSECUTIVE_STEP: i64 = 5;
const WORD_BOUNDARY_BONUS: i64 = 10;
const UPPERCASE_BONUS: i64 = 5;
const EARLY_POSITION_MAX_BONUS: i64 = 20;
const GAP_PENALTY_CAP: i64 = 30;
const LENGTH_PENALTY_CAP: i64 = 10;

/// A query folded once and reused against many candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedQuery {
    whole: Vec<char>,
    terms: Vec<Vec<char>>,
}

impl FoldedQuery {
    pub fn new(query: &str) -> Self {
        let whole = query.chars().map(fold_char).collect();
        let terms = query
            .split(' ')
            .filter(|term| !term.is_empty())
            .map(|term| term.chars().map(fold_char).collect())
            .collect();
        Self { whole, terms }
    }

    /// True when there is nothing to match: empty, or only spaces.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> usize {
        self.terms.len()
    }
}

/// Scores `query` against `text`. `None` means the field does not match at all.
pub fn match_score(query: &str, text: &str) -> Option<i64> {
    match_folded(&FoldedQuery::new(query), &FoldedText::new(text))
}

pub fn match_folded(query: &FoldedQuery, text: &FoldedText) -> Option<i64> {
    if query.is_empty() {
        return Some(0);
    }

    let folded = text.folded();
    if folded == query.whole.as_slice() {
        return Some(EXACT_MATCH_SCORE);
    }
    if folded.starts_with(&query.whole) {
        return Some(PREFIX_MATCH_BASE + PREFIX_MATCH_PER_CHAR * query.whole.len() as i64);
    }

    let mut total = 0_i64;
    for term in &query.terms {
        total += score_term(term, text)?;
    }
    Some(total.max(1))
}

fn score_term(term: &[char], text: &FoldedText) -> Option<i64> {
    let folded = text.folded();
    let original = text.original();

    let mut score = 0_i64;
    let mut term_index = 0_usize;
    let mut last_match: Option<usize> = None;
    let mut first_match: Option<usize> = None;
    let mut consecutive = 0_i64;
    let mut gap_total = 0_usize;

    for (position, ch) in folded.iter().enumerate() {
        if term_index == term.len() {
            break;
        }
        if *ch != term[term_index] {
            continue;
        }

        first_match.get_or_insert(position);
        score += 1;

        match last_match {
            Some(last) if last + 1 == position => {
                consecutive += 1;
                score += consecutive * CONSECUTIVE_STEP;
            }
            Some(last) => {
                consecutive = 0;
                gap_total += position - last - 1;
            }
            None => consecutive = 0,
        }

        if position == 0 || !folded[position - 1].is_alphabetic() {
            score += WORD_BOUNDARY_BONUS;
        }
        if original[position].is_uppercase() {
            score += UPPERCASE_BONUS;
        }

        last_match = Some(position);
        term_index += 1;
    }

    if term_index < term.len() {
        return None;
    }

    if let Some(first) = first_match {
        score += early_position_bonus(first, folded.len());
    }

    score -= ((gap_total / 2) as i64).min(GAP_PENALTY_CAP);

    let length_diff = text.len().saturating_sub(term.len());
    score -= ((length_diff / 10) as i64).min(LENGTH_PENALTY_CAP);

    Some(score.max(1))
}

/// Linear bonus for a first match inside the leading quarter of the text.
fn early_position_bonus(first: usize, text_len: usize) -> i64 {
    let threshold = (text_len / 4).max(1);
    if first >= threshold {
        return 0;
    }
    EARLY_POSITION_MAX_BONUS - (first as i64 * EARLY_POSITION_MAX_BONUS / threshold as i64)
}

#[cfg(test)]
mod tests {
    use super::{early_position_bonus, match_score, FoldedQuery};

    #[test]
    fn early_bonus_scales_down_to_threshold() {
        assert_eq!(early_position_bonus(0, 20), 20);
        assert_eq!(early_position_bonus(2, 20), 12);
        assert_eq!(early_position_bonus(5, 20), 0);
        assert_eq!(early_position_bonus(0, 2), 20);
    }

    #[test]
    fn consecutive_run_accumulates() {
        // a=1, b=1+5, c=1+10; no boundary, early or length adjustments apply.
        assert_eq!(match_score("abc", "xabcx"), Some(18));
    }

    #[test]
    fn scattered_match_applies_all_adjustments() {
        assert_eq!(match_score("vsc", "Visual Studio Code"), Some(46));
    }

    #[test]
    fn successful_match_is_floored_at_one() {
        let text = format!("a{}z", "b".repeat(60));
        assert_eq!(match_score("az", &text), Some(1));
    }

    #[test]
    fn whitespace_only_query_has_no_terms() {
        assert!(FoldedQuery::new("   ").is_empty());
        assert_eq!(FoldedQuery::new(" code  studio ").terms(), 2);
        assert_eq!(match_score("  ", "anything"), Some(0));
    }
}
