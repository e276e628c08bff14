use crate::model::{ScoredCandidate, Snapshot};
use crate::search::rank;

pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// One evaluated result page for the current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub query: String,
    pub results: Vec<ScoredCandidate>,
    pub total_matches: usize,
    pub result_limit: usize,
}

impl SearchPage {
    pub fn has_more(&self) -> bool {
        self.total_matches > self.result_limit
    }

    /// Matches hidden behind the "show more" affordance.
    pub fn remaining(&self) -> usize {
        self.total_matches.saturating_sub(self.results.len())
    }
}

/// Per-session query state: current text, result limit, selection and
/// history navigation cursor.
#[derive(Debug, Clone)]
pub struct ResultPipeline {
    query: String,
    initial_limit: usize,
    result_limit: usize,
    selected_index: usize,
    history_cursor: Option<usize>,
}

impl Default for ResultPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_LIMIT)
    }
}

impl ResultPipeline {
    pub fn new(initial_limit: usize) -> Self {
        let initial_limit = initial_limit.max(1);
        Self {
            query: String::new(),
            initial_limit,
            result_limit: initial_limit,
            selected_index: 0,
            history_cursor: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn history_cursor(&self) -> Option<usize> {
        self.history_cursor
    }

    /// Records a user edit. Returns whether the text changed.
    pub fn set_query(&mut self, query: &str) -> bool {
        self.history_cursor = None;
        self.replace_query(query)
    }

    fn replace_query(&mut self, query: &str) -> bool {
        if self.query == query {
            return false;
        }
        self.query = query.to_string();
        self.result_limit = self.initial_limit;
        self.selected_index = 0;
        true
    }

    pub fn expand_limit(&mut self) -> usize {
        self.result_limit = self.result_limit.saturating_mul(2);
        self.result_limit
    }

    pub fn evaluate(&self, snapshot: &Snapshot, parallel_threshold: usize) -> SearchPage {
        let mut results = rank(&snapshot.candidates, &self.query, parallel_threshold);
        let total_matches = results.len();
        results.truncate(self.result_limit);
        SearchPage {
            query: self.query.clone(),
            results,
            total_matches,
            result_limit: self.result_limit,
        }
    }

    /// Moves the selection by `delta`, clamped to `len` results.
    pub fn move_selection(&mut self, delta: i32, len: usize) -> usize {
        self.selected_index = next_selection_index(self.selected_index, len, delta);
        self.selected_index
    }

    pub fn selected<'a>(&self, page: &'a SearchPage) -> Option<&'a ScoredCandidate> {
        page.results.get(self.selected_index)
    }

    /// Steps to an older entry of `recent`, starting from the newest.
    /// Only active while the query is empty or already navigating history.
    pub fn history_older(&mut self, recent: &[String]) -> Option<String> {
        if recent.is_empty() {
            return None;
        }
        let next = match self.history_cursor {
            Some(current) => (current + 1).min(recent.len() - 1),
            None if self.query.is_empty() => 0,
            None => return None,
        };
        self.history_cursor = Some(next);
        let entry = recent[next].clone();
        self.replace_query(&entry);
        Some(entry)
    }

    /// Steps back toward the newest entry; past it the query is cleared.
    pub fn history_newer(&mut self, recent: &[String]) -> Option<String> {
        let current = self.history_cursor?;
        let query = match current.checked_sub(1).and_then(|index| recent.get(index)) {
            Some(entry) => {
                self.history_cursor = Some(current - 1);
                entry.clone()
            }
            None => {
                self.history_cursor = None;
                String::new()
            }
        };
        self.replace_query(&query);
        Some(query)
    }
}

fn next_selection_index(current: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }

    let max = len - 1;
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs() as usize).min(max)
    } else {
        current.saturating_add(delta as usize).min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::next_selection_index;

    #[test]
    fn selection_index_bounds_are_stable() {
        assert_eq!(next_selection_index(0, 0, 1), 0);
        assert_eq!(next_selection_index(0, 3, -1), 0);
        assert_eq!(next_selection_index(1, 3, -1), 0);
        assert_eq!(next_selection_index(1, 3, 1), 2);
        assert_eq!(next_selection_index(2, 3, 1), 2);
        assert_eq!(next_selection_index(1, 3, 0), 1);
        assert_eq!(next_selection_index(5, 3, 0), 2);
        assert_eq!(next_selection_index(0, 10, 4), 4);
    }
}
