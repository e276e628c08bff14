use serde::{Deserialize, Serialize};

use crate::activation::ActivationTarget;
use crate::model::{Candidate, ScoredCandidate, SourceRef};
use crate::pipeline::SearchPage;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentSearchesRequest {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptRequest {
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreRequest {
    Search(QueryRequest),
    ExpandLimit,
    Refresh,
    Snapshot,
    AddHistory(QueryRequest),
    RecentSearches(RecentSearchesRequest),
    Autocomplete(QueryRequest),
    Accept(AcceptRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateDto {
    pub id: usize,
    pub title: String,
    pub owner_name: String,
    pub display_name: String,
    pub is_sub_item: bool,
    pub parent_ref: Option<u64>,
    pub sub_index: Option<usize>,
    pub pid: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredCandidateDto {
    #[serde(flatten)]
    pub candidate: CandidateDto,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ScoredCandidateDto>,
    pub total_matches: usize,
    pub result_limit: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotResponse {
    pub generation: u64,
    pub candidates: Vec<CandidateDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivationTargetDto {
    Window { pid: u32, handle: u64 },
    Tab { app_id: String, pid: u32, window_index: u64, tab_index: usize },
    Application { app_id: String, pid: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreResponse {
    Search(SearchResponse),
    Refresh { started: bool },
    Snapshot(SnapshotResponse),
    AddHistory,
    RecentSearches { entries: Vec<String> },
    Autocomplete { completion: Option<String> },
    Accept { target: Option<ActivationTargetDto> },
}

impl From<&Candidate> for CandidateDto {
    fn from(value: &Candidate) -> Self {
        let pid = match &value.source_ref {
            SourceRef::Window { pid, .. } | SourceRef::Tab { pid, .. } => *pid,
        };
        Self {
            id: value.id,
            title: value.title.clone(),
            owner_name: value.owner_name.clone(),
            display_name: value.display_name(),
            is_sub_item: value.is_sub_item(),
            parent_ref: value.sub_item.map(|sub| sub.parent_ref),
            sub_index: value.sub_item.map(|sub| sub.sub_index),
            pid,
        }
    }
}

impl From<&ScoredCandidate> for ScoredCandidateDto {
    fn from(value: &ScoredCandidate) -> Self {
        Self {
            candidate: CandidateDto::from(&value.candidate),
            score: value.score,
        }
    }
}

impl From<SearchPage> for SearchResponse {
    fn from(value: SearchPage) -> Self {
        let has_more = value.has_more();
        Self {
            results: value.results.iter().map(ScoredCandidateDto::from).collect(),
            query: value.query,
            total_matches: value.total_matches,
            result_limit: value.result_limit,
            has_more,
        }
    }
}

impl From<ActivationTarget> for ActivationTargetDto {
    fn from(value: ActivationTarget) -> Self {
        match value {
            ActivationTarget::Window { pid, handle } => Self::Window { pid, handle },
            ActivationTarget::Tab {
                app_id,
                pid,
                window_index,
                tab_index,
            } => Self::Tab {
                app_id,
                pid,
                window_index,
                tab_index,
            },
            ActivationTarget::Application { app_id, pid } => Self::Application { app_id, pid },
        }
    }
}
