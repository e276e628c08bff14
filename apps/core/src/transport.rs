use serde::{Deserialize, Serialize};

use crate::aggregator::RefreshOutcome;
use crate::contract::{
    ActivationTargetDto, CandidateDto, CoreRequest, CoreResponse, SearchResponse, SnapshotResponse,
};
use crate::core_service::SwitcherService;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    Encoding,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

pub fn handle_request(service: &SwitcherService, request: CoreRequest) -> CoreResponse {
    match request {
        CoreRequest::Search(request) => CoreResponse::Search(SearchResponse::from(service.search(&request.query))),
        CoreRequest::ExpandLimit => CoreResponse::Search(SearchResponse::from(service.expand_limit())),
        CoreRequest::Refresh => CoreResponse::Refresh {
            started: service.refresh() == RefreshOutcome::Started,
        },
        CoreRequest::Snapshot => {
            let snapshot = service.current_snapshot();
            CoreResponse::Snapshot(SnapshotResponse {
                generation: snapshot.generation,
                candidates: snapshot.candidates.iter().map(CandidateDto::from).collect(),
            })
        }
        CoreRequest::AddHistory(request) => {
            service.add_to_history(&request.query);
            CoreResponse::AddHistory
        }
        CoreRequest::RecentSearches(request) => CoreResponse::RecentSearches {
            entries: match request.limit {
                Some(limit) => service.recent_searches(limit),
                None => service.default_recent_searches(),
            },
        },
        CoreRequest::Autocomplete(request) => CoreResponse::Autocomplete {
            completion: service.autocomplete(&request.query),
        },
        CoreRequest::Accept(request) => {
            let target = match request.index {
                Some(index) => service.accept_at(index),
                None => service.accept_selected(),
            };
            CoreResponse::Accept {
                target: target.map(ActivationTargetDto::from),
            }
        }
    }
}

/// Decodes one JSON request, runs it and encodes the reply.
pub fn handle_json(service: &SwitcherService, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => TransportResponse::Ok {
            response: handle_request(service, request),
        },
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        format!(
            r#"{{"status":"err","error":{{"code":"encoding","message":{}}}}}"#,
            serde_json::Value::String(error.to_string())
        )
    })
}
