use fastswitch_core::model::{Candidate, SourceRef};
use fastswitch_core::search::{rank, DEFAULT_PARALLEL_THRESHOLD};

fn window(id: usize, title: &str, owner: &str) -> Candidate {
    Candidate::new(
        id,
        title,
        owner,
        SourceRef::Window {
            pid: 100 + id as u32,
            handle: id as u64,
        },
    )
}

fn sample() -> Vec<Candidate> {
    vec![
        window(0, "", "Mail"),
        window(1, "", "Safari"),
        window(2, "", "System Settings"),
    ]
}

#[test]
fn empty_query_browses_in_snapshot_order() {
    let results = rank(&sample(), "", DEFAULT_PARALLEL_THRESHOLD);
    let ids: Vec<usize> = results.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert!(results.iter().all(|r| r.score == 0));
}

#[test]
fn whitespace_query_is_browse_mode() {
    let results = rank(&sample(), "   ", DEFAULT_PARALLEL_THRESHOLD);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.score == 0));
}

#[test]
fn non_matching_candidates_are_dropped() {
    let results = rank(&sample(), "ma", DEFAULT_PARALLEL_THRESHOLD);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].candidate.owner_name, "Mail");
    assert_eq!(results[0].score, 5_020);
}

#[test]
fn unmatched_query_yields_nothing() {
    assert!(rank(&sample(), "zzz", DEFAULT_PARALLEL_THRESHOLD).is_empty());
}

#[test]
fn title_match_is_weighted_above_owner_match() {
    let candidates = vec![window(0, "", "Notes"), window(1, "Notes", "TextEdit")];
    let results = rank(&candidates, "notes", DEFAULT_PARALLEL_THRESHOLD);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].candidate.id, 1);
    assert_eq!(results[0].score, 15_000);
    assert_eq!(results[1].score, 10_000);
}

#[test]
fn owner_match_is_enough() {
    let candidates = vec![window(0, "Inbox", "Mail")];
    let results = rank(&candidates, "mail", DEFAULT_PARALLEL_THRESHOLD);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 10_000);
}

#[test]
fn results_are_sorted_by_score_descending() {
    let candidates = vec![
        window(0, "The Expanded Report Menu", "Pages"),
        window(1, "zsh", "Terminal"),
        window(2, "term", "Notes"),
    ];
    let results = rank(&candidates, "term", DEFAULT_PARALLEL_THRESHOLD);
    let ids: Vec<usize> = results.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, vec![2, 1, 0]);
    assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn equal_scores_keep_snapshot_order() {
    let candidates: Vec<Candidate> = (0..8).map(|id| window(id, "zsh", "Terminal")).collect();
    let results = rank(&candidates, "term", DEFAULT_PARALLEL_THRESHOLD);
    let ids: Vec<usize> = results.iter().map(|r| r.candidate.id).collect();
    assert_eq!(ids, (0..8).collect::<Vec<_>>());
}

#[test]
fn parallel_and_sequential_ranking_agree() {
    let owners = ["Terminal", "Safari", "Mail", "Notes", "Xcode"];
    let candidates: Vec<Candidate> = (0..400)
        .map(|id| window(id, &format!("report {} draft", id % 7), owners[id % owners.len()]))
        .collect();

    for query in ["re", "report 3", "te", "draft x", ""] {
        let sequential = rank(&candidates, query, usize::MAX);
        let parallel = rank(&candidates, query, 1);
        assert_eq!(sequential, parallel, "query {query:?}");
    }
}
