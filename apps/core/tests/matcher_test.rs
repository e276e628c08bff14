use fastswitch_core::matcher::{match_score, EXACT_MATCH_SCORE};

#[test]
fn empty_query_matches_with_zero() {
    assert_eq!(match_score("", "Safari"), Some(0));
    assert_eq!(match_score("", ""), Some(0));
}

#[test]
fn missing_character_is_no_match() {
    assert_eq!(match_score("xyz", "Safari"), None);
    assert_eq!(match_score("ma", "System Settings"), None);
    assert_eq!(match_score("ma", ""), None);
}

#[test]
fn out_of_order_characters_do_not_match() {
    assert_eq!(match_score("ba", "ab"), None);
    assert!(match_score("ab", "a-b").is_some());
}

#[test]
fn subsequence_match_is_case_insensitive() {
    assert!(match_score("VSC", "visual studio code").is_some());
    assert!(match_score("vsc", "VISUAL STUDIO CODE").is_some());
}

#[test]
fn exact_match_returns_fixed_score() {
    assert_eq!(match_score("chrome", "Chrome"), Some(EXACT_MATCH_SCORE));
    assert_eq!(match_score("MAIL", "mail"), Some(EXACT_MATCH_SCORE));
}

#[test]
fn prefix_match_scales_with_query_length() {
    assert_eq!(match_score("ma", "Mail"), Some(5_020));
    assert_eq!(match_score("chrome", "Chrome Browser Window"), Some(5_060));
}

#[test]
fn exact_match_outranks_prefix_match() {
    let exact = match_score("chrome", "Chrome").unwrap();
    let prefix = match_score("chrome", "Chrome Browser Window").unwrap();
    assert!(exact > prefix);
}

#[test]
fn prefix_match_outranks_scattered_match() {
    let prefix = match_score("term", "Terminal").unwrap();
    let scattered = match_score("term", "The Expanded Report Menu").unwrap();
    assert_eq!(scattered, 59);
    assert!(prefix > scattered);
}

#[test]
fn every_term_must_match_the_same_field() {
    assert!(match_score("code studio", "Visual Studio Code").is_some());
    assert_eq!(match_score("code xyz", "Visual Studio Code"), None);
}

#[test]
fn term_order_does_not_change_the_score() {
    let forward = match_score("studio code", "Visual Studio Code");
    let reversed = match_score("code studio", "Visual Studio Code");
    assert_eq!(forward, Some(111));
    assert_eq!(forward, reversed);
}

#[test]
fn successful_matches_are_positive() {
    let texts = [
        "a",
        "Terminal",
        "The Expanded Report Menu",
        "a very long window title with lots of filler text in between the letters z",
    ];
    for text in texts {
        if let Some(score) = match_score("az", text) {
            assert!(score >= 1, "score for {text:?} was {score}");
        }
    }
}

#[test]
fn word_boundary_and_case_raise_the_score() {
    let boundary = match_score("b", "a Bx").unwrap();
    let inner = match_score("b", "abxx").unwrap();
    assert!(boundary > inner);
}
