//! Project filters
//!
//! Pure, stable filters over a flat project list. Each filter returns a new
//! vector that keeps the relative order of its input and never touches the
//! input itself. Filters compose by AND: run them in sequence and a project
//! survives only if every filter keeps it.

use std::collections::BTreeSet;

use crate::model::{ActivityBucket, FilterState, Project};

/// Minimum Jaro-Winkler similarity for a word to count as a fuzzy match
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.9;

/// Keep projects whose `last_pushed_within` is one of `allowed`
pub fn filter_by_activity(projects: &[Project], allowed: &[ActivityBucket]) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| allowed.contains(&p.last_pushed_within))
        .cloned()
        .collect()
}

/// Keep projects sharing at least one topic with `selected`.
///
/// An empty selection keeps everything.
pub fn filter_by_topics(projects: &[Project], selected: &BTreeSet<String>) -> Vec<Project> {
    if selected.is_empty() {
        return projects.to_vec();
    }

    projects
        .iter()
        .filter(|p| p.topics().iter().any(|t| selected.contains(t)))
        .cloned()
        .collect()
}

/// Keep projects owned by one of the named brigades.
///
/// An empty set keeps everything.
pub fn filter_by_brigades(projects: &[Project], names: &BTreeSet<String>) -> Vec<Project> {
    if names.is_empty() {
        return projects.to_vec();
    }

    projects
        .iter()
        .filter(|p| names.contains(&p.brigade.name))
        .cloned()
        .collect()
}

/// Keep projects whose name or description matches `query`.
///
/// Matching is case-insensitive; see [`text_matches`]. A blank query keeps
/// everything.
pub fn filter_by_text(projects: &[Project], query: &str) -> Vec<Project> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return projects.to_vec();
    }

    projects
        .iter()
        .filter(|p| {
            text_matches(&p.name, &query)
                || p.description
                    .as_deref()
                    .is_some_and(|d| text_matches(d, &query))
        })
        .cloned()
        .collect()
}

/// Does `field` match an already-lowercased, non-empty `query`?
///
/// True when the field contains the query, or when one of the field's words
/// is within [`FUZZY_MATCH_THRESHOLD`] of it.
pub fn text_matches(field: &str, query: &str) -> bool {
    let field = field.to_lowercase();
    if field.contains(query) {
        return true;
    }

    field
        .split_whitespace()
        .any(|word| strsim::jaro_winkler(word, query) >= FUZZY_MATCH_THRESHOLD)
}

/// Apply every filter in `state`: activity, brigade, topics, then text
pub fn apply_filters(projects: &[Project], state: &FilterState) -> Vec<Project> {
    let active = filter_by_activity(projects, state.time_threshold.buckets());
    let located = filter_by_brigades(&active, &state.locations);
    let topical = filter_by_topics(&located, &state.topics);
    filter_by_text(&topical, &state.text_query)
}
