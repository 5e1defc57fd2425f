//! Cross-cutting derived views
//!
//! Stateless transforms over a snapshot of normalized data: flattening,
//! topic universe, leaderboard and tag lookup.

use std::collections::{BTreeSet, HashMap};

use crate::filters::filter_by_activity;
use crate::model::{ActivityThreshold, Brigade, DiscourseTag, Project};

/// Number of brigades shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

/// Every project of every brigade, brigade by brigade
pub fn flatten_projects(brigades: &[Brigade]) -> Vec<Project> {
    brigades
        .iter()
        .flat_map(|b| b.projects.iter().cloned())
        .collect()
}

/// Deduplicated union of the topics of `projects`
pub fn all_topics(projects: &[Project]) -> BTreeSet<String> {
    projects
        .iter()
        .flat_map(|p| p.topics().iter().cloned())
        .collect()
}

/// Topics present among the projects active within `threshold`
pub fn available_topics(projects: &[Project], threshold: ActivityThreshold) -> BTreeSet<String> {
    all_topics(&filter_by_activity(projects, threshold.buckets()))
}

/// Brigades ranked by the share of their projects that carry a topic.
///
/// Highest share first; ties keep input order. Brigades without projects
/// are left out. At most [`LEADERBOARD_SIZE`] entries.
pub fn leaderboard(brigades: &[Brigade]) -> Vec<Brigade> {
    let mut scored: Vec<(f64, &Brigade)> = brigades
        .iter()
        .filter(|b| !b.projects.is_empty())
        .map(|b| (b.tagged as f64 / b.projects.len() as f64, b))
        .collect();

    // sort_by is stable, so equal scores keep their input order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(|(_, b)| b.clone())
        .collect()
}

/// Index tags by [`DiscourseTag::key`]. A missing list yields an empty map.
pub fn tag_map(tags: Option<&[DiscourseTag]>) -> HashMap<String, DiscourseTag> {
    tags.unwrap_or_default()
        .iter()
        .map(|t| (t.key(), t.clone()))
        .collect()
}
