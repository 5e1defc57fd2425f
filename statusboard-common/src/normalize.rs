//! Brigade normalization
//!
//! Turns decoded wire records into [`Brigade`]s: every project gets its
//! slug and a back-reference to the owning brigade, and every brigade gets
//! its `tagged` count.

use crate::model::{Brigade, BrigadeRef, Project, RawBrigade, RawProject};
use crate::slug::slugify;

/// Normalize a fetched brigade list. Input order is preserved.
pub fn normalize(raw_brigades: Vec<RawBrigade>) -> Vec<Brigade> {
    raw_brigades.into_iter().map(normalize_brigade).collect()
}

/// Normalize a single brigade
pub fn normalize_brigade(raw: RawBrigade) -> Brigade {
    let brigade_ref = BrigadeRef {
        name: raw.name.clone(),
    };

    let projects: Vec<Project> = raw
        .projects
        .into_iter()
        .map(|p| normalize_project(p, &brigade_ref))
        .collect();

    let tagged = projects.iter().filter(|p| p.has_topics()).count();

    Brigade {
        name: raw.name,
        projects,
        tagged,
    }
}

fn normalize_project(raw: RawProject, brigade: &BrigadeRef) -> Project {
    Project {
        slug: slugify(&raw.name),
        name: raw.name,
        description: raw.description,
        code_url: raw.code_url,
        topics: raw.topics,
        last_pushed_within: raw.last_pushed_within,
        brigade: brigade.clone(),
    }
}
