//! Integration tests for the application state store
//!
//! Tests cover:
//! - Joint brigade + tag load (status held at Loading until both settle)
//! - Atomic commit and stale-while-revalidate during refresh
//! - Per-fetch failure classification (partial / failed outcomes)
//! - Last-write-wins for overlapping loads
//! - Derived getters over loaded data
//! - Auto-refresh lifecycle

use async_trait::async_trait;
use serde_json::json;
use statusboard_common::model::{
    ActivityBucket, ActivityThreshold, DiscourseTag, FilterUpdate, RawBrigade, RawProject,
};
use statusboard_common::store::{LoadOutcome, LoadState, Store, StoreEvent};
use statusboard_common::{DataSource, Error, FetchTarget, Result};
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Scripted data source
// =============================================================================

/// One scripted response: wait `delay`, then succeed with `data` or fail
struct Step<T> {
    delay: Duration,
    data: Option<T>,
}

#[derive(Default)]
struct ScriptedSource {
    brigades: Mutex<VecDeque<Step<Vec<RawBrigade>>>>,
    tags: Mutex<VecDeque<Step<Vec<DiscourseTag>>>>,
}

impl ScriptedSource {
    fn brigades(self, delay_ms: u64, data: Option<Vec<RawBrigade>>) -> Self {
        self.brigades.lock().unwrap().push_back(Step {
            delay: Duration::from_millis(delay_ms),
            data,
        });
        self
    }

    fn tags(self, delay_ms: u64, data: Option<Vec<DiscourseTag>>) -> Self {
        self.tags.lock().unwrap().push_back(Step {
            delay: Duration::from_millis(delay_ms),
            data,
        });
        self
    }
}

async fn play<T: Default>(step: Option<Step<T>>, target: FetchTarget) -> Result<T> {
    // An exhausted script answers immediately with empty data
    let Some(step) = step else {
        return Ok(T::default());
    };
    tokio::time::sleep(step.delay).await;
    step.data.ok_or(Error::Http {
        target,
        status: 503,
    })
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch_brigades(&self) -> Result<Vec<RawBrigade>> {
        let step = self.brigades.lock().unwrap().pop_front();
        play(step, FetchTarget::Brigades).await
    }

    async fn fetch_tags(&self) -> Result<Vec<DiscourseTag>> {
        let step = self.tags.lock().unwrap().pop_front();
        play(step, FetchTarget::Tags).await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn project(name: &str, topics: Option<&[&str]>, bucket: ActivityBucket) -> RawProject {
    RawProject {
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        code_url: Some(format!("https://github.com/example/{}", name)),
        topics: topics.map(|t| t.iter().map(|s| s.to_string()).collect()),
        last_pushed_within: bucket,
    }
}

fn dataset_a() -> Vec<RawBrigade> {
    vec![
        RawBrigade {
            name: "Code for Philly".to_string(),
            projects: vec![
                project("Transit Map", Some(&["transit", "maps"]), ActivityBucket::Week),
                project("Old Budget", Some(&["budget"]), ActivityBucket::OverAYear),
                project("Untagged", None, ActivityBucket::Month),
                project("Empty Topics", Some(&[]), ActivityBucket::Year),
            ],
        },
        RawBrigade {
            name: "Open Oakland".to_string(),
            projects: vec![
                project("Adopt a Drain", Some(&["water"]), ActivityBucket::Month),
                project("Food Finder", Some(&["food", "maps"]), ActivityBucket::Year),
            ],
        },
        RawBrigade {
            name: "Brand New Brigade".to_string(),
            projects: vec![],
        },
    ]
}

fn dataset_b() -> Vec<RawBrigade> {
    vec![RawBrigade {
        name: "Code for Boston".to_string(),
        projects: vec![project("Voter Guide", Some(&["elections"]), ActivityBucket::Week)],
    }]
}

fn tags(ids: &[i64]) -> Vec<DiscourseTag> {
    ids.iter()
        .map(|id| serde_json::from_value(json!({"id": id, "text": format!("tag {}", id)})).unwrap())
        .collect()
}

fn brigade_names(brigades: &[statusboard_common::model::Brigade]) -> Vec<String> {
    brigades.iter().map(|b| b.name.clone()).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Joint load
// =============================================================================

#[tokio::test]
async fn test_joint_load_waits_for_slower_fetch() {
    let source = ScriptedSource::default()
        .brigades(100, Some(dataset_a()))
        .tags(50, Some(tags(&[1, 2])));
    let store = Arc::new(Store::new(Arc::new(source)));

    let loader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.load_all().await })
    };

    // Tags have resolved, brigades have not: nothing is visible yet
    tokio::time::sleep(Duration::from_millis(75)).await;
    assert!(store.is_loading().await);
    assert_eq!(store.load_state().await, LoadState::Loading);
    assert!(store.brigades().await.is_empty());
    assert!(store.discourse_tag_map().await.is_empty());

    let outcome = loader.await.unwrap();
    assert_eq!(outcome, LoadOutcome::Ok);
    assert!(!store.is_loading().await);
    assert_eq!(store.load_state().await, LoadState::Loaded);
    assert_eq!(store.brigades().await.len(), 3);
    assert_eq!(store.discourse_tag_map().await.len(), 2);
    assert!(store.last_update().await.is_some());
    assert_eq!(store.last_outcome().await, Some(LoadOutcome::Ok));
}

#[tokio::test]
async fn test_refresh_serves_stale_data_until_commit() {
    let source = ScriptedSource::default()
        .brigades(0, Some(dataset_a()))
        .tags(0, Some(tags(&[1])))
        .brigades(80, Some(dataset_b()))
        .tags(10, Some(tags(&[5, 6, 7])));
    let store = Arc::new(Store::new(Arc::new(source)));

    store.load_all().await;
    let first_update = store.last_update().await;

    let refresh = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.check_for_updates(first_update).await })
    };

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(store.is_loading().await);
    assert_eq!(store.brigades().await.len(), 3);
    assert_eq!(store.discourse_tags().await.len(), 1);

    assert_eq!(refresh.await.unwrap(), LoadOutcome::Ok);
    assert_eq!(brigade_names(&store.brigades().await), vec!["Code for Boston"]);
    assert_eq!(store.discourse_tags().await.len(), 3);
    assert!(store.last_update().await > first_update);
}

// =============================================================================
// Failure classification
// =============================================================================

#[tokio::test]
async fn test_tag_failure_is_partial_and_keeps_previous_tags() {
    let source = ScriptedSource::default()
        .brigades(0, Some(dataset_a()))
        .tags(0, Some(tags(&[1, 2])))
        .brigades(0, Some(dataset_b()))
        .tags(0, None);
    let store = Store::new(Arc::new(source));

    assert!(store.load_all().await.is_ok());
    let outcome = store.load_all().await;

    match &outcome {
        LoadOutcome::Partial { failed } => assert_eq!(failed.target, FetchTarget::Tags),
        other => panic!("expected partial outcome, got {:?}", other),
    }
    match store.load_state().await {
        LoadState::Error { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].target, FetchTarget::Tags);
        }
        other => panic!("expected error state, got {:?}", other),
    }

    // Brigades committed, tags kept from the earlier load
    assert_eq!(brigade_names(&store.brigades().await), vec!["Code for Boston"]);
    assert_eq!(store.discourse_tag_map().await.len(), 2);
    assert!(!store.is_loading().await);

    // One read reports the same load
    let status = store.status().await;
    assert!(!status.loading);
    assert_eq!(status.last_outcome, Some(outcome));
    assert_eq!(status.load_state, store.load_state().await);
    assert_eq!(status.last_update, store.last_update().await);
}

#[tokio::test]
async fn test_both_failures_commit_nothing() {
    let source = ScriptedSource::default()
        .brigades(0, None)
        .tags(0, None);
    let store = Store::new(Arc::new(source));

    let outcome = store.load_all().await;
    assert!(matches!(&outcome, LoadOutcome::Failed { failures } if failures.len() == 2));
    assert!(store.brigades().await.is_empty());
    assert!(store.discourse_tags().await.is_empty());
    assert!(!store.is_loading().await);
    assert!(store.last_update().await.is_some());
}

// =============================================================================
// Overlapping loads
// =============================================================================

#[tokio::test]
async fn test_overlapping_loads_last_settled_wins() {
    let source = ScriptedSource::default()
        .brigades(120, Some(dataset_a()))
        .tags(0, Some(tags(&[1])))
        .brigades(20, Some(dataset_b()))
        .tags(0, Some(tags(&[2])));
    let store = Arc::new(Store::new(Arc::new(source)));

    let slow = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.load_all().await })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;
    let fast = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.load_all().await })
    };

    fast.await.unwrap();
    assert_eq!(brigade_names(&store.brigades().await), vec!["Code for Boston"]);

    slow.await.unwrap();
    assert_eq!(store.brigades().await.len(), 3);
}

// =============================================================================
// Derived getters
// =============================================================================

#[tokio::test]
async fn test_derived_views_after_load() {
    let source = ScriptedSource::default()
        .brigades(0, Some(dataset_a()))
        .tags(0, Some(tags(&[1])));
    let store = Store::new(Arc::new(source));
    store.load_all().await;

    let brigades = store.brigades().await;
    assert_eq!(brigades[0].tagged, 2);
    assert_eq!(brigades[0].projects[0].slug, "transit-map");
    assert_eq!(store.projects().await.len(), 6);

    // Oakland 2/2 ahead of Philly 2/4; the empty brigade is not ranked
    assert_eq!(
        brigade_names(&store.leaders().await),
        vec!["Open Oakland", "Code for Philly"]
    );

    assert_eq!(
        store.topics().await,
        set(&["budget", "food", "maps", "transit", "water"])
    );

    // Default threshold is "year": the over-a-year budget project drops out
    assert_eq!(store.filters().await.time_threshold, ActivityThreshold::Year);
    assert_eq!(store.projects_filtered_by_time().await.len(), 5);
    assert!(!store.available_topics().await.contains("budget"));

    store.update_topic_filters(set(&["maps"])).await;
    let names: Vec<String> = store
        .filtered_projects()
        .await
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Transit Map", "Food Finder"]);

    store.update_location_filters(set(&["Open Oakland"])).await;
    let filtered = store.filtered_projects().await;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Food Finder");

    store
        .set_filters(FilterUpdate {
            time_threshold: Some(ActivityThreshold::Week),
            ..Default::default()
        })
        .await;
    assert!(store.filtered_projects().await.is_empty());
    assert_eq!(store.available_topics().await, set(&["maps", "transit"]));
}

#[tokio::test]
async fn test_load_emits_events_in_order() {
    let source = ScriptedSource::default()
        .brigades(0, Some(dataset_b()))
        .tags(0, Some(tags(&[1])));
    let store = Store::new(Arc::new(source));
    let mut rx = store.subscribe();

    store.load_all().await;

    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::LoadStateChanged { state: LoadState::Loading }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::DataCommitted { brigades: 1, tags: 1 }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::LoadStateChanged { state: LoadState::Loaded }
    ));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_auto_refresh_runs_until_shutdown() {
    let store = Arc::new(Store::new(Arc::new(ScriptedSource::default())));
    assert!(store.last_update().await.is_none());

    let handle = store.start_auto_refresh(Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(90)).await;
    handle.shutdown().await;

    let after_shutdown = store.last_update().await;
    assert!(after_shutdown.is_some());
    assert_eq!(store.load_state().await, LoadState::Loaded);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(store.last_update().await, after_shutdown);
}

#[tokio::test]
async fn test_auto_refresh_shutdown_drops_in_flight_load() {
    // First refresh commits dataset A quickly, second one stalls
    let source = ScriptedSource::default()
        .brigades(0, Some(dataset_a()))
        .tags(0, Some(vec![]))
        .brigades(2_000, Some(dataset_b()))
        .tags(2_000, Some(vec![]));
    let store = Arc::new(Store::new(Arc::new(source)));

    let handle = store.start_auto_refresh(Duration::from_millis(20));

    // Wait for the first commit, then for the stalled refresh to start
    tokio::time::timeout(Duration::from_secs(1), async {
        while store.last_update().await.is_none() || !store.is_loading().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Second refresh should start");
    let committed = store.last_update().await;

    let started = std::time::Instant::now();
    handle.shutdown().await;
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "shutdown waited {:?} for the in-flight load",
        started.elapsed()
    );

    // Nothing from the dropped load is committed; status falls back
    assert_eq!(store.last_update().await, committed);
    assert_eq!(store.load_state().await, LoadState::Loaded);
    assert_eq!(store.brigades().await.len(), dataset_a().len());

    let status = store.status().await;
    assert!(!status.loading);
    assert_eq!(status.last_outcome, Some(LoadOutcome::Ok));
}
