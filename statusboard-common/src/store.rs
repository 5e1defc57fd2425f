//! Application state store
//!
//! Owns the canonical brigade and tag collections, the load status and the
//! active filters. Consumers hold an `Arc<Store>` and read derived views
//! through getters that recompute on every call.
//!
//! Canonical state sits behind a single `RwLock`, so a load commits brigades,
//! tags and status in one write: readers never see new brigades next to old
//! tags.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::fetch::DataSource;
use crate::filters::{apply_filters, filter_by_activity};
use crate::model::{Brigade, DiscourseTag, FilterState, FilterUpdate, Project};
use crate::normalize::normalize;
use crate::views::{all_topics, available_topics, flatten_projects, leaderboard, tag_map};
use crate::{time, Error, FetchTarget};

/// Capacity of the store event channel
const EVENT_CAPACITY: usize = 100;

/// One failed fetch from a load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub target: FetchTarget,
    pub message: String,
}

impl FetchFailure {
    fn new(target: FetchTarget, err: &Error) -> Self {
        Self {
            target: err.fetch_target().unwrap_or(target),
            message: err.to_string(),
        }
    }
}

/// Load status of the store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A load is in flight; previous data is still served
    Loading,
    /// Last load settled with both fetches successful
    Loaded,
    /// Last load settled with at least one failed fetch
    Error { failures: Vec<FetchFailure> },
}

/// Result of a single `load_all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LoadOutcome {
    Ok,
    /// One fetch failed; the other side was committed
    Partial { failed: FetchFailure },
    /// Both fetches failed; nothing was committed
    Failed { failures: Vec<FetchFailure> },
}

impl LoadOutcome {
    fn from_failures(mut failures: Vec<FetchFailure>) -> Self {
        match failures.len() {
            0 => LoadOutcome::Ok,
            1 => LoadOutcome::Partial {
                failed: failures.remove(0),
            },
            _ => LoadOutcome::Failed { failures },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, LoadOutcome::Ok)
    }

    /// Load state a store is left in once this outcome is committed
    fn settled_state(&self) -> LoadState {
        match self {
            LoadOutcome::Ok => LoadState::Loaded,
            LoadOutcome::Partial { failed } => LoadState::Error {
                failures: vec![failed.clone()],
            },
            LoadOutcome::Failed { failures } => LoadState::Error {
                failures: failures.clone(),
            },
        }
    }
}

/// Load status fields read together under one lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    pub loading: bool,
    pub load_state: LoadState,
    pub last_update: Option<DateTime<Utc>>,
    pub last_outcome: Option<LoadOutcome>,
}

/// Change notifications for store consumers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    LoadStateChanged { state: LoadState },
    DataCommitted { brigades: usize, tags: usize },
    FiltersChanged { filters: FilterState },
}

impl StoreEvent {
    /// Variant name, used as the SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::LoadStateChanged { .. } => "LoadStateChanged",
            StoreEvent::DataCommitted { .. } => "DataCommitted",
            StoreEvent::FiltersChanged { .. } => "FiltersChanged",
        }
    }
}

/// Immutable view of the canonical data at one instant
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub brigades: Arc<Vec<Brigade>>,
    pub discourse_tags: Option<Arc<Vec<DiscourseTag>>>,
    pub filters: FilterState,
}

impl Snapshot {
    pub fn projects(&self) -> Vec<Project> {
        flatten_projects(&self.brigades)
    }

    /// Projects passing every active filter
    pub fn filtered_projects(&self) -> Vec<Project> {
        apply_filters(&self.projects(), &self.filters)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    brigades: Arc<Vec<Brigade>>,
    /// `None` until the first successful tag fetch
    discourse_tags: Option<Arc<Vec<DiscourseTag>>>,
    load_state: LoadState,
    last_update: Option<DateTime<Utc>>,
    last_outcome: Option<LoadOutcome>,
    filters: FilterState,
}

/// Application state store
pub struct Store {
    source: Arc<dyn DataSource>,
    state: RwLock<StoreState>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl Store {
    /// Create an empty store reading from `source`
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            source,
            state: RwLock::new(StoreState::default()),
            event_tx,
        }
    }

    /// Subscribe to store change events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Fetch brigades and tags concurrently, then commit both at once.
    ///
    /// Status stays `Loading` until the slower fetch settles. Whatever
    /// succeeded is committed; a failed side keeps its previous value and
    /// is reported in the returned outcome and the `Error` load state.
    ///
    /// Overlapping calls are not cancelled; the call that settles last
    /// wins.
    pub async fn load_all(&self) -> LoadOutcome {
        self.set_load_state(LoadState::Loading).await;
        info!("Loading brigades and tags");

        let (brigades, tags) =
            tokio::join!(self.source.fetch_brigades(), self.source.fetch_tags());

        let mut failures = Vec::new();
        let mut state = self.state.write().await;

        match brigades {
            Ok(raw) => state.brigades = Arc::new(normalize(raw)),
            Err(e) => {
                warn!(error = %e, "Brigade fetch failed, keeping previous data");
                failures.push(FetchFailure::new(FetchTarget::Brigades, &e));
            }
        }

        match tags {
            Ok(tags) => state.discourse_tags = Some(Arc::new(tags)),
            Err(e) => {
                warn!(error = %e, "Tag fetch failed, keeping previous data");
                failures.push(FetchFailure::new(FetchTarget::Tags, &e));
            }
        }

        let outcome = LoadOutcome::from_failures(failures);
        let load_state = outcome.settled_state();

        state.load_state = load_state.clone();
        state.last_update = Some(time::now());
        state.last_outcome = Some(outcome.clone());

        let brigade_count = state.brigades.len();
        let tag_count = state.discourse_tags.as_ref().map_or(0, |t| t.len());
        drop(state);

        info!(
            brigades = brigade_count,
            tags = tag_count,
            ok = outcome.is_ok(),
            "Load settled"
        );

        self.broadcast(StoreEvent::DataCommitted {
            brigades: brigade_count,
            tags: tag_count,
        });
        self.broadcast(StoreEvent::LoadStateChanged { state: load_state });

        outcome
    }

    /// Refresh entry point for "check for updates". Always does a full
    /// reload; `last_check` is only logged.
    pub async fn check_for_updates(&self, last_check: Option<DateTime<Utc>>) -> LoadOutcome {
        match last_check {
            Some(ts) => info!(
                last_check = %ts,
                age_secs = time::age(ts).num_seconds(),
                "Checking for updates"
            ),
            None => info!("Checking for updates (no previous check)"),
        }
        self.load_all().await
    }

    /// Merge the provided filter keys; omitted keys are left unchanged.
    /// Returns the resulting filter state.
    pub async fn set_filters(&self, update: FilterUpdate) -> FilterState {
        debug!(?update, "Updating filters");

        let filters = {
            let mut state = self.state.write().await;
            state.filters.apply(update);
            state.filters.clone()
        };

        self.broadcast(StoreEvent::FiltersChanged {
            filters: filters.clone(),
        });
        filters
    }

    /// Replace only the brigade-name (location) filter
    pub async fn update_location_filters(&self, locations: BTreeSet<String>) -> FilterState {
        self.set_filters(FilterUpdate {
            locations: Some(locations),
            ..Default::default()
        })
        .await
    }

    /// Replace only the topic filter
    pub async fn update_topic_filters(&self, topics: BTreeSet<String>) -> FilterState {
        self.set_filters(FilterUpdate {
            topics: Some(topics),
            ..Default::default()
        })
        .await
    }

    async fn set_load_state(&self, load_state: LoadState) {
        self.state.write().await.load_state = load_state.clone();
        self.broadcast(StoreEvent::LoadStateChanged { state: load_state });
    }

    /// Leave `Loading` after a load was dropped before it committed. The
    /// state falls back to what the last settled load produced.
    async fn abandon_load(&self) {
        let restored = {
            let mut state = self.state.write().await;
            if state.load_state != LoadState::Loading {
                return;
            }
            state.load_state = match &state.last_outcome {
                Some(outcome) => outcome.settled_state(),
                None => LoadState::Idle,
            };
            state.load_state.clone()
        };
        info!("In-flight load abandoned");
        self.broadcast(StoreEvent::LoadStateChanged { state: restored });
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Consistent copy of the canonical data and filters
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            brigades: Arc::clone(&state.brigades),
            discourse_tags: state.discourse_tags.clone(),
            filters: state.filters.clone(),
        }
    }

    pub async fn brigades(&self) -> Arc<Vec<Brigade>> {
        Arc::clone(&self.state.read().await.brigades)
    }

    /// All projects, flattened brigade by brigade
    pub async fn projects(&self) -> Vec<Project> {
        flatten_projects(&self.brigades().await)
    }

    /// Top brigades by share of tagged projects
    pub async fn leaders(&self) -> Vec<Brigade> {
        leaderboard(&self.brigades().await)
    }

    /// Every topic across all projects, ignoring filters
    pub async fn topics(&self) -> BTreeSet<String> {
        all_topics(&self.projects().await)
    }

    pub async fn filters(&self) -> FilterState {
        self.state.read().await.filters.clone()
    }

    pub async fn is_loading(&self) -> bool {
        matches!(self.state.read().await.load_state, LoadState::Loading)
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load_state.clone()
    }

    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_update
    }

    pub async fn last_outcome(&self) -> Option<LoadOutcome> {
        self.state.read().await.last_outcome.clone()
    }

    /// Load state, last update and last outcome from one read
    pub async fn status(&self) -> StoreStatus {
        let state = self.state.read().await;
        StoreStatus {
            loading: state.load_state == LoadState::Loading,
            load_state: state.load_state.clone(),
            last_update: state.last_update,
            last_outcome: state.last_outcome.clone(),
        }
    }

    pub async fn discourse_tags(&self) -> Vec<DiscourseTag> {
        self.state
            .read()
            .await
            .discourse_tags
            .as_ref()
            .map(|t| t.to_vec())
            .unwrap_or_default()
    }

    pub async fn discourse_tag_map(&self) -> HashMap<String, DiscourseTag> {
        let tags = self.state.read().await.discourse_tags.clone();
        tag_map(tags.as_deref().map(|t| t.as_slice()))
    }

    /// Projects active within the current time threshold
    pub async fn projects_filtered_by_time(&self) -> Vec<Project> {
        let snapshot = self.snapshot().await;
        filter_by_activity(&snapshot.projects(), snapshot.filters.time_threshold.buckets())
    }

    /// Topics present among projects active within the current threshold
    pub async fn available_topics(&self) -> BTreeSet<String> {
        let snapshot = self.snapshot().await;
        available_topics(&snapshot.projects(), snapshot.filters.time_threshold)
    }

    /// Projects passing every active filter
    pub async fn filtered_projects(&self) -> Vec<Project> {
        self.snapshot().await.filtered_projects()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Spawn a task that calls [`Store::check_for_updates`] every `interval`.
    ///
    /// The task runs until [`RefreshHandle::shutdown`] is called. A load
    /// still in flight at shutdown is dropped before it commits.
    pub fn start_auto_refresh(self: &Arc<Self>, interval: Duration) -> RefreshHandle {
        let token = CancellationToken::new();
        let store = Arc::clone(self);
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Auto-refresh started");
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                let last_check = store.last_update().await;
                tokio::select! {
                    _ = task_token.cancelled() => {
                        store.abandon_load().await;
                        break;
                    }
                    _ = store.check_for_updates(last_check) => {}
                }
            }
            info!("Auto-refresh stopped");
        });

        RefreshHandle { token, handle }
    }
}

/// Handle to a running auto-refresh task
pub struct RefreshHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the task and wait for it to exit. An in-flight load is dropped.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Auto-refresh task ended abnormally");
        }
    }
}
