//! Aggregation Context
//!
//! Loads the seven lab collections once, concurrently, and publishes the
//! combined snapshot together with a loading/error state. Views subscribe to
//! the published [`LoadState`]; nothing downstream mutates it.
//!
//! State flow: `Idle -> Loading -> Ready | Failed`. `Ready` and `Failed` are
//! terminal for the lifetime of a [`LabContext`].

use crate::api::types::{
    Award, Collaboration, Grant, LabMember, Partnership, Project, Publication,
};
use crate::api::{format_fetch_error, FailureKind, FetchError};
use crate::resource::{coalesce, LabSource, Resource};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinError, JoinHandle};

/// Everything the views render, loaded once per session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabSnapshot {
    pub lab_members: Vec<LabMember>,
    pub projects: Vec<Project>,
    pub collaborations: Vec<Collaboration>,
    pub grants: Vec<Grant>,
    pub awards: Vec<Award>,
    pub publications: Vec<Publication>,
    pub partnerships: Vec<Partnership>,
    /// Collections that came back empty because their fetch failed
    pub failures: Vec<ResourceFailure>,
}

static EMPTY_SNAPSHOT: LabSnapshot = LabSnapshot {
    lab_members: Vec::new(),
    projects: Vec::new(),
    collaborations: Vec::new(),
    grants: Vec::new(),
    awards: Vec::new(),
    publications: Vec::new(),
    partnerships: Vec::new(),
    failures: Vec::new(),
};

impl LabSnapshot {
    /// Shared empty snapshot, handed out while loading or after a failure
    pub fn empty() -> &'static LabSnapshot {
        &EMPTY_SNAPSHOT
    }

    pub fn len_of(&self, resource: Resource) -> usize {
        match resource {
            Resource::Members => self.lab_members.len(),
            Resource::Projects => self.projects.len(),
            Resource::Collaborations => self.collaborations.len(),
            Resource::Grants => self.grants.len(),
            Resource::Awards => self.awards.len(),
            Resource::Publications => self.publications.len(),
            Resource::Partnerships => self.partnerships.len(),
        }
    }

    /// Whether `resource` is empty because its fetch failed
    pub fn failed(&self, resource: Resource) -> Option<&ResourceFailure> {
        self.failures.iter().find(|f| f.resource == resource)
    }
}

/// A per-resource failure that was coalesced into an empty collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFailure {
    pub resource: Resource,
    pub kind: FailureKind,
    /// User-facing description
    pub message: String,
}

/// Failure of the aggregation step itself
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load lab content: {0}")]
    Aggregation(String),
    #[error("loading was cancelled")]
    Cancelled,
}

/// Published state of the context
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready(Arc<LabSnapshot>),
    Failed(LoadError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Idle | LoadState::Loading)
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// The loaded snapshot, or an empty one in every other state
    pub fn snapshot(&self) -> &LabSnapshot {
        match self {
            LoadState::Ready(snapshot) => snapshot,
            _ => LabSnapshot::empty(),
        }
    }
}

/// Run the seven fetches concurrently and coalesce their failures
pub async fn load_snapshot(source: &dyn LabSource) -> LabSnapshot {
    let (members, projects, collaborations, grants, awards, publications, partnerships) = futures::join!(
        source.members(),
        source.projects(),
        source.collaborations(),
        source.grants(),
        source.awards(),
        source.publications(),
        source.partnerships(),
    );

    let mut failures = Vec::new();
    let snapshot = LabSnapshot {
        lab_members: settle(Resource::Members, members, &mut failures),
        projects: settle(Resource::Projects, projects, &mut failures),
        collaborations: settle(Resource::Collaborations, collaborations, &mut failures),
        grants: settle(Resource::Grants, grants, &mut failures),
        awards: settle(Resource::Awards, awards, &mut failures),
        publications: settle(Resource::Publications, publications, &mut failures),
        partnerships: settle(Resource::Partnerships, partnerships, &mut failures),
        failures,
    };

    tracing::info!(
        "Loaded lab content: {} members, {} projects, {} publications ({} failed)",
        snapshot.lab_members.len(),
        snapshot.projects.len(),
        snapshot.publications.len(),
        snapshot.failures.len()
    );

    snapshot
}

fn settle<T>(
    resource: Resource,
    result: Result<Vec<T>, FetchError>,
    failures: &mut Vec<ResourceFailure>,
) -> Vec<T> {
    let (items, error) = coalesce(resource, result);
    if let Some(e) = error {
        failures.push(ResourceFailure {
            resource,
            kind: e.kind(),
            message: format_fetch_error(&e),
        });
    }
    items
}

fn panic_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown error".to_string()),
        Err(_) => "task cancelled".to_string(),
    }
}

/// Owner of the load task and the published state
///
/// Dropping the context aborts a load still in flight, so nothing is
/// published after teardown.
pub struct LabContext {
    state: watch::Receiver<LoadState>,
    loader: AbortHandle,
    task: JoinHandle<()>,
}

impl LabContext {
    /// Start loading from `source`. Must be called within a tokio runtime.
    pub fn start(source: Arc<dyn LabSource>) -> Self {
        let (tx, rx) = watch::channel(LoadState::Idle);
        tx.send_replace(LoadState::Loading);
        tracing::debug!("Lab context loading");

        let loader = tokio::spawn(async move { load_snapshot(source.as_ref()).await });
        let loader_abort = loader.abort_handle();

        let task = tokio::spawn(async move {
            let next = match loader.await {
                Ok(snapshot) => LoadState::Ready(Arc::new(snapshot)),
                Err(e) if e.is_cancelled() => LoadState::Failed(LoadError::Cancelled),
                Err(e) => {
                    let message = panic_message(e);
                    tracing::error!("Lab content aggregation failed: {}", message);
                    LoadState::Failed(LoadError::Aggregation(message))
                }
            };

            if tx.send(next).is_err() {
                tracing::debug!("No subscribers left, discarding loaded state");
            }
        });

        Self {
            state: rx,
            loader: loader_abort,
            task,
        }
    }

    /// Current state (cloned; snapshots are shared through `Arc`)
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.clone()
    }

    /// Wait until the load settles into `Ready` or `Failed`
    pub async fn settled(&self) -> LoadState {
        let mut rx = self.state.clone();
        let settled = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => LoadState::Failed(LoadError::Cancelled),
        };
        settled
    }
}

impl Drop for LabContext {
    fn drop(&mut self) {
        // Publisher first, so a cancelled loader is never reported as Failed
        self.task.abort();
        self.loader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MockLabSource;
    use async_trait::async_trait;
    use reqwest::StatusCode;

    fn member(id: u64, name: &str) -> LabMember {
        LabMember {
            id,
            slug: name.to_lowercase(),
            name: name.to_string(),
            is_active: true,
            ..Default::default()
        }
    }

    fn project(id: u64, title: &str) -> Project {
        Project {
            id,
            slug: title.to_lowercase(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn publication(id: u64, year: i32) -> Publication {
        Publication {
            id,
            slug: format!("pub-{}", id),
            year,
            ..Default::default()
        }
    }

    /// Mock whose seven collections are all empty
    fn empty_source() -> MockLabSource {
        let mut source = MockLabSource::new();
        source.expect_members().returning(|| Ok(Vec::new()));
        source.expect_projects().returning(|| Ok(Vec::new()));
        source.expect_collaborations().returning(|| Ok(Vec::new()));
        source.expect_grants().returning(|| Ok(Vec::new()));
        source.expect_awards().returning(|| Ok(Vec::new()));
        source.expect_publications().returning(|| Ok(Vec::new()));
        source.expect_partnerships().returning(|| Ok(Vec::new()));
        source
    }

    struct PanickingSource;

    #[async_trait]
    impl LabSource for PanickingSource {
        async fn members(&self) -> Result<Vec<LabMember>, FetchError> {
            panic!("members exploded")
        }
        async fn projects(&self) -> Result<Vec<Project>, FetchError> {
            Ok(vec![project(1, "Kept")])
        }
        async fn collaborations(&self) -> Result<Vec<Collaboration>, FetchError> {
            Ok(Vec::new())
        }
        async fn grants(&self) -> Result<Vec<Grant>, FetchError> {
            Ok(Vec::new())
        }
        async fn awards(&self) -> Result<Vec<Award>, FetchError> {
            Ok(Vec::new())
        }
        async fn publications(&self) -> Result<Vec<Publication>, FetchError> {
            Ok(Vec::new())
        }
        async fn partnerships(&self) -> Result<Vec<Partnership>, FetchError> {
            Ok(Vec::new())
        }
    }

    /// Never finishes loading members
    struct StalledSource;

    #[async_trait]
    impl LabSource for StalledSource {
        async fn members(&self) -> Result<Vec<LabMember>, FetchError> {
            futures::future::pending().await
        }
        async fn projects(&self) -> Result<Vec<Project>, FetchError> {
            Ok(Vec::new())
        }
        async fn collaborations(&self) -> Result<Vec<Collaboration>, FetchError> {
            Ok(Vec::new())
        }
        async fn grants(&self) -> Result<Vec<Grant>, FetchError> {
            Ok(Vec::new())
        }
        async fn awards(&self) -> Result<Vec<Award>, FetchError> {
            Ok(Vec::new())
        }
        async fn publications(&self) -> Result<Vec<Publication>, FetchError> {
            Ok(Vec::new())
        }
        async fn partnerships(&self) -> Result<Vec<Partnership>, FetchError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn distinct_collections_are_published_in_order() {
        let members = vec![member(1, "Alice"), member(2, "Bob")];
        let projects = vec![project(10, "Sensors"), project(11, "Drones")];
        let collaborations = vec![Collaboration {
            id: 20,
            name: "Partner Lab".into(),
            ..Default::default()
        }];
        let grants = vec![Grant {
            id: 30,
            title: "NSERC".into(),
            ..Default::default()
        }];
        let awards = vec![Award {
            id: 40,
            title: "Best Demo".into(),
            ..Default::default()
        }];
        let publications = vec![publication(50, 2024), publication(51, 2022)];
        let partnerships = vec![Partnership {
            id: 60,
            name: "City".into(),
            ..Default::default()
        }];

        let mut source = MockLabSource::new();
        let m = members.clone();
        source.expect_members().times(1).returning(move || Ok(m.clone()));
        let p = projects.clone();
        source.expect_projects().times(1).returning(move || Ok(p.clone()));
        let c = collaborations.clone();
        source
            .expect_collaborations()
            .times(1)
            .returning(move || Ok(c.clone()));
        let g = grants.clone();
        source.expect_grants().times(1).returning(move || Ok(g.clone()));
        let a = awards.clone();
        source.expect_awards().times(1).returning(move || Ok(a.clone()));
        let pb = publications.clone();
        source
            .expect_publications()
            .times(1)
            .returning(move || Ok(pb.clone()));
        let ps = partnerships.clone();
        source
            .expect_partnerships()
            .times(1)
            .returning(move || Ok(ps.clone()));

        let context = LabContext::start(Arc::new(source));
        let state = context.settled().await;

        assert!(!state.is_loading());
        assert!(state.error().is_none());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.lab_members, members);
        assert_eq!(snapshot.projects, projects);
        assert_eq!(snapshot.collaborations, collaborations);
        assert_eq!(snapshot.grants, grants);
        assert_eq!(snapshot.awards, awards);
        assert_eq!(snapshot.publications, publications);
        assert_eq!(snapshot.partnerships, partnerships);
        assert!(snapshot.failures.is_empty());
    }

    #[tokio::test]
    async fn all_empty_still_reaches_ready() {
        let context = LabContext::start(Arc::new(empty_source()));
        let state = context.settled().await;

        assert!(matches!(state, LoadState::Ready(_)));
        for resource in Resource::ALL {
            assert_eq!(state.snapshot().len_of(resource), 0);
        }
    }

    #[tokio::test]
    async fn per_resource_failures_are_coalesced_and_recorded() {
        let mut source = MockLabSource::new();
        source
            .expect_members()
            .returning(|| Ok(vec![member(1, "Alice")]));
        source.expect_projects().returning(|| {
            Err(FetchError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
            })
        });
        source.expect_collaborations().returning(|| Ok(Vec::new()));
        source.expect_grants().returning(|| Ok(Vec::new()));
        source.expect_awards().returning(|| Ok(Vec::new()));
        source.expect_publications().returning(|| {
            Err(serde_json::from_str::<serde_json::Value>("{").unwrap_err().into())
        });
        source.expect_partnerships().returning(|| Ok(Vec::new()));

        let snapshot = load_snapshot(&source).await;

        assert_eq!(snapshot.lab_members.len(), 1);
        assert!(snapshot.projects.is_empty());
        assert!(snapshot.publications.is_empty());
        assert_eq!(snapshot.failures.len(), 2);
        assert_eq!(
            snapshot.failed(Resource::Projects).map(|f| f.kind),
            Some(FailureKind::Status(500))
        );
        assert_eq!(
            snapshot.failed(Resource::Publications).map(|f| f.kind),
            Some(FailureKind::Decode)
        );
        assert!(snapshot.failed(Resource::Grants).is_none());
    }

    #[tokio::test]
    async fn aggregation_panic_publishes_failed_with_empty_collections() {
        let context = LabContext::start(Arc::new(PanickingSource));
        let state = context.settled().await;

        match state.error() {
            Some(LoadError::Aggregation(message)) => assert!(message.contains("members exploded")),
            other => panic!("expected aggregation error, got {:?}", other),
        }
        assert!(!state.is_loading());
        for resource in Resource::ALL {
            assert_eq!(state.snapshot().len_of(resource), 0);
        }
    }

    #[tokio::test]
    async fn starts_in_loading() {
        let context = LabContext::start(Arc::new(StalledSource));
        assert!(matches!(context.state(), LoadState::Loading));
        assert!(context.state().snapshot().lab_members.is_empty());
    }

    #[tokio::test]
    async fn dropping_the_context_discards_the_load() {
        let context = LabContext::start(Arc::new(StalledSource));
        let mut rx = context.subscribe();
        drop(context);

        // Sender goes away without ever publishing a settled state
        assert!(rx.wait_for(|state| !state.is_loading()).await.is_err());
    }

    #[test]
    fn default_state_is_idle_and_loading() {
        let state = LoadState::default();
        assert!(matches!(state, LoadState::Idle));
        assert!(state.is_loading());
        assert!(state.error().is_none());
    }
}
