//! DAG editor - the main entry point for Dagflow.
//!
//! The editor coordinates one authoring session: it owns the graph and its
//! edit operations, the validation gateway, the notification relay, the
//! session context and the artifact store, and wires them together so that
//! every graph mutation is pushed for validation and every asynchronous
//! outcome surfaces as a toast.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::runtime::Runtime;
use url::Url;

use crate::{
    DagflowError, Result, ShareLock,
    client::{self, ArtifactStore, LoadedArtifact, SaveReceipt, StatusReceipt},
    common::{MemCache, Shutdown},
    config::Config,
    gateway::{ValidationGateway, kind, ws_endpoint},
    graph::{GraphEditor, GraphModel},
    model::{ArtifactMeta, GraphSnapshot, SearchResult, ValidationResult},
    notify::{NotificationRelay, ToastKind},
    session::SessionContext,
};

/// Maximum number of loaded artifact snapshots to cache in memory.
const SNAPSHOT_CACHE_SIZE: usize = 64;

/// Why the save action is currently unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SaveBlocker {
    /// The snapshot title is empty or whitespace.
    EmptyTitle,
    /// The graph has no nodes.
    EmptyGraph,
    /// No validation verdict has been received yet.
    NotValidated,
    /// The last verdict reported the graph invalid.
    Invalid,
}

impl SaveBlocker {
    pub fn reason(&self) -> &'static str {
        match self {
            SaveBlocker::EmptyTitle => "title is required",
            SaveBlocker::EmptyGraph => "the graph has no nodes",
            SaveBlocker::NotValidated => "no validation verdict received yet",
            SaveBlocker::Invalid => "validation reported errors",
        }
    }
}

/// The latest validation verdict plus the graph revision it was received at.
///
/// The backend contract carries no correlation id, so verdicts apply
/// last-received-wins; the recorded revision lets callers tell a verdict for
/// the current graph from one that predates further edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    pub verdict: Option<ValidationResult>,
    pub revision: u64,
}

/// The main editing session coordinator.
///
/// # Example
///
/// ```rust,ignore
/// let editor = EditorBuilder::new().config(config).build()?;
/// editor.launch();
///
/// // Edit through editor.ops(); every mutation is pushed for validation.
/// // Persist once the verdict is green:
/// if editor.can_save() {
///     editor.save_artifact().await?;
/// }
///
/// editor.shutdown();
/// ```
pub struct Editor {
    /// Base URL of the hosting page.
    base: Url,
    /// The canonical graph of this session.
    graph: Arc<GraphModel>,
    /// The only mutation path over the graph.
    ops: Arc<GraphEditor>,
    /// Live channel to the validation backend.
    gateway: Arc<ValidationGateway>,
    /// Ordered, auto-expiring toast queue.
    relay: Arc<NotificationRelay>,
    /// Server-owned identities (user GUID, loaded artifact id).
    session: Arc<SessionContext>,
    /// Artifact persistence (REST in production, injectable for tests).
    store: Arc<dyn ArtifactStore>,
    /// Bodies of recently loaded artifacts.
    snapshots: MemCache<String, GraphSnapshot>,
    /// Latest saved-artifact list pushed by the server.
    artifacts: ShareLock<Vec<ArtifactMeta>>,
    /// Latest content search results pushed by the server.
    search_results: ShareLock<Vec<SearchResult>>,
    /// Latest validation verdict and the revision it applies to.
    validation: ShareLock<ValidationState>,

    /// Flag indicating if the editor is running.
    running: Arc<AtomicBool>,
    /// Tokio runtime for background task execution.
    runtime: Arc<Runtime>,
    /// Shutdown coordinator for graceful termination.
    shutdown: Arc<Shutdown>,
}

impl Editor {
    pub(crate) fn assemble(
        config: Config,
        base: Url,
        store: Arc<dyn ArtifactStore>,
        runtime: Arc<Runtime>,
    ) -> Result<Self> {
        let graph = Arc::new(GraphModel::new());
        let ops = Arc::new(GraphEditor::new(graph.clone()));
        let gateway = Arc::new(ValidationGateway::new(ws_endpoint(&base)?, &config.gateway, runtime.clone()));
        let relay = Arc::new(NotificationRelay::new(
            Duration::from_millis(config.notify.toast_ttl_ms),
            config.notify.queue_size,
            runtime.clone(),
        ));

        Ok(Self {
            base,
            graph,
            ops,
            gateway,
            relay,
            session: Arc::new(SessionContext::new()),
            store,
            snapshots: MemCache::new(SNAPSHOT_CACHE_SIZE),
            artifacts: ShareLock::new(Vec::new().into()),
            search_results: ShareLock::new(Vec::new().into()),
            validation: ShareLock::new(ValidationState::default().into()),
            running: Arc::new(AtomicBool::new(false)),
            runtime,
            shutdown: Arc::new(Shutdown::new()),
        })
    }

    /// Starts the session: registers the inbound subscriptions, opens the
    /// validation channel, and begins pushing the snapshot on every change.
    pub fn launch(&self) {
        if self.running.swap(true, Ordering::Relaxed) {
            return;
        }

        // Register handlers first, then connect, so no push is missed
        self.register_subscriptions();
        self.gateway.open();

        let mut changes = self.ops.changes().subscribe();
        let graph = self.graph.clone();
        let gateway = self.gateway.clone();
        let shutdown = self.shutdown.clone();
        self.runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    Ok(_) = changes.recv() => {
                        // Whole snapshot, every change - no debounce, no diffing
                        gateway.send_graph(&graph.to_snapshot());
                    }
                }
            }
        });
    }

    /// Gracefully shuts the session down.
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }
        self.shutdown.shutdown();
        self.gateway.close();
    }

    fn register_subscriptions(&self) {
        let validation = self.validation.clone();
        let graph = self.graph.clone();
        self.gateway.on(kind::DAG_VALIDATION, move |_, data| {
            match serde_json::from_value::<ValidationResult>(data.clone()) {
                Ok(verdict) => apply_verdict(&validation, graph.revision(), verdict),
                Err(err) => tracing::warn!("malformed validation verdict: {}", err),
            }
        });

        let session = self.session.clone();
        self.gateway.on(kind::USER_GUID, move |_, data| {
            if let Some(guid) = data.get("guid").and_then(|guid| guid.as_str()) {
                session.set_user_guid(Some(guid.to_string()));
            }
        });

        let session = self.session.clone();
        self.gateway.on(kind::LOADED_DAG_ID, move |_, data| {
            // The server re-asserts this after saves as a confirmation echo
            if let Some(id) = data.get("id").and_then(|id| id.as_str()) {
                session.set_loaded_dag_id(Some(id.to_string()));
            }
        });

        let relay = self.relay.clone();
        self.gateway.on(kind::LOG_EVENT, move |_, data| {
            let message = data.get("message").and_then(|message| message.as_str()).unwrap_or_default();
            if message.is_empty() {
                return;
            }
            let kind = data.get("type").and_then(|kind| kind.as_str()).and_then(|kind| kind.parse::<ToastKind>().ok()).unwrap_or_default();
            relay.raise(message, kind);
        });

        let artifacts = self.artifacts.clone();
        self.gateway.on(kind::ARTIFACTS_LIST, move |_, data| {
            match serde_json::from_value::<Vec<ArtifactMeta>>(data.clone()) {
                Ok(list) => *artifacts.write().unwrap() = list,
                Err(err) => tracing::warn!("malformed artifacts list: {}", err),
            }
        });

        let search_results = self.search_results.clone();
        self.gateway.on(kind::SEARCH_RESULTS, move |_, data| {
            match serde_json::from_value::<Vec<SearchResult>>(data.clone()) {
                Ok(results) => *search_results.write().unwrap() = results,
                Err(err) => tracing::warn!("malformed search results: {}", err),
            }
        });
    }

    /// The canonical graph of this session.
    pub fn graph(&self) -> Arc<GraphModel> {
        self.graph.clone()
    }

    /// The mutation surface; all edits go through here.
    pub fn ops(&self) -> Arc<GraphEditor> {
        self.ops.clone()
    }

    /// The validation channel.
    pub fn gateway(&self) -> Arc<ValidationGateway> {
        self.gateway.clone()
    }

    /// The toast queue.
    pub fn relay(&self) -> Arc<NotificationRelay> {
        self.relay.clone()
    }

    /// The server-owned session identities.
    pub fn session(&self) -> Arc<SessionContext> {
        self.session.clone()
    }

    /// The runtime background work runs on.
    pub fn runtime(&self) -> Arc<Runtime> {
        self.runtime.clone()
    }

    /// The latest validation state.
    pub fn validation(&self) -> ValidationState {
        self.validation.read().unwrap().clone()
    }

    /// Whether the latest verdict was received for the graph as it stands now.
    pub fn is_validation_current(&self) -> bool {
        let state = self.validation.read().unwrap();
        state.verdict.is_some() && state.revision == self.graph.revision()
    }

    pub(crate) fn apply_validation(
        &self,
        verdict: ValidationResult,
    ) {
        apply_verdict(&self.validation, self.graph.revision(), verdict);
    }

    /// The latest saved-artifact list pushed by the server.
    pub fn artifacts(&self) -> Vec<ArtifactMeta> {
        self.artifacts.read().unwrap().clone()
    }

    /// The latest content search results pushed by the server.
    pub fn search_results(&self) -> Vec<SearchResult> {
        self.search_results.read().unwrap().clone()
    }

    /// The cached body of a previously loaded or saved artifact.
    pub fn cached_artifact(
        &self,
        artifact_id: &str,
    ) -> Option<GraphSnapshot> {
        self.snapshots.get(&artifact_id.to_string())
    }

    /// Sends a content search query over the validation channel.
    pub fn search(
        &self,
        query: &str,
    ) {
        self.gateway.send_search(query);
    }

    /// Everything currently standing between this session and a save.
    pub fn save_blockers(&self) -> Vec<SaveBlocker> {
        let mut blockers = Vec::new();
        if self.graph.title().trim().is_empty() {
            blockers.push(SaveBlocker::EmptyTitle);
        }
        if self.graph.node_count() == 0 {
            blockers.push(SaveBlocker::EmptyGraph);
        }
        match &self.validation.read().unwrap().verdict {
            None => blockers.push(SaveBlocker::NotValidated),
            Some(verdict) if !verdict.is_valid => blockers.push(SaveBlocker::Invalid),
            Some(_) => {}
        }
        blockers
    }

    /// Whether the save action is currently available.
    pub fn can_save(&self) -> bool {
        self.save_blockers().is_empty()
    }

    /// Persists the session as an artifact: a create when no artifact is
    /// loaded, an update of the loaded one otherwise.
    ///
    /// This call is the authority for the save gate - it refuses when the
    /// title is blank, the graph is empty, or the last verdict is missing or
    /// negative. Transport failures surface as an error toast and are
    /// returned to the caller.
    pub async fn save_artifact(&self) -> Result<SaveReceipt> {
        let blockers = self.save_blockers();
        if !blockers.is_empty() {
            let reasons: Vec<&str> = blockers.iter().map(|blocker| blocker.reason()).collect();
            return Err(DagflowError::Editor(format!("save blocked: {}", reasons.join(", "))));
        }

        let snapshot = self.graph.to_snapshot();
        let loaded = self.session.loaded_dag_id();
        match self.store.save(&snapshot, loaded.as_deref()).await {
            Ok(receipt) => {
                self.session.set_loaded_dag_id(Some(receipt.artifact_id.clone()));
                self.snapshots.set(receipt.artifact_id.clone(), snapshot);
                self.relay.raise(&receipt.message, ToastKind::Success);
                Ok(receipt)
            }
            Err(err) => {
                self.relay.raise(&format!("Failed to save: {}", err), ToastKind::Error);
                Err(err)
            }
        }
    }

    /// Loads an artifact's graph into the session, replacing its contents.
    pub async fn load_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<LoadedArtifact> {
        match self.store.load(artifact_id).await {
            Ok(loaded) => {
                self.ops.load_snapshot(&loaded.dag)?;
                self.session.set_loaded_dag_id(Some(loaded.artifact_id.clone()));
                self.snapshots.set(loaded.artifact_id.clone(), loaded.dag.clone());
                self.relay.raise(&format!("Loaded DAG: {}", loaded.dag.title), ToastKind::Success);
                Ok(loaded)
            }
            Err(err) => {
                self.relay.raise(&format!("Failed to load: {}", err), ToastKind::Error);
                Err(err)
            }
        }
    }

    /// One-shot create-and-publish of the current session, independent of
    /// `save_artifact`. Status updates arrive over the validation channel.
    pub async fn publish(&self) -> Result<()> {
        let snapshot = self.graph.to_snapshot();
        match self.store.publish_new(&snapshot).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.relay.raise(&format!("Failed to publish: {}", err), ToastKind::Error);
                Err(err)
            }
        }
    }

    /// Publishes a previously saved artifact without resending its graph.
    pub async fn publish_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<()> {
        match self.store.publish_existing(artifact_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.relay.raise(&format!("Failed to publish: {}", err), ToastKind::Error);
                Err(err)
            }
        }
    }

    /// Clones an artifact server-side; the clone's id arrives, if at all,
    /// via the re-broadcast artifact list.
    pub async fn clone_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<StatusReceipt> {
        match self.store.clone_artifact(artifact_id).await {
            Ok(receipt) => {
                self.relay.raise(&receipt.message, ToastKind::Success);
                Ok(receipt)
            }
            Err(err) => {
                self.relay.raise(&format!("Failed to clone: {}", err), ToastKind::Error);
                Err(err)
            }
        }
    }

    /// Deletes an artifact.
    pub async fn delete_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<StatusReceipt> {
        match self.store.delete_artifact(artifact_id).await {
            Ok(receipt) => {
                self.snapshots.remove(&artifact_id.to_string());
                self.relay.raise(&receipt.message, ToastKind::Success);
                Ok(receipt)
            }
            Err(err) => {
                self.relay.raise(&format!("Failed to delete: {}", err), ToastKind::Error);
                Err(err)
            }
        }
    }

    /// Returns the session to the empty state: no nodes, no edges, no title,
    /// no loaded artifact, no verdict.
    pub fn reset_view(&self) {
        self.ops.reset();
        self.session.set_loaded_dag_id(None);
        *self.validation.write().unwrap() = ValidationState::default();
    }

    /// The navigation URL for downloading an artifact. Requires the server to
    /// have pushed the acting user's GUID.
    pub fn download_url(
        &self,
        artifact_id: &str,
    ) -> Result<Url> {
        let guid = self.session.require_user_guid()?;
        client::download_url(&self.base, &guid, artifact_id)
    }
}

fn apply_verdict(
    validation: &ShareLock<ValidationState>,
    revision: u64,
    verdict: ValidationResult,
) {
    let mut state = validation.write().unwrap();
    // Last received wins; the revision records what it was received against
    state.verdict = Some(verdict);
    state.revision = revision;
}

#[cfg(test)]
mod test {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicBool, AtomicU64},
        },
    };

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        EditorBuilder, Envelope,
        config::Config,
        model::{NodeKind, Position},
    };

    #[derive(Default)]
    struct MemoryStore {
        artifacts: Mutex<HashMap<String, GraphSnapshot>>,
        next_id: AtomicU64,
        fail: AtomicBool,
    }

    impl MemoryStore {
        fn fail_requests(&self) {
            self.fail.store(true, Ordering::Relaxed);
        }

        fn gate(&self) -> Result<()> {
            if self.fail.load(Ordering::Relaxed) {
                return Err(DagflowError::Client("Service Unavailable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ArtifactStore for MemoryStore {
        async fn save(
            &self,
            snapshot: &GraphSnapshot,
            loaded_artifact_id: Option<&str>,
        ) -> Result<SaveReceipt> {
            self.gate()?;
            let mut artifacts = self.artifacts.lock().unwrap();
            let (artifact_id, message) = match loaded_artifact_id {
                Some(id) => {
                    if !artifacts.contains_key(id) {
                        return Err(DagflowError::Client("DAG not found".to_string()));
                    }
                    (id.to_string(), "DAG updated successfully".to_string())
                }
                None => {
                    let id = format!("d-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
                    (id, "DAG created successfully".to_string())
                }
            };
            artifacts.insert(artifact_id.clone(), snapshot.clone());
            Ok(SaveReceipt {
                artifact_id,
                message,
            })
        }

        async fn load(
            &self,
            artifact_id: &str,
        ) -> Result<LoadedArtifact> {
            self.gate()?;
            let artifacts = self.artifacts.lock().unwrap();
            let dag = artifacts.get(artifact_id).cloned().ok_or(DagflowError::Client("DAG not found".to_string()))?;
            Ok(LoadedArtifact {
                artifact_id: artifact_id.to_string(),
                dag,
            })
        }

        async fn publish_new(
            &self,
            _snapshot: &GraphSnapshot,
        ) -> Result<()> {
            self.gate()
        }

        async fn publish_existing(
            &self,
            _artifact_id: &str,
        ) -> Result<()> {
            self.gate()
        }

        async fn clone_artifact(
            &self,
            artifact_id: &str,
        ) -> Result<StatusReceipt> {
            self.gate()?;
            let mut artifacts = self.artifacts.lock().unwrap();
            let dag = artifacts.get(artifact_id).cloned().ok_or(DagflowError::Client("DAG not found".to_string()))?;
            let id = format!("d-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
            artifacts.insert(id, dag);
            Ok(StatusReceipt {
                message: "DAG cloned successfully".to_string(),
            })
        }

        async fn delete_artifact(
            &self,
            artifact_id: &str,
        ) -> Result<StatusReceipt> {
            self.gate()?;
            let mut artifacts = self.artifacts.lock().unwrap();
            artifacts.remove(artifact_id).ok_or(DagflowError::Client("DAG not found".to_string()))?;
            Ok(StatusReceipt {
                message: "DAG deleted successfully".to_string(),
            })
        }
    }

    fn editor_with(
        store: Arc<MemoryStore>,
        config: Config,
    ) -> Editor {
        EditorBuilder::new().config(config).store(store).build().unwrap()
    }

    fn editor() -> (Editor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (editor_with(store.clone(), Config::default()), store)
    }

    fn valid_verdict() -> ValidationResult {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn populate(editor: &Editor) {
        let a = editor
            .ops()
            .drop_node(
                NodeKind::Content,
                json!({ "label": "report", "contentGuid": "guid-1", "contentType": "quarto" }),
                Position {
                    x: 100.0,
                    y: 100.0,
                },
                &Default::default(),
            )
            .unwrap();
        let b = editor
            .ops()
            .drop_node(
                NodeKind::Custom,
                json!({ "label": "Webhook", "nodeType": "webhook", "customType": "webhook" }),
                Position {
                    x: 300.0,
                    y: 100.0,
                },
                &Default::default(),
            )
            .unwrap();
        assert!(editor.ops().attempt_connect(&a, &b));
        editor.ops().set_title("release pipeline");
    }

    #[test]
    fn test_save_gate_requires_title_nodes_and_verdict() {
        let (editor, _store) = editor();

        // Empty session: everything blocks
        assert_eq!(editor.save_blockers(), vec![SaveBlocker::EmptyTitle, SaveBlocker::EmptyGraph, SaveBlocker::NotValidated]);

        populate(&editor);
        editor.ops().set_title("");
        editor.apply_validation(valid_verdict());

        // Valid verdict and nodes present, but a blank title still blocks
        assert!(!editor.can_save());
        assert_eq!(editor.save_blockers(), vec![SaveBlocker::EmptyTitle]);

        editor.ops().set_title("release pipeline");
        // The title edit outdated the verdict, but save only requires the
        // last verdict to be green
        assert!(editor.can_save());

        editor.apply_validation(ValidationResult {
            is_valid: false,
            errors: vec!["DAG contains cycles".to_string()],
        });
        assert_eq!(editor.save_blockers(), vec![SaveBlocker::Invalid]);

        let err = editor.runtime().block_on(editor.save_artifact()).unwrap_err();
        assert!(matches!(err, DagflowError::Editor(_)));
    }

    #[test]
    fn test_save_load_round_trip() {
        let (editor, _store) = editor();
        populate(&editor);
        editor.apply_validation(valid_verdict());

        let saved = editor.graph().to_snapshot();
        let receipt = editor.runtime().block_on(editor.save_artifact()).unwrap();
        assert_eq!(editor.session().loaded_dag_id().as_deref(), Some(receipt.artifact_id.as_str()));

        editor.reset_view();
        assert_eq!(editor.graph().node_count(), 0);
        assert!(editor.session().loaded_dag_id().is_none());

        let loaded = editor.runtime().block_on(editor.load_artifact(&receipt.artifact_id)).unwrap();
        assert_eq!(loaded.dag, saved);
        assert_eq!(editor.graph().to_snapshot(), saved);
        assert_eq!(editor.session().loaded_dag_id().as_deref(), Some(receipt.artifact_id.as_str()));
        assert_eq!(editor.cached_artifact(&receipt.artifact_id), Some(saved));
    }

    #[test]
    fn test_second_save_updates_in_place() {
        let (editor, store) = editor();
        populate(&editor);
        editor.apply_validation(valid_verdict());

        let first = editor.runtime().block_on(editor.save_artifact()).unwrap();
        assert_eq!(first.message, "DAG created successfully");

        editor.ops().set_title("release pipeline v2");
        editor.apply_validation(valid_verdict());
        let second = editor.runtime().block_on(editor.save_artifact()).unwrap();

        assert_eq!(second.artifact_id, first.artifact_id);
        assert_eq!(second.message, "DAG updated successfully");
        assert_eq!(store.artifacts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_rest_failures_raise_error_toasts() {
        let (editor, store) = editor();
        populate(&editor);
        editor.apply_validation(valid_verdict());
        store.fail_requests();

        assert!(editor.runtime().block_on(editor.save_artifact()).is_err());
        assert!(editor.runtime().block_on(editor.publish()).is_err());
        assert!(editor.runtime().block_on(editor.clone_artifact("d-0")).is_err());

        let toasts = editor.relay().active();
        assert_eq!(toasts.len(), 3);
        assert!(toasts.iter().all(|toast| toast.kind == ToastKind::Error));
        assert!(toasts[0].message.starts_with("Failed to save:"));
        assert!(toasts[1].message.starts_with("Failed to publish:"));
        assert!(toasts[2].message.starts_with("Failed to clone:"));
    }

    #[test]
    fn test_validation_staleness_tracking() {
        let (editor, _store) = editor();
        populate(&editor);
        assert!(!editor.is_validation_current());

        editor.apply_validation(valid_verdict());
        assert!(editor.is_validation_current());

        editor.ops().set_title("renamed");
        assert!(!editor.is_validation_current());
        // A fresh verdict catches the state up again
        editor.apply_validation(valid_verdict());
        assert!(editor.is_validation_current());
    }

    #[test]
    fn test_toasts_from_both_origins_share_queue_and_expiry() {
        let store = Arc::new(MemoryStore::default());
        let mut config = Config::default();
        config.notify.toast_ttl_ms = 100;
        let editor = editor_with(store, config);
        editor.launch();

        // Server origin: a logEvent envelope off the channel
        editor.gateway().dispatch(&Envelope::new(kind::LOG_EVENT, json!({ "message": "DAG published successfully", "type": "success" })));
        // Local origin: raised directly at a call site
        editor.relay().raise("Failed to publish: Service Unavailable", ToastKind::Error);

        let toasts = editor.relay().active();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].message, "DAG published successfully");
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[1].kind, ToastKind::Error);

        editor.runtime().block_on(async {
            tokio::time::sleep(Duration::from_millis(500)).await;
        });
        assert!(editor.relay().active().is_empty());
        editor.shutdown();
    }

    #[test]
    fn test_session_pushes_update_identities() {
        let (editor, _store) = editor();
        editor.launch();

        editor.gateway().dispatch(&Envelope::new(kind::USER_GUID, json!({ "guid": "user-7" })));
        editor.gateway().dispatch(&Envelope::new(kind::LOADED_DAG_ID, json!({ "id": "d-9" })));

        assert_eq!(editor.session().user_guid().as_deref(), Some("user-7"));
        assert_eq!(editor.session().loaded_dag_id().as_deref(), Some("d-9"));
        editor.shutdown();
    }

    #[test]
    fn test_download_requires_user_identity() {
        let (editor, _store) = editor();
        assert!(editor.download_url("d-1").is_err());

        editor.session().set_user_guid(Some("user-7".to_string()));
        let url = editor.download_url("d-1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/download-artifact/user-7/d-1");
    }

    #[test]
    fn test_artifacts_list_push_replaces_list() {
        let (editor, _store) = editor();
        editor.launch();

        editor.gateway().dispatch(&Envelope::new(
            kind::ARTIFACTS_LIST,
            json!([{
                "id": "d-1",
                "name": "dag_d-1",
                "title": "release pipeline",
                "timestamp": "2024-05-01T10:00:00Z",
                "nodes_count": 3,
                "edges_count": 2,
                "batches_count": 2
            }]),
        ));

        let artifacts = editor.artifacts();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].id, "d-1");
        assert_eq!(artifacts[0].nodes_count, 3);
        editor.shutdown();
    }
}
