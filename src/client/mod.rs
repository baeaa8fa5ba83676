//! REST client for the backend's artifact store.
//!
//! All calls are plain request/response, independent of the WebSocket
//! channel: no retry, no client-side timeout, no cancellation. A non-success
//! status becomes a [`DagflowError::Client`] carrying the response body's
//! `detail` field when present, else the status line. Callers forward that
//! message into the notification relay as an error toast.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use crate::{
    DagflowError, Result,
    model::GraphSnapshot,
    utils::urls::ensure_trailing_slash,
};

/// Receipt of a save call: the artifact's (possibly fresh) identity plus the
/// backend's status message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub artifact_id: String,
    pub message: String,
}

/// One artifact's full graph, fetched by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoadedArtifact {
    pub artifact_id: String,
    pub dag: GraphSnapshot,
}

/// Status message of a clone or delete call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusReceipt {
    pub message: String,
}

/// The artifact store seam.
///
/// Production uses [`HttpPersistenceClient`]; tests and embedded hosts can
/// inject their own implementation. Note that `save` performs no
/// validity/title/node-count guard of its own; the editor is the authority
/// for that gate.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Creates a new artifact when `loaded_artifact_id` is `None`, otherwise
    /// updates the existing one in place.
    async fn save(
        &self,
        snapshot: &GraphSnapshot,
        loaded_artifact_id: Option<&str>,
    ) -> Result<SaveReceipt>;

    /// Fetches one artifact's full graph by id.
    async fn load(
        &self,
        artifact_id: &str,
    ) -> Result<LoadedArtifact>;

    /// One-shot create-and-publish, independent of `save`.
    async fn publish_new(
        &self,
        snapshot: &GraphSnapshot,
    ) -> Result<()>;

    /// Publishes a previously saved artifact without resending its graph.
    async fn publish_existing(
        &self,
        artifact_id: &str,
    ) -> Result<()>;

    /// Server-side duplication; the clone's new id is not returned.
    async fn clone_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<StatusReceipt>;

    /// Deletes an artifact.
    async fn delete_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<StatusReceipt>;
}

/// REST implementation of [`ArtifactStore`] against the hosting page's
/// `api/dags` endpoints.
pub struct HttpPersistenceClient {
    base: Url,
    http: reqwest::Client,
}

impl HttpPersistenceClient {
    pub fn new(base: Url) -> Self {
        Self {
            base: ensure_trailing_slash(&base),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(
        &self,
        path: &str,
    ) -> Result<Url> {
        self.base.join(path).map_err(|e| DagflowError::Client(e.to_string()))
    }

    /// Sends the request and maps a non-success status to the backend's
    /// `detail` message, else the status line.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request.header("Content-Type", "application/json").send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let detail = response
            .json::<JsonValue>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(|detail| detail.as_str()).map(String::from));
        tracing::warn!("artifact request failed with {}", status);
        Err(DagflowError::Client(detail.unwrap_or_else(|| status.to_string())))
    }

    async fn receive<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = self.execute(request).await?;
        response.json::<T>().await.map_err(|e| DagflowError::Convert(e.to_string()))
    }
}

#[async_trait]
impl ArtifactStore for HttpPersistenceClient {
    async fn save(
        &self,
        snapshot: &GraphSnapshot,
        loaded_artifact_id: Option<&str>,
    ) -> Result<SaveReceipt> {
        let url = self.endpoint("api/dags/save")?;
        let body = serde_json::json!({
            "nodes": snapshot.nodes,
            "edges": snapshot.edges,
            "title": snapshot.title,
            "loaded_dag_id": loaded_artifact_id,
        });
        self.receive(self.http.post(url).json(&body)).await
    }

    async fn load(
        &self,
        artifact_id: &str,
    ) -> Result<LoadedArtifact> {
        let url = self.endpoint(&format!("api/dags/{}", artifact_id))?;
        self.receive(self.http.get(url)).await
    }

    async fn publish_new(
        &self,
        snapshot: &GraphSnapshot,
    ) -> Result<()> {
        let url = self.endpoint("api/dags/publish")?;
        let body = serde_json::json!({
            "nodes": snapshot.nodes,
            "edges": snapshot.edges,
            "title": snapshot.title,
        });
        self.execute(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    async fn publish_existing(
        &self,
        artifact_id: &str,
    ) -> Result<()> {
        let url = self.endpoint(&format!("api/dags/{}/publish", artifact_id))?;
        self.execute(self.http.post(url)).await?;
        Ok(())
    }

    async fn clone_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<StatusReceipt> {
        let url = self.endpoint(&format!("api/dags/{}/clone", artifact_id))?;
        self.receive(self.http.post(url)).await
    }

    async fn delete_artifact(
        &self,
        artifact_id: &str,
    ) -> Result<StatusReceipt> {
        let url = self.endpoint(&format!("api/dags/{}", artifact_id))?;
        self.receive(self.http.delete(url)).await
    }
}

/// Builds the artifact download URL the host navigates to. The stream itself
/// is fetched by the browser, not by this client.
pub fn download_url(
    base: &Url,
    user_guid: &str,
    artifact_id: &str,
) -> Result<Url> {
    ensure_trailing_slash(base)
        .join(&format!("download-artifact/{}/{}", user_guid, artifact_id))
        .map_err(|e| DagflowError::Client(e.to_string()))
}
