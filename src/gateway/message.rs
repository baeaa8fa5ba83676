//! Wire envelope of the validation channel.
//!
//! Every message, both directions, is one JSON object `{type, data}`: one
//! message per logical event. No batching, no sequence numbers, no acks.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Result, model::GraphSnapshot};

/// Inbound and outbound message kinds of the validation channel.
pub mod kind {
    /// Verdict for the latest pushed snapshot.
    pub const DAG_VALIDATION: &str = "dag_validation";
    /// Identity of the acting user, pushed by the server.
    pub const USER_GUID: &str = "user_guid";
    /// Identity of the loaded artifact, may arrive after any save.
    pub const LOADED_DAG_ID: &str = "loaded_dag_id";
    /// Content search results for the sidebar.
    pub const SEARCH_RESULTS: &str = "search_results";
    /// Saved-artifact list, re-broadcast after save/delete.
    pub const ARTIFACTS_LIST: &str = "artifacts_list";
    /// Server-raised status message for the toast queue.
    pub const LOG_EVENT: &str = "logEvent";
    /// Outbound: the full graph snapshot, sent on every change.
    pub const DAG_DATA: &str = "dag_data";
    /// Outbound: a content search query.
    pub const SEARCH_QUERY: &str = "search_query";
}

/// One logical event on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: JsonValue,
}

impl Envelope {
    pub fn new(
        kind: &str,
        data: JsonValue,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            data,
        }
    }

    /// The `dag_data` push carrying a whole snapshot.
    pub fn dag_data(snapshot: &GraphSnapshot) -> Result<Self> {
        Ok(Self::new(kind::DAG_DATA, serde_json::to_value(snapshot)?))
    }

    /// The `search_query` request.
    pub fn search_query(query: &str) -> Self {
        Self::new(kind::SEARCH_QUERY, serde_json::json!({ "query": query }))
    }
}
