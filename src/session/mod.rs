//! Session context: the two identities the server owns.
//!
//! Both values arrive asynchronously over the validation channel and may
//! change at any time, independent of anything the user just did (the server
//! re-asserts the loaded artifact id after saves as a confirmation echo).
//! Last value received wins.

use crate::{DagflowError, Result, ShareLock};

/// Identity of the acting user and of the loaded artifact, if any.
#[derive(Default)]
pub struct SessionContext {
    user_guid: ShareLock<Option<String>>,
    loaded_dag_id: ShareLock<Option<String>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// GUID of the acting user, once the server has pushed it.
    pub fn user_guid(&self) -> Option<String> {
        self.user_guid.read().unwrap().clone()
    }

    pub fn set_user_guid(
        &self,
        guid: Option<String>,
    ) {
        *self.user_guid.write().unwrap() = guid;
    }

    /// Id of the artifact currently loaded in the editor, if any. Decides
    /// create-vs-update on save.
    pub fn loaded_dag_id(&self) -> Option<String> {
        self.loaded_dag_id.read().unwrap().clone()
    }

    pub fn set_loaded_dag_id(
        &self,
        artifact_id: Option<String>,
    ) {
        *self.loaded_dag_id.write().unwrap() = artifact_id;
    }

    /// The user GUID, or an error for actions that cannot proceed without one
    /// (e.g. building a download URL).
    pub fn require_user_guid(&self) -> Result<String> {
        self.user_guid().ok_or(DagflowError::Session("user identity not yet received".to_string()))
    }
}
