use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::{
    Config, DagflowError, Editor, Result,
    client::{ArtifactStore, HttpPersistenceClient},
};

/// Builder for an [`Editor`].
///
/// Hosts embedding several editors, or tests, can inject their own runtime
/// and artifact store; everything else is derived from the config.
pub struct EditorBuilder {
    config: Config,
    rt: Option<Arc<Runtime>>,
    store: Option<Arc<dyn ArtifactStore>>,
}

impl Default for EditorBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            rt: None,
            store: None,
        }
    }
}

impl EditorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    pub fn store(
        mut self,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Editor> {
        let runtime = match self.rt {
            Some(runtime) => runtime,
            None => Arc::new(
                Builder::new_multi_thread()
                    .worker_threads(self.config.async_worker_thread_number.into())
                    .enable_all()
                    .build()
                    .map_err(|e| DagflowError::Editor(e.to_string()))?,
            ),
        };

        let base = Url::parse(&self.config.endpoint.base_url).map_err(|e| DagflowError::Config(format!("invalid base url: {}", e)))?;
        let store = match self.store {
            Some(store) => store,
            None => Arc::new(HttpPersistenceClient::new(base.clone())),
        };

        Editor::assemble(self.config, base, store, runtime)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_rejects_malformed_base_url() {
        let mut config = Config::default();
        config.endpoint.base_url = "not a url".to_string();
        assert!(EditorBuilder::new().config(config).build().is_err());
    }

    #[test]
    fn test_build_with_defaults() {
        let editor = EditorBuilder::new().build().unwrap();
        assert_eq!(editor.graph().node_count(), 0);
        assert!(!editor.can_save());
    }
}
