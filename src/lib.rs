//! # Dagflow
//!
//! Dagflow is an embeddable DAG-authoring engine written in Rust. It holds the
//! graph a user is editing, enforces the structural invariants (no self-loops,
//! no cycles, reachability-preserving node deletion), streams every change to a
//! validation backend over a WebSocket channel, and persists named snapshots
//! ("artifacts") through a REST client.
//!
//! ## Core Features
//!
//! - **Invariant-Enforcing Edits**: all edge mutations pass a connect gate that
//!   rejects self-loops and cycles before they exist
//! - **Live Validation**: the full graph is pushed to the backend on every
//!   change; verdicts stream back asynchronously and gate saving
//! - **Artifact Persistence**: save/load/publish/clone/delete named graph
//!   snapshots over REST
//! - **Unified Notifications**: server pushes and local failures land in one
//!   ordered, auto-expiring toast queue
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dagflow::{EditorBuilder, NodeKind, Position, Viewport};
//!
//! let editor = EditorBuilder::new().build()?;
//! editor.launch();
//!
//! // Drop two nodes and connect them
//! let a = editor.ops().drop_node(NodeKind::Content, payload, Position { x: 100.0, y: 100.0 }, &Viewport::default())?;
//! let b = editor.ops().drop_node(NodeKind::Custom, action, Position { x: 300.0, y: 100.0 }, &Viewport::default())?;
//! editor.ops().attempt_connect(&a, &b);
//!
//! // Persist once the backend reports the graph valid
//! let receipt = editor.save_artifact().await?;
//! ```

mod builder;
mod client;
mod common;
mod config;
mod editor;
mod error;
mod gateway;
mod graph;
mod model;
mod notify;
mod session;
mod utils;

use std::sync::{Arc, RwLock};

pub use builder::EditorBuilder;
pub use client::{ArtifactStore, HttpPersistenceClient, LoadedArtifact, SaveReceipt, StatusReceipt};
pub use config::{Config, EndpointConfig, GatewayConfig, NotifyConfig};
pub use editor::{Editor, SaveBlocker, ValidationState};
pub use error::DagflowError;
pub use gateway::{Envelope, SubscriptionId, ValidationGateway, kind};
pub use graph::{GraphChange, GraphEditor, GraphModel, Viewport};
pub use model::*;
pub use notify::{NotificationRelay, Toast, ToastKind};
pub use session::SessionContext;

/// Result type alias for Dagflow operations.
pub type Result<T> = std::result::Result<T, DagflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
