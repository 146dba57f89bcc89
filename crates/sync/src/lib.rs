//! Sync layer: remote platform client, location resolution, mirror store and
//! the orchestrator that drives catalog writes through ordered steps.

pub mod config;
pub mod error;
pub mod location;
pub mod mirror;
pub mod orchestrator;
pub mod remote;
pub mod steps;
pub mod workflow;


pub use config::{CatalogSettings, ConfigError, RemoteConfig};
pub use error::{LocationError, MirrorError, RemoteError, SyncError, UserError};
pub use location::LocationResolver;
pub use mirror::{InMemoryMirrorStore, MirrorRecord, MirrorStore, PostgresMirrorStore};
pub use orchestrator::{CatalogSync, EventSync, Page, ProductSync, Synced};
pub use remote::{CatalogApi, HttpRemoteClient, RemoteClient};
pub use workflow::{FailurePolicy, StepOutcome, SyncReport};
