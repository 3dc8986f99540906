//! Core building blocks of the CCR console: follower index fields and their
//! validation, the debouncer behind the name collision check, the collaborator
//! traits of the follower index form, and the cluster REST client.

pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fields;
pub mod query;
pub mod services;
pub mod types;

pub use client::{ClusterApi, HttpClusterClient};
pub use config::ConsoleConfig;
pub use debounce::Debouncer;
pub use error::{ApiError, CcrError, CcrResult};
pub use fields::{FieldError, FieldErrors, FieldId, FieldPatch, FieldRegistry, FieldValues};
pub use services::{FatalErrorReporter, FollowerIndexSaver, IndexCatalog, Navigator};
pub use types::{ApiStatus, FollowerIndex, FollowerStatus, IndexInfo, RemoteCluster};
