//! Collaborators the follower index form depends on
//!
//! The form never talks to the network, the router or the error screen directly.
//! Callers hand it implementations of these traits.

use crate::error::{CcrError, CcrResult};
use crate::fields::FieldValues;
use crate::types::IndexInfo;
use async_trait::async_trait;

/// Source of the index names used by the follower name collision check.
#[async_trait]
pub trait IndexCatalog: Send + Sync {
    async fn load_indices(&self) -> CcrResult<Vec<IndexInfo>>;
}

/// Receives a validated follower index.
pub trait FollowerIndexSaver: Send + Sync {
    /// `fields` never contains the name; it is passed separately.
    fn save_follower_index(&self, name: &str, fields: FieldValues);

    /// Dismiss the error left by a previous failed save.
    fn clear_api_error(&self);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Sink for failures that are not a validation outcome.
pub trait FatalErrorReporter: Send + Sync {
    fn report_fatal(&self, error: &CcrError, title: &str);
}
