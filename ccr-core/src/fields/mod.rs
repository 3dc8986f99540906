//! Follower index form fields
//!
//! A follower index is edited as a flat map of field id to string value. The map
//! is never mutated in place: edits arrive as a [`FieldPatch`] and
//! [`FieldValues::merge`] produces the next record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod advanced;
pub mod registry;

pub use advanced::ADVANCED_SETTINGS;
pub use registry::{FieldDefinition, FieldKind, FieldRegistry, Validator};

/// Every field the follower index form knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    Name,
    RemoteCluster,
    LeaderIndex,
    MaxReadRequestOperationCount,
    MaxOutstandingReadRequests,
    MaxReadRequestSize,
    MaxWriteRequestOperationCount,
    MaxWriteRequestSize,
    MaxOutstandingWriteRequests,
    MaxWriteBufferCount,
    MaxWriteBufferSize,
    MaxRetryDelay,
    ReadPollTimeout,
}

impl FieldId {
    pub const IDENTITY: [FieldId; 3] = [FieldId::Name, FieldId::RemoteCluster, FieldId::LeaderIndex];

    pub const ADVANCED: [FieldId; 10] = [
        FieldId::MaxReadRequestOperationCount,
        FieldId::MaxOutstandingReadRequests,
        FieldId::MaxReadRequestSize,
        FieldId::MaxWriteRequestOperationCount,
        FieldId::MaxWriteRequestSize,
        FieldId::MaxOutstandingWriteRequests,
        FieldId::MaxWriteBufferCount,
        FieldId::MaxWriteBufferSize,
        FieldId::MaxRetryDelay,
        FieldId::ReadPollTimeout,
    ];

    pub fn all() -> impl Iterator<Item = FieldId> {
        Self::IDENTITY.into_iter().chain(Self::ADVANCED)
    }

    pub fn is_advanced(&self) -> bool {
        !Self::IDENTITY.contains(self)
    }

    /// Form key, as used in URLs and saved payloads
    pub fn key(&self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::RemoteCluster => "remoteCluster",
            FieldId::LeaderIndex => "leaderIndex",
            FieldId::MaxReadRequestOperationCount => "maxReadRequestOperationCount",
            FieldId::MaxOutstandingReadRequests => "maxOutstandingReadRequests",
            FieldId::MaxReadRequestSize => "maxReadRequestSize",
            FieldId::MaxWriteRequestOperationCount => "maxWriteRequestOperationCount",
            FieldId::MaxWriteRequestSize => "maxWriteRequestSize",
            FieldId::MaxOutstandingWriteRequests => "maxOutstandingWriteRequests",
            FieldId::MaxWriteBufferCount => "maxWriteBufferCount",
            FieldId::MaxWriteBufferSize => "maxWriteBufferSize",
            FieldId::MaxRetryDelay => "maxRetryDelay",
            FieldId::ReadPollTimeout => "readPollTimeout",
        }
    }

    /// Parameter name in the cluster's CCR API
    pub fn api_key(&self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::RemoteCluster => "remote_cluster",
            FieldId::LeaderIndex => "leader_index",
            FieldId::MaxReadRequestOperationCount => "max_read_request_operation_count",
            FieldId::MaxOutstandingReadRequests => "max_outstanding_read_requests",
            FieldId::MaxReadRequestSize => "max_read_request_size",
            FieldId::MaxWriteRequestOperationCount => "max_write_request_operation_count",
            FieldId::MaxWriteRequestSize => "max_write_request_size",
            FieldId::MaxOutstandingWriteRequests => "max_outstanding_write_requests",
            FieldId::MaxWriteBufferCount => "max_write_buffer_count",
            FieldId::MaxWriteBufferSize => "max_write_buffer_size",
            FieldId::MaxRetryDelay => "max_retry_delay",
            FieldId::ReadPollTimeout => "read_poll_timeout",
        }
    }

    /// Accepts either the form key or the API parameter name.
    pub fn from_key(key: &str) -> Option<FieldId> {
        FieldId::all().find(|id| id.key() == key || id.api_key() == key)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Current value of every field. Absent and empty are the same thing: `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<FieldId, String>);

impl Default for FieldValues {
    fn default() -> Self {
        Self(FieldId::all().map(|id| (id, String::new())).collect())
    }
}

impl FieldValues {
    pub fn get(&self, id: FieldId) -> &str {
        self.0.get(&id).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.0.contains_key(&id)
    }

    /// Apply a partial update, returning the new record.
    pub fn merge(&self, patch: &FieldPatch) -> FieldValues {
        let mut next = self.0.clone();
        for (id, value) in patch.iter() {
            next.insert(id, value.to_string());
        }
        FieldValues(next)
    }

    /// The same record with one field removed entirely.
    pub fn without(&self, id: FieldId) -> FieldValues {
        let mut next = self.0.clone();
        next.remove(&id);
        FieldValues(next)
    }

    /// Non-empty advanced settings only
    pub fn non_empty_advanced(&self) -> FieldPatch {
        self.0
            .iter()
            .filter(|(id, value)| id.is_advanced() && !value.is_empty())
            .map(|(id, value)| (*id, value.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.0.iter().map(|(id, value)| (*id, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(FieldId, String)> for FieldValues {
    fn from_iter<T: IntoIterator<Item = (FieldId, String)>>(iter: T) -> Self {
        FieldValues::default().merge(&iter.into_iter().collect::<FieldPatch>())
    }
}

/// A partial update to [`FieldValues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch(BTreeMap<FieldId, String>);

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: FieldId, value: impl Into<String>) -> Self {
        Self::new().set(id, value)
    }

    pub fn set(mut self, id: FieldId, value: impl Into<String>) -> Self {
        self.0.insert(id, value.into());
        self
    }

    pub fn get(&self, id: FieldId) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.0.iter().map(|(id, value)| (*id, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(FieldId, String)> for FieldPatch {
    fn from_iter<T: IntoIterator<Item = (FieldId, String)>>(iter: T) -> Self {
        FieldPatch(iter.into_iter().collect())
    }
}

/// A validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    /// Shown even before the user has tried to submit.
    pub always_visible: bool,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            always_visible: false,
        }
    }

    pub fn sticky(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            always_visible: true,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Tracked error state, one entry per validated field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FieldId, Option<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: FieldId, error: Option<FieldError>) {
        self.0.insert(id, error);
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldError> {
        self.0.get(&id).and_then(Option::as_ref)
    }

    pub fn is_tracked(&self, id: FieldId) -> bool {
        self.0.contains_key(&id)
    }

    /// True when no tracked field carries an error
    pub fn is_valid(&self) -> bool {
        self.0.values().all(Option::is_none)
    }

    pub fn errors(&self) -> impl Iterator<Item = (FieldId, &FieldError)> {
        self.0
            .iter()
            .filter_map(|(id, error)| error.as_ref().map(|e| (*id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let base = FieldValues::default().merge(
            &FieldPatch::new()
                .set(FieldId::Name, "orders-follower")
                .set(FieldId::RemoteCluster, "cluster-a"),
        );
        let next = base.merge(&FieldPatch::single(FieldId::LeaderIndex, "orders"));

        assert_eq!(next.get(FieldId::Name), "orders-follower");
        assert_eq!(next.get(FieldId::RemoteCluster), "cluster-a");
        assert_eq!(next.get(FieldId::LeaderIndex), "orders");
        // The original record is untouched.
        assert_eq!(base.get(FieldId::LeaderIndex), "");
    }

    #[test]
    fn test_default_has_every_field_empty() {
        let values = FieldValues::default();
        assert_eq!(values.len(), 13);
        assert!(FieldId::all().all(|id| values.get(id).is_empty()));
    }

    #[test]
    fn test_without_removes_key() {
        let values = FieldValues::default().without(FieldId::Name);
        assert!(!values.contains(FieldId::Name));
        assert!(values.contains(FieldId::LeaderIndex));
    }

    #[test]
    fn test_non_empty_advanced() {
        let values = FieldValues::default().merge(
            &FieldPatch::new()
                .set(FieldId::Name, "x")
                .set(FieldId::MaxRetryDelay, "10s")
                .set(FieldId::MaxWriteBufferSize, ""),
        );
        let cached = values.non_empty_advanced();
        assert_eq!(cached, FieldPatch::single(FieldId::MaxRetryDelay, "10s"));
    }

    #[test]
    fn test_from_key_accepts_both_spellings() {
        assert_eq!(FieldId::from_key("maxRetryDelay"), Some(FieldId::MaxRetryDelay));
        assert_eq!(FieldId::from_key("max_retry_delay"), Some(FieldId::MaxRetryDelay));
        assert_eq!(FieldId::from_key("bogus"), None);
    }

    #[test]
    fn test_field_errors_validity() {
        let mut errors = FieldErrors::new();
        errors.set(FieldId::Name, None);
        errors.set(FieldId::LeaderIndex, None);
        assert!(errors.is_valid());

        errors.set(FieldId::LeaderIndex, Some(FieldError::new("required")));
        assert!(!errors.is_valid());
        assert_eq!(errors.errors().count(), 1);

        errors.set(FieldId::LeaderIndex, None);
        assert!(errors.is_valid());
    }
}
