//! Cluster resources the console works with

use crate::fields::{FieldId, FieldValues};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A connection registered on the local cluster to another cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCluster {
    pub name: String,
    pub is_connected: bool,
    #[serde(default)]
    pub seeds: Vec<String>,
}

impl RemoteCluster {
    pub fn new(name: impl Into<String>, is_connected: bool) -> Self {
        Self {
            name: name.into(),
            is_connected,
            seeds: Vec::new(),
        }
    }
}

/// An index on the local cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
}

impl IndexInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowerStatus {
    Active,
    Paused,
}

impl fmt::Display for FollowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowerStatus::Active => f.write_str("active"),
            FollowerStatus::Paused => f.write_str("paused"),
        }
    }
}

/// A follower index as reported by the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerIndex {
    pub name: String,
    pub remote_cluster: String,
    pub leader_index: String,
    pub status: FollowerStatus,
    /// Advanced settings with a value; unset settings are absent
    #[serde(default)]
    pub settings: BTreeMap<FieldId, String>,
}

impl FollowerIndex {
    /// Flatten into the editable form record.
    pub fn to_fields(&self) -> FieldValues {
        [
            (FieldId::Name, self.name.clone()),
            (FieldId::RemoteCluster, self.remote_cluster.clone()),
            (FieldId::LeaderIndex, self.leader_index.clone()),
        ]
        .into_iter()
        .chain(
            self.settings
                .iter()
                .filter(|(id, _)| id.is_advanced())
                .map(|(id, value)| (*id, value.clone())),
        )
        .collect()
    }
}

/// Progress of the request the form is waiting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiStatus {
    #[default]
    Idle,
    Loading,
    Saving,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fields_flattens_settings() {
        let mut settings = BTreeMap::new();
        settings.insert(FieldId::MaxReadRequestSize, "32mb".to_string());

        let follower = FollowerIndex {
            name: "orders-follower".to_string(),
            remote_cluster: "cluster-a".to_string(),
            leader_index: "orders".to_string(),
            status: FollowerStatus::Active,
            settings,
        };

        let fields = follower.to_fields();
        assert_eq!(fields.get(FieldId::Name), "orders-follower");
        assert_eq!(fields.get(FieldId::RemoteCluster), "cluster-a");
        assert_eq!(fields.get(FieldId::LeaderIndex), "orders");
        assert_eq!(fields.get(FieldId::MaxReadRequestSize), "32mb");
        assert_eq!(fields.get(FieldId::MaxRetryDelay), "");
    }
}
