//! Cluster REST client
//!
//! Talks to the cross-cluster replication endpoints of the local (follower)
//! cluster. Non-2xx responses are turned into [`CcrError::Api`] so callers can
//! tell a refusal by the cluster apart from a transport failure.

use crate::config::ClusterConnectionConfig;
use crate::error::{ApiError, CcrError, CcrResult};
use crate::fields::{FieldId, FieldKind, FieldRegistry, FieldValues};
use crate::services::IndexCatalog;
use crate::types::{FollowerIndex, FollowerStatus, IndexInfo, RemoteCluster};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Operations the console needs from the cluster.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn load_remote_clusters(&self) -> CcrResult<Vec<RemoteCluster>>;

    async fn list_follower_indices(&self) -> CcrResult<Vec<FollowerIndex>>;

    async fn get_follower_index(&self, name: &str) -> CcrResult<FollowerIndex>;

    /// `fields` must hold the remote cluster and leader index.
    async fn create_follower_index(&self, name: &str, fields: &FieldValues) -> CcrResult<()>;

    /// Re-apply advanced settings. Replication is paused and resumed.
    async fn update_follower_index(&self, name: &str, fields: &FieldValues) -> CcrResult<()>;
}

/// HTTP implementation of [`ClusterApi`] and [`IndexCatalog`].
#[derive(Debug, Clone)]
pub struct HttpClusterClient {
    http: reqwest::Client,
    base: Url,
    username: Option<String>,
    password: Option<String>,
    request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct CatIndex {
    index: String,
}

#[derive(Debug, Deserialize)]
struct RemoteInfo {
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    seeds: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FollowInfoResponse {
    follower_indices: Vec<FollowInfo>,
}

#[derive(Debug, Deserialize)]
struct FollowInfo {
    follower_index: String,
    remote_cluster: String,
    leader_index: String,
    status: FollowerStatus,
    #[serde(default)]
    parameters: Map<String, Value>,
}

impl From<FollowInfo> for FollowerIndex {
    fn from(info: FollowInfo) -> Self {
        let settings: BTreeMap<FieldId, String> = info
            .parameters
            .iter()
            .filter_map(|(key, value)| {
                let id = FieldId::from_key(key).filter(FieldId::is_advanced)?;
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => return None,
                    other => other.to_string(),
                };
                Some((id, value))
            })
            .collect();

        FollowerIndex {
            name: info.follower_index,
            remote_cluster: info.remote_cluster,
            leader_index: info.leader_index,
            status: info.status,
            settings,
        }
    }
}

impl HttpClusterClient {
    pub fn new(config: &ClusterConnectionConfig) -> CcrResult<Self> {
        let base = Url::parse(&config.url).map_err(|e| {
            CcrError::ConfigError(format!("Invalid cluster url '{}': {}", config.url, e))
        })?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CcrError::Internal {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base,
            username: config.username.clone(),
            password: config.password.clone(),
            request_timeout: config.request_timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> CcrResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CcrError::ConfigError(format!("Cluster url '{}' cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> CcrResult<Response> {
        let response = builder.send().await.map_err(|e| self.transport_error(operation, e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_body(status.as_u16(), &body);
        debug!(operation, status = status.as_u16(), reason = %error.reason, "cluster rejected request");
        Err(CcrError::Api(error))
    }

    async fn send_json<T: DeserializeOwned>(&self, operation: &str, builder: RequestBuilder) -> CcrResult<T> {
        let response = self.send(operation, builder).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(operation, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> CcrError {
        if err.is_timeout() {
            CcrError::Timeout {
                operation: operation.to_string(),
                duration: self.request_timeout,
            }
        } else {
            CcrError::Connection {
                address: self.base.to_string(),
                details: err.to_string(),
            }
        }
    }
}

/// Request body for the follow and resume endpoints. Empty settings are left
/// out so the cluster applies its defaults.
pub fn follow_request_body(fields: &FieldValues, include_identity: bool) -> Map<String, Value> {
    let registry = FieldRegistry::global();
    let mut body = Map::new();

    if include_identity {
        for id in [FieldId::RemoteCluster, FieldId::LeaderIndex] {
            body.insert(id.api_key().to_string(), Value::String(fields.get(id).to_string()));
        }
    }

    for id in FieldId::ADVANCED {
        let value = fields.get(id).trim();
        if value.is_empty() {
            continue;
        }
        let kind = registry.definition(id).map(|def| def.kind);
        let json = match (kind, value.parse::<u64>()) {
            (Some(FieldKind::Number), Ok(n)) => Value::from(n),
            _ => Value::String(value.to_string()),
        };
        body.insert(id.api_key().to_string(), json);
    }

    body
}

#[async_trait]
impl IndexCatalog for HttpClusterClient {
    async fn load_indices(&self) -> CcrResult<Vec<IndexInfo>> {
        let mut url = self.endpoint(&["_cat", "indices"])?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("h", "index")
            .append_pair("expand_wildcards", "all");

        let rows: Vec<CatIndex> = self.send_json("load_indices", self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().map(|row| IndexInfo::new(row.index)).collect())
    }
}

#[async_trait]
impl ClusterApi for HttpClusterClient {
    async fn load_remote_clusters(&self) -> CcrResult<Vec<RemoteCluster>> {
        let url = self.endpoint(&["_remote", "info"])?;
        let info: BTreeMap<String, RemoteInfo> =
            self.send_json("load_remote_clusters", self.request(Method::GET, url)).await?;

        Ok(info
            .into_iter()
            .map(|(name, remote)| RemoteCluster {
                name,
                is_connected: remote.connected,
                seeds: remote.seeds,
            })
            .collect())
    }

    async fn list_follower_indices(&self) -> CcrResult<Vec<FollowerIndex>> {
        let url = self.endpoint(&["_all", "_ccr", "info"])?;
        let response: FollowInfoResponse =
            self.send_json("list_follower_indices", self.request(Method::GET, url)).await?;
        Ok(response.follower_indices.into_iter().map(FollowerIndex::from).collect())
    }

    async fn get_follower_index(&self, name: &str) -> CcrResult<FollowerIndex> {
        let url = self.endpoint(&[name, "_ccr", "info"])?;
        let response: FollowInfoResponse =
            self.send_json("get_follower_index", self.request(Method::GET, url)).await?;

        response
            .follower_indices
            .into_iter()
            .find(|info| info.follower_index == name)
            .map(FollowerIndex::from)
            .ok_or_else(|| CcrError::NotFound {
                resource: format!("follower index '{}'", name),
            })
    }

    async fn create_follower_index(&self, name: &str, fields: &FieldValues) -> CcrResult<()> {
        let mut url = self.endpoint(&[name, "_ccr", "follow"])?;
        url.query_pairs_mut().append_pair("wait_for_active_shards", "1");

        let body = follow_request_body(fields, true);
        self.send("create_follower_index", self.request(Method::PUT, url).json(&body))
            .await?;

        info!(name, remote_cluster = fields.get(FieldId::RemoteCluster), "created follower index");
        Ok(())
    }

    async fn update_follower_index(&self, name: &str, fields: &FieldValues) -> CcrResult<()> {
        let current = self.get_follower_index(name).await?;
        if current.status != FollowerStatus::Paused {
            let url = self.endpoint(&[name, "_ccr", "pause_follow"])?;
            self.send("pause_follower_index", self.request(Method::POST, url)).await?;
        }

        let url = self.endpoint(&[name, "_ccr", "resume_follow"])?;
        let body = follow_request_body(fields, false);
        self.send("resume_follower_index", self.request(Method::POST, url).json(&body))
            .await?;

        info!(name, "updated follower index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldPatch;
    use serde_json::json;

    #[test]
    fn test_body_omits_empty_settings() {
        let fields = FieldValues::default().merge(
            &FieldPatch::new()
                .set(FieldId::RemoteCluster, "cluster-a")
                .set(FieldId::LeaderIndex, "orders")
                .set(FieldId::MaxReadRequestOperationCount, "1024")
                .set(FieldId::MaxRetryDelay, "10s"),
        );

        let body = follow_request_body(&fields, true);
        assert_eq!(
            Value::Object(body),
            json!({
                "remote_cluster": "cluster-a",
                "leader_index": "orders",
                "max_read_request_operation_count": 1024,
                "max_retry_delay": "10s",
            })
        );
    }

    #[test]
    fn test_resume_body_has_no_identity() {
        let fields = FieldValues::default()
            .merge(&FieldPatch::single(FieldId::RemoteCluster, "cluster-a"));
        assert!(follow_request_body(&fields, false).is_empty());
    }

    #[test]
    fn test_follow_info_conversion() {
        let info: FollowInfo = serde_json::from_value(json!({
            "follower_index": "orders-follower",
            "remote_cluster": "cluster-a",
            "leader_index": "orders",
            "status": "active",
            "parameters": {
                "max_read_request_operation_count": 5120,
                "max_read_request_size": "32mb",
                "unknown_parameter": true
            }
        }))
        .unwrap();

        let follower = FollowerIndex::from(info);
        assert_eq!(follower.status, FollowerStatus::Active);
        assert_eq!(follower.settings.len(), 2);
        assert_eq!(
            follower.settings.get(&FieldId::MaxReadRequestOperationCount).map(String::as_str),
            Some("5120")
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = ClusterConnectionConfig {
            url: "http://localhost:9200/proxy/".to_string(),
            ..Default::default()
        };
        let client = HttpClusterClient::new(&config).unwrap();
        let url = client.endpoint(&["orders-follower", "_ccr", "info"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/proxy/orders-follower/_ccr/info");
    }
}
