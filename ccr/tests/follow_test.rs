use async_trait::async_trait;
use ccr::follow::{parse_setting, submit_follower_index, FollowRequest};
use ccr_core::config::FormConfig;
use ccr_core::{
    ApiError, CcrError, CcrResult, ClusterApi, FieldId, FieldPatch, FieldValues, FollowerIndex, IndexCatalog,
    IndexInfo, RemoteCluster,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeCluster {
    created: Mutex<Vec<(String, FieldValues)>>,
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn load_remote_clusters(&self) -> CcrResult<Vec<RemoteCluster>> {
        Ok(vec![RemoteCluster::new("cluster-a", true)])
    }

    async fn list_follower_indices(&self) -> CcrResult<Vec<FollowerIndex>> {
        Ok(Vec::new())
    }

    async fn get_follower_index(&self, name: &str) -> CcrResult<FollowerIndex> {
        Err(CcrError::NotFound {
            resource: name.to_string(),
        })
    }

    async fn create_follower_index(&self, name: &str, fields: &FieldValues) -> CcrResult<()> {
        if fields.get(FieldId::LeaderIndex) == "missing" {
            return Err(ApiError::new(404, "no such index [missing]").into());
        }
        self.created.lock().unwrap().push((name.to_string(), fields.clone()));
        Ok(())
    }

    async fn update_follower_index(&self, _name: &str, _fields: &FieldValues) -> CcrResult<()> {
        Ok(())
    }
}

#[async_trait]
impl IndexCatalog for FakeCluster {
    async fn load_indices(&self) -> CcrResult<Vec<IndexInfo>> {
        Ok(vec![IndexInfo::new("orders"), IndexInfo::new("orders-follower")])
    }
}

fn request(name: &str, leader_index: &str) -> FollowRequest {
    FollowRequest {
        name: name.to_string(),
        remote_cluster: "cluster-a".to_string(),
        leader_index: leader_index.to_string(),
        settings: FieldPatch::new(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_follow_creates_with_settings() {
    let cluster = Arc::new(FakeCluster::default());
    let mut follow = request("logs-follower", "logs");
    follow.settings = ["max_retry_delay=5s", "maxWriteBufferSize=256mb"]
        .iter()
        .map(|raw| parse_setting(raw))
        .collect::<CcrResult<FieldPatch>>()
        .unwrap();

    submit_follower_index(follow, cluster.clone(), cluster.clone(), &FormConfig::default())
        .await
        .unwrap();

    let created = cluster.created.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    let (name, fields) = &created[0];
    assert_eq!(name, "logs-follower");
    assert_eq!(fields.get(FieldId::MaxRetryDelay), "5s");
    assert_eq!(fields.get(FieldId::MaxWriteBufferSize), "256mb");
    assert!(!fields.contains(FieldId::Name));
}

#[tokio::test(start_paused = true)]
async fn test_follow_rejects_existing_name() {
    let cluster = Arc::new(FakeCluster::default());

    let err = submit_follower_index(
        request("orders-follower", "orders"),
        cluster.clone(),
        cluster.clone(),
        &FormConfig::default(),
    )
    .await
    .unwrap_err();

    match err {
        CcrError::Validation { message, .. } => assert!(message.contains("already exists")),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(cluster.created.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_follow_rejects_invalid_setting_value() {
    let cluster = Arc::new(FakeCluster::default());
    let mut follow = request("logs-follower", "logs");
    follow.settings = FieldPatch::single(FieldId::MaxReadRequestOperationCount, "0");

    let err = submit_follower_index(follow, cluster.clone(), cluster.clone(), &FormConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CcrError::Validation { .. }), "got {:?}", err);
    assert!(cluster.created.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_follow_missing_leader_message() {
    let cluster = Arc::new(FakeCluster::default());

    let err = submit_follower_index(
        request("logs-follower", "missing"),
        cluster.clone(),
        cluster.clone(),
        &FormConfig::default(),
    )
    .await
    .unwrap_err();

    let api = err.api_error().cloned().unwrap();
    assert_eq!(api.status, 404);
    assert_eq!(api.reason, "The leader index 'missing' does not exist.");
}
