//! Console URL helpers

use crate::types::RemoteCluster;
use std::collections::HashMap;
use url::Url;

/// Query parameters of a console URL. Accepts absolute URLs and bare paths
/// such as `/follower_indices/add?cluster=cluster-a`.
pub fn extract_query_params(current_url: &str) -> HashMap<String, String> {
    let parsed = Url::parse(current_url).or_else(|_| {
        Url::parse("http://console.local").and_then(|base| base.join(current_url))
    });

    match parsed {
        Ok(url) => url.query_pairs().into_owned().collect(),
        Err(_) => HashMap::new(),
    }
}

/// The requested cluster if it is one of `remote_clusters`, otherwise empty.
pub fn resolve_remote_cluster_name(remote_clusters: &[RemoteCluster], requested: Option<&str>) -> String {
    requested
        .filter(|name| remote_clusters.iter().any(|cluster| cluster.name == *name))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Path of the add form with an optional cluster pre-selected.
pub fn add_follower_index_path(base: &str, cluster: Option<&str>) -> String {
    match cluster {
        Some(cluster) => {
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("cluster", cluster)
                .finish();
            format!("{}?{}", base, query)
        }
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_path() {
        let params = extract_query_params("/follower_indices/add?cluster=cluster-a&x=1");
        assert_eq!(params.get("cluster").map(String::as_str), Some("cluster-a"));
        assert_eq!(params.get("x").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_extract_from_absolute_url() {
        let params = extract_query_params("https://console.example/ccr/add?cluster=eu%20west");
        assert_eq!(params.get("cluster").map(String::as_str), Some("eu west"));
    }

    #[test]
    fn test_no_query() {
        assert!(extract_query_params("/follower_indices/add").is_empty());
        assert!(extract_query_params("").is_empty());
    }

    #[test]
    fn test_resolve_requires_exact_match() {
        let clusters = vec![
            RemoteCluster::new("cluster-a", true),
            RemoteCluster::new("cluster-b", false),
        ];
        assert_eq!(resolve_remote_cluster_name(&clusters, Some("cluster-b")), "cluster-b");
        assert_eq!(resolve_remote_cluster_name(&clusters, Some("Cluster-A")), "");
        assert_eq!(resolve_remote_cluster_name(&clusters, Some("cluster-c")), "");
        assert_eq!(resolve_remote_cluster_name(&clusters, None), "");
    }

    #[test]
    fn test_add_path_round_trips_cluster() {
        let path = add_follower_index_path("/follower_indices/add", Some("eu west"));
        let params = extract_query_params(&path);
        assert_eq!(params.get("cluster").map(String::as_str), Some("eu west"));
    }
}
