//! Console paths
//!
//! The list lives at the configured list path; the add and edit forms hang
//! off it as `<list>/add[?cluster=<name>]` and `<list>/edit/<name>`.

use ccr_core::query::add_follower_index_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Add,
    Edit { name: String },
}

impl Route {
    pub fn parse(path: &str, list_path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or_default();
        let rest = path.strip_prefix(list_path.trim_end_matches('/'))?;

        match rest.trim_end_matches('/') {
            "" => Some(Route::List),
            "/add" => Some(Route::Add),
            other => other
                .strip_prefix("/edit/")
                .filter(|name| !name.is_empty() && !name.contains('/'))
                .map(|name| Route::Edit {
                    name: name.to_string(),
                }),
        }
    }
}

pub fn add_path(list_path: &str, cluster: Option<&str>) -> String {
    add_follower_index_path(&format!("{}/add", list_path.trim_end_matches('/')), cluster)
}

pub fn edit_path(list_path: &str, name: &str) -> String {
    format!("{}/edit/{}", list_path.trim_end_matches('/'), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes() {
        let list = "/follower_indices";
        assert_eq!(Route::parse("/follower_indices", list), Some(Route::List));
        assert_eq!(Route::parse("/follower_indices/", list), Some(Route::List));
        assert_eq!(
            Route::parse("/follower_indices/add?cluster=cluster-a", list),
            Some(Route::Add)
        );
        assert_eq!(
            Route::parse("/follower_indices/edit/orders-follower", list),
            Some(Route::Edit {
                name: "orders-follower".to_string()
            })
        );
        assert_eq!(Route::parse("/follower_indices/edit/", list), None);
        assert_eq!(Route::parse("/remote_clusters", list), None);
    }

    #[test]
    fn test_build_paths() {
        assert_eq!(
            add_path("/follower_indices", Some("cluster-a")),
            "/follower_indices/add?cluster=cluster-a"
        );
        assert_eq!(add_path("/follower_indices/", None), "/follower_indices/add");
        assert_eq!(
            edit_path("/follower_indices", "orders-follower"),
            "/follower_indices/edit/orders-follower"
        );
    }
}
