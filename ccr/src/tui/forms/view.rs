//! Render model of the follower index form

use ccr_core::fields::FieldKind;
use ccr_core::{FieldId, RemoteCluster};

/// What one field shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub id: FieldId,
    pub label: &'static str,
    pub description: &'static str,
    pub default_value: Option<&'static str>,
    pub kind: FieldKind,
    pub value: String,
    pub editable: bool,
    /// Only set when the error should be on screen
    pub error: Option<String>,
    /// Name availability check in flight
    pub is_validating: bool,
}

impl FieldView {
    pub(crate) fn bare(id: FieldId, value: &str, editable: bool) -> Self {
        Self {
            id,
            label: id.key(),
            description: "",
            default_value: None,
            kind: FieldKind::Text,
            value: value.to_string(),
            editable,
            error: None,
            is_validating: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteClusterGuidance {
    NoClusters,
    Disconnected { name: String },
    NotFound { name: String },
}

impl RemoteClusterGuidance {
    pub fn message(&self) -> String {
        match self {
            RemoteClusterGuidance::NoClusters => {
                "No remote clusters found. Add a remote cluster before creating a follower index.".to_string()
            }
            RemoteClusterGuidance::Disconnected { name } => format!(
                "Remote cluster '{}' is not connected. Check its seed nodes before saving.",
                name
            ),
            RemoteClusterGuidance::NotFound { name } => format!(
                "Remote cluster '{}' was not found. It may have been removed.",
                name
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteClusterView {
    pub field: FieldView,
    pub options: Vec<RemoteCluster>,
    pub guidance: Option<RemoteClusterGuidance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormActions {
    /// A save is in flight; shown instead of the buttons
    Saving,
    Buttons { save_disabled: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub is_new: bool,
    pub name: FieldView,
    pub remote_cluster: RemoteClusterView,
    pub leader_index: FieldView,
    /// Present only when the section can be toggled; holds the visibility
    pub advanced_toggle: Option<bool>,
    /// Empty while the section is hidden
    pub advanced_fields: Vec<FieldView>,
    pub show_error_banner: bool,
    pub api_error: Option<String>,
    pub actions: FormActions,
    pub show_busy_overlay: bool,
}

impl FormView {
    /// Fields in on-screen order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldView> {
        [&self.name, &self.remote_cluster.field, &self.leader_index]
            .into_iter()
            .chain(self.advanced_fields.iter())
    }
}
