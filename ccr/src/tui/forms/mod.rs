//! Forms for the console

pub mod focus;
pub mod follower_index;
pub mod view;

pub use focus::FocusTarget;
pub use follower_index::{
    FollowerIndexForm, FormProps, FormServices, NameCheckOutcome, NameCheckResult, NameCheckSink,
    SendOutcome,
};
pub use view::{FieldView, FormActions, FormView, RemoteClusterGuidance, RemoteClusterView};

#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub is_dangerous: bool,
    /// Confirm button highlighted
    pub selected: bool,
}

impl ConfirmDialog {
    /// Updating pauses and resumes replication of the follower index.
    pub fn update_follower_index(name: &str) -> Self {
        Self {
            title: "Update follower index?".to_string(),
            message: format!(
                "The follower index '{}' will be paused and resumed. Replication stops while the new settings are applied.",
                name
            ),
            confirm_text: "Update".to_string(),
            cancel_text: "Cancel".to_string(),
            is_dangerous: false,
            selected: false,
        }
    }
}
