//! Create a follower index without the console
//!
//! Drives the same [`FollowerIndexForm`] the console uses, so the field
//! validation and the name collision check behave identically.

use crate::tui::forms::{FollowerIndexForm, FormProps, FormServices, SendOutcome};
use ccr_core::config::FormConfig;
use ccr_core::{
    ApiError, ApiStatus, CcrError, CcrResult, ClusterApi, FatalErrorReporter, FieldId, FieldPatch,
    FieldValues, FollowerIndexSaver, IndexCatalog, Navigator,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct FollowRequest {
    pub name: String,
    pub remote_cluster: String,
    pub leader_index: String,
    /// Advanced settings only
    pub settings: FieldPatch,
}

/// Parse a `key=value` advanced setting. Keys may be given in form or API
/// spelling (`maxRetryDelay` or `max_retry_delay`).
pub fn parse_setting(raw: &str) -> CcrResult<(FieldId, String)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| CcrError::InvalidInput {
        field: "setting".to_string(),
        message: format!("expected KEY=VALUE, got '{}'", raw),
    })?;

    let id = FieldId::from_key(key.trim())
        .filter(FieldId::is_advanced)
        .ok_or_else(|| CcrError::InvalidInput {
            field: "setting".to_string(),
            message: format!("unknown advanced setting '{}'", key.trim()),
        })?;

    Ok((id, value.trim().to_string()))
}

#[derive(Default)]
struct Recorder {
    saved: Mutex<Option<(String, FieldValues)>>,
    fatal: Mutex<Option<String>>,
}

impl FollowerIndexSaver for Recorder {
    fn save_follower_index(&self, name: &str, fields: FieldValues) {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some((name.to_string(), fields));
        }
    }

    fn clear_api_error(&self) {}
}

impl Navigator for Recorder {
    fn navigate(&self, path: &str) {
        debug!(path, "ignoring navigation outside the console");
    }
}

impl FatalErrorReporter for Recorder {
    fn report_fatal(&self, error: &CcrError, title: &str) {
        if let Ok(mut fatal) = self.fatal.lock() {
            *fatal = Some(format!("{}: {}", title, error));
        }
    }
}

/// Validate `request` through the follower index form and create it.
pub async fn submit_follower_index(
    request: FollowRequest,
    api: Arc<dyn ClusterApi>,
    catalog: Arc<dyn IndexCatalog>,
    config: &FormConfig,
) -> CcrResult<()> {
    let remote_clusters = api.load_remote_clusters().await?;

    let recorder = Arc::new(Recorder::default());
    let (check_tx, mut check_rx) = mpsc::unbounded_channel();
    let services = FormServices {
        catalog,
        saver: recorder.clone(),
        navigator: recorder.clone(),
        fatal: recorder.clone(),
        on_name_checked: Arc::new(move |result| {
            let _ = check_tx.send(result);
        }),
    };
    let props = FormProps {
        remote_clusters,
        ..Default::default()
    };
    let mut form = FollowerIndexForm::new(props, services, config);

    form.on_fields_change(
        FieldPatch::new()
            .set(FieldId::Name, request.name)
            .set(FieldId::RemoteCluster, request.remote_cluster)
            .set(FieldId::LeaderIndex, request.leader_index),
    );
    if !request.settings.is_empty() {
        form.toggle_advanced_settings();
        form.on_fields_change(request.settings);
    }

    while form.is_validating_index_name() {
        match check_rx.recv().await {
            Some(result) => form.handle_name_check(result),
            None => break,
        }
    }

    if let Some(message) = recorder.fatal.lock().ok().and_then(|mut fatal| fatal.take()) {
        return Err(CcrError::Internal { message });
    }
    if let Some(guidance) = form.view().remote_cluster.guidance {
        warn!("{}", guidance.message());
    }

    if form.send_form() == SendOutcome::Invalid {
        let message = form
            .field_errors()
            .errors()
            .map(|(id, error)| format!("{}: {}", id, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CcrError::Validation {
            field: "follower index".to_string(),
            message,
        });
    }

    let (name, fields) = recorder
        .saved
        .lock()
        .ok()
        .and_then(|mut saved| saved.take())
        .ok_or_else(|| CcrError::Internal {
            message: "follower index form did not submit".to_string(),
        })?;

    form.set_api_state(ApiStatus::Saving, None);
    match api.create_follower_index(&name, &fields).await {
        Ok(()) => {
            info!(name = %name, "follower index created");
            Ok(())
        }
        Err(CcrError::Api(api_error)) => {
            form.set_api_state(ApiStatus::Idle, Some(api_error.clone()));
            let reason = form.api_error_message().unwrap_or_else(|| api_error.reason.clone());
            Err(CcrError::Api(ApiError { reason, ..api_error }))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setting_accepts_both_spellings() {
        assert_eq!(
            parse_setting("maxRetryDelay=5s").unwrap(),
            (FieldId::MaxRetryDelay, "5s".to_string())
        );
        assert_eq!(
            parse_setting("max_write_buffer_size = 256mb").unwrap(),
            (FieldId::MaxWriteBufferSize, "256mb".to_string())
        );
    }

    #[test]
    fn test_parse_setting_rejects_identity_and_garbage() {
        assert!(parse_setting("leaderIndex=orders").is_err());
        assert!(parse_setting("max_retry_delay").is_err());
        assert!(parse_setting("colour=blue").is_err());
    }
}
