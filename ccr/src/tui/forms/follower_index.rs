//! Follower index create/edit form
//!
//! Holds the editable record, its validation state and the advanced settings
//! cache. Rendering goes through [`FollowerIndexForm::view`], which exposes what
//! the form shows without tying it to a particular widget set.

use super::view::{FieldView, FormActions, FormView, RemoteClusterGuidance, RemoteClusterView};
use ccr_core::config::FormConfig;
use ccr_core::fields::{FieldDefinition, FieldError, FieldErrors, FieldId, FieldPatch, FieldRegistry, FieldValues};
use ccr_core::query::{extract_query_params, resolve_remote_cluster_name};
use ccr_core::{
    ApiError, ApiStatus, CcrError, Debouncer, FatalErrorReporter, FollowerIndex, FollowerIndexSaver,
    IndexCatalog, Navigator, RemoteCluster,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Inputs the form is created from.
#[derive(Debug, Clone, Default)]
pub struct FormProps {
    /// Record being edited; `None` creates a new follower index
    pub follower_index: Option<FollowerIndex>,
    pub remote_clusters: Vec<RemoteCluster>,
    /// Console URL, used for the `cluster` query parameter
    pub current_url: String,
    pub api_status: ApiStatus,
    pub api_error: Option<ApiError>,
}

/// Receives the outcome of each name collision check.
pub type NameCheckSink = Arc<dyn Fn(NameCheckResult) + Send + Sync>;

#[derive(Clone)]
pub struct FormServices {
    pub catalog: Arc<dyn IndexCatalog>,
    pub saver: Arc<dyn FollowerIndexSaver>,
    pub navigator: Arc<dyn Navigator>,
    pub fatal: Arc<dyn FatalErrorReporter>,
    pub on_name_checked: NameCheckSink,
}

#[derive(Debug)]
pub enum NameCheckOutcome {
    Available,
    Taken,
    /// The index list could not be loaded for a reason other than a cluster refusal
    Failed(CcrError),
}

/// Result of one collision check, tagged with the name it was run for and
/// the sequence number it was scheduled under.
#[derive(Debug)]
pub struct NameCheckResult {
    pub check: u64,
    pub name: String,
    pub outcome: NameCheckOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Submitted,
    Invalid,
}

pub struct FollowerIndexForm {
    is_new: bool,
    fields: FieldValues,
    field_errors: FieldErrors,
    are_errors_visible: bool,
    advanced_settings_visible: bool,
    cached_advanced_settings: FieldPatch,
    is_validating_index_name: bool,
    /// Sequence number of the latest scheduled or cancelled name check
    latest_name_check: u64,
    remote_clusters: Vec<RemoteCluster>,
    api_status: ApiStatus,
    api_error: Option<ApiError>,
    registry: &'static FieldRegistry,
    name_check: Debouncer,
    list_path: String,
    services: FormServices,
}

impl FollowerIndexForm {
    /// Must be created inside a tokio runtime; name checks are spawned on it.
    pub fn new(props: FormProps, services: FormServices, config: &FormConfig) -> Self {
        let registry = FieldRegistry::global();
        let is_new = props.follower_index.is_none();

        let fields = match &props.follower_index {
            Some(existing) => existing.to_fields(),
            None => {
                let params = extract_query_params(&props.current_url);
                let cluster = resolve_remote_cluster_name(
                    &props.remote_clusters,
                    params.get("cluster").map(String::as_str),
                );
                FieldValues::default().merge(&FieldPatch::single(FieldId::RemoteCluster, cluster))
            }
        };
        let field_errors = registry.validate_all(&fields);

        debug!(
            is_new,
            remote_cluster = fields.get(FieldId::RemoteCluster),
            "follower index form initialized"
        );

        Self {
            is_new,
            fields,
            field_errors,
            are_errors_visible: false,
            advanced_settings_visible: !is_new,
            cached_advanced_settings: FieldPatch::new(),
            is_validating_index_name: false,
            latest_name_check: 0,
            remote_clusters: props.remote_clusters,
            api_status: props.api_status,
            api_error: props.api_error,
            registry,
            name_check: Debouncer::new(config.name_check_debounce),
            list_path: config.list_path.clone(),
            services,
        }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn fields(&self) -> &FieldValues {
        &self.fields
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn are_errors_visible(&self) -> bool {
        self.are_errors_visible
    }

    pub fn advanced_settings_visible(&self) -> bool {
        self.advanced_settings_visible
    }

    pub fn cached_advanced_settings(&self) -> &FieldPatch {
        &self.cached_advanced_settings
    }

    pub fn is_validating_index_name(&self) -> bool {
        self.is_validating_index_name
    }

    pub fn remote_clusters(&self) -> &[RemoteCluster] {
        &self.remote_clusters
    }

    pub fn api_status(&self) -> ApiStatus {
        self.api_status
    }

    pub fn is_form_valid(&self) -> bool {
        self.field_errors.is_valid()
    }

    /// Merge an edit into the record and re-validate the edited fields.
    pub fn on_fields_change(&mut self, patch: FieldPatch) {
        let patch = if self.is_new {
            patch
        } else {
            let (identity, editable): (Vec<_>, Vec<_>) = patch
                .iter()
                .map(|(id, value)| (id, value.to_string()))
                .partition(|(id, _)| !id.is_advanced());
            if !identity.is_empty() {
                warn!(fields = ?identity.iter().map(|(id, _)| *id).collect::<Vec<_>>(), "ignoring edit of immutable fields");
            }
            editable.into_iter().collect()
        };
        if patch.is_empty() {
            return;
        }

        debug!(fields = ?patch.ids().collect::<Vec<_>>(), "follower index fields changed");
        self.fields = self.fields.merge(&patch);
        for (id, value) in patch.iter() {
            self.field_errors.set(id, self.registry.validate(id, value));
        }

        if let Some(name) = patch.get(FieldId::Name) {
            self.on_index_name_change(name.to_string());
        }

        if self.api_error.take().is_some() {
            self.services.saver.clear_api_error();
        }
    }

    fn on_index_name_change(&mut self, name: String) {
        self.latest_name_check += 1;
        let check = self.latest_name_check;

        if name.trim().is_empty() {
            self.name_check.cancel();
            self.is_validating_index_name = false;
            return;
        }

        self.is_validating_index_name = true;
        let catalog = Arc::clone(&self.services.catalog);
        let sink = Arc::clone(&self.services.on_name_checked);

        debug!(name = %name, check, delay = ?self.name_check.delay(), "scheduling follower index name check");
        self.name_check.call(async move {
            let outcome = match catalog.load_indices().await {
                Ok(indices) if indices.iter().any(|index| index.name == name) => NameCheckOutcome::Taken,
                Ok(_) => NameCheckOutcome::Available,
                Err(err) if err.is_api_error() => {
                    // The save request reports a real conflict if there is one.
                    warn!(name = %name, error = %err, "index list unavailable, skipping name check");
                    NameCheckOutcome::Available
                }
                Err(err) => NameCheckOutcome::Failed(err),
            };
            sink(NameCheckResult { check, name, outcome });
        });
    }

    /// Apply the result of a collision check. Only the latest scheduled check
    /// is applied, and only while its name is still in the field.
    pub fn handle_name_check(&mut self, result: NameCheckResult) {
        if result.check != self.latest_name_check || result.name != self.fields.get(FieldId::Name) {
            debug!(
                checked = %result.name,
                check = result.check,
                latest = self.latest_name_check,
                "discarding stale name check"
            );
            return;
        }

        self.is_validating_index_name = false;
        match result.outcome {
            NameCheckOutcome::Available => {}
            NameCheckOutcome::Taken => {
                debug!(name = %result.name, "follower index name already in use");
                self.field_errors.set(
                    FieldId::Name,
                    Some(FieldError::sticky(format!(
                        "An index named '{}' already exists.",
                        result.name
                    ))),
                );
            }
            NameCheckOutcome::Failed(err) => {
                error!(error = %err, "failed to load indices for name check");
                self.services
                    .fatal
                    .report_fatal(&err, "Error checking follower index name availability");
            }
        }
    }

    /// Show or hide the advanced settings. Hidden settings are emptied and
    /// restored when shown again. Only offered for new follower indices.
    pub fn toggle_advanced_settings(&mut self) {
        if !self.is_new {
            debug!("advanced settings always shown when editing");
            return;
        }

        if self.advanced_settings_visible {
            let cached = self.fields.non_empty_advanced();
            let reset: FieldPatch = self
                .registry
                .advanced_definitions()
                .map(|def| (def.id, String::new()))
                .collect();
            self.on_fields_change(reset);
            self.advanced_settings_visible = false;
            self.cached_advanced_settings = cached;
        } else {
            let cached = std::mem::take(&mut self.cached_advanced_settings);
            self.on_fields_change(cached);
            self.advanced_settings_visible = true;
        }
    }

    /// Submit when valid, otherwise reveal every error.
    pub fn send_form(&mut self) -> SendOutcome {
        if !self.is_form_valid() {
            self.are_errors_visible = true;
            info!(
                errors = self.field_errors.errors().count(),
                "follower index form has errors"
            );
            return SendOutcome::Invalid;
        }

        let name = self.fields.get(FieldId::Name).to_string();
        let rest = self.fields.without(FieldId::Name);
        info!(name = %name, is_new = self.is_new, "submitting follower index");
        self.services.saver.save_follower_index(&name, rest);
        SendOutcome::Submitted
    }

    pub fn cancel_form(&self) {
        self.services.navigator.navigate(&self.list_path);
    }

    /// Update the request state owned by the caller.
    pub fn set_api_state(&mut self, status: ApiStatus, error: Option<ApiError>) {
        self.api_status = status;
        self.api_error = error;
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        self.api_error.as_ref()
    }

    /// Message for the save error banner. A 404 means the leader index is missing.
    pub fn api_error_message(&self) -> Option<String> {
        self.api_error.as_ref().map(|err| {
            if err.is_not_found() {
                format!(
                    "The leader index '{}' does not exist.",
                    self.fields.get(FieldId::LeaderIndex)
                )
            } else {
                err.to_string()
            }
        })
    }

    fn remote_cluster_guidance(&self) -> Option<RemoteClusterGuidance> {
        if self.remote_clusters.is_empty() {
            return Some(RemoteClusterGuidance::NoClusters);
        }

        let name = self.fields.get(FieldId::RemoteCluster);
        if name.is_empty() {
            return None;
        }
        match self.remote_clusters.iter().find(|cluster| cluster.name == name) {
            None => Some(RemoteClusterGuidance::NotFound {
                name: name.to_string(),
            }),
            Some(cluster) if !cluster.is_connected => Some(RemoteClusterGuidance::Disconnected {
                name: name.to_string(),
            }),
            Some(_) => None,
        }
    }

    fn field_view(&self, def: &FieldDefinition, editable: bool) -> FieldView {
        let error = self
            .field_errors
            .get(def.id)
            .filter(|err| self.are_errors_visible || err.always_visible)
            .map(|err| err.message.clone());

        FieldView {
            id: def.id,
            label: def.label,
            description: def.description,
            default_value: def.default_value,
            kind: def.kind,
            value: self.fields.get(def.id).to_string(),
            editable,
            error,
            is_validating: def.id == FieldId::Name && self.is_validating_index_name,
        }
    }

    fn identity_view(&self, id: FieldId) -> FieldView {
        match self.registry.definition(id) {
            Some(def) => self.field_view(def, self.is_new),
            None => FieldView::bare(id, self.fields.get(id), self.is_new),
        }
    }

    pub fn view(&self) -> FormView {
        let saving = self.api_status == ApiStatus::Saving;
        let is_valid = self.is_form_valid();

        let advanced_fields = if self.advanced_settings_visible {
            self.registry
                .advanced_definitions()
                .map(|def| self.field_view(def, true))
                .collect()
        } else {
            Vec::new()
        };

        FormView {
            is_new: self.is_new,
            name: self.identity_view(FieldId::Name),
            remote_cluster: RemoteClusterView {
                field: self.identity_view(FieldId::RemoteCluster),
                options: self.remote_clusters.clone(),
                guidance: self.remote_cluster_guidance(),
            },
            leader_index: self.identity_view(FieldId::LeaderIndex),
            advanced_toggle: self.is_new.then_some(self.advanced_settings_visible),
            advanced_fields,
            show_error_banner: self.are_errors_visible && !is_valid,
            api_error: self.api_error_message(),
            actions: if saving {
                FormActions::Saving
            } else {
                FormActions::Buttons {
                    save_disabled: self.are_errors_visible && !is_valid,
                }
            },
            show_busy_overlay: saving,
        }
    }
}

impl std::fmt::Debug for FollowerIndexForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FollowerIndexForm")
            .field("is_new", &self.is_new)
            .field("fields", &self.fields)
            .field("field_errors", &self.field_errors)
            .field("are_errors_visible", &self.are_errors_visible)
            .field("advanced_settings_visible", &self.advanced_settings_visible)
            .field("is_validating_index_name", &self.is_validating_index_name)
            .field("api_status", &self.api_status)
            .finish_non_exhaustive()
    }
}
