//! Console application state
//!
//! Owns the follower index list, the active form and the request state the form
//! reports into. All mutation happens in [`App::handle_event`], one event at a
//! time; requests run on spawned tasks and report back through the event channel.

use super::events::{Event, FormData};
use super::forms::{ConfirmDialog, FocusTarget, FollowerIndexForm, FormProps, FormServices, SendOutcome};
use super::routes::{self, Route};
use super::services::ChannelServices;
use ccr_core::{
    ApiError, ApiStatus, CcrResult, ClusterApi, ConsoleConfig, FieldId, FieldPatch, FieldValues,
    FollowerIndex, IndexCatalog,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    List,
    /// Waiting for the data of the form at the current path
    Loading,
    Form,
    Fatal { title: String, message: String },
}

pub struct App {
    pub config: ConsoleConfig,
    api: Arc<dyn ClusterApi>,
    catalog: Arc<dyn IndexCatalog>,
    services: ChannelServices,
    sender: UnboundedSender<Event>,

    pub screen: Screen,
    pub current_path: String,
    pub follower_indices: Vec<FollowerIndex>,
    pub list_state: TableState,

    pub form: Option<FollowerIndexForm>,
    pub focus: Option<FocusTarget>,
    pub confirm_dialog: Option<ConfirmDialog>,
    pending_save: Option<(String, FieldValues)>,

    pub api_status: ApiStatus,
    pub api_error: Option<ApiError>,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    pub should_quit: bool,
    last_refresh: Instant,
}

impl App {
    pub fn new(
        config: ConsoleConfig,
        api: Arc<dyn ClusterApi>,
        catalog: Arc<dyn IndexCatalog>,
        sender: UnboundedSender<Event>,
    ) -> Self {
        let current_path = config.form.list_path.clone();
        Self {
            config,
            api,
            catalog,
            services: ChannelServices::new(sender.clone()),
            sender,
            screen: Screen::List,
            current_path,
            follower_indices: Vec::new(),
            list_state: TableState::default(),
            form: None,
            focus: None,
            confirm_dialog: None,
            pending_save: None,
            api_status: ApiStatus::Idle,
            api_error: None,
            status_message: None,
            error_message: None,
            should_quit: false,
            last_refresh: Instant::now(),
        }
    }

    /// Show the screen for a console path. Must be called inside a tokio runtime.
    pub fn navigate(&mut self, path: &str) {
        let Some(route) = Route::parse(path, &self.config.form.list_path) else {
            warn!(path, "unknown console path");
            self.error_message = Some(format!("Unknown page: {}", path));
            return;
        };

        debug!(path, ?route, "navigating");
        self.current_path = path.to_string();
        self.confirm_dialog = None;
        self.pending_save = None;
        self.api_error = None;

        match route {
            Route::List => {
                self.form = None;
                self.focus = None;
                self.api_status = ApiStatus::Idle;
                self.screen = Screen::List;
                self.refresh_follower_indices();
            }
            Route::Add => self.load_form(None),
            Route::Edit { name } => self.load_form(Some(name)),
        }
    }

    pub fn refresh_follower_indices(&mut self) {
        self.last_refresh = Instant::now();
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let result = api.list_follower_indices().await;
            let _ = sender.send(Event::FollowerIndicesLoaded(result));
        });
    }

    fn load_form(&mut self, name: Option<String>) {
        self.form = None;
        self.focus = None;
        self.api_status = ApiStatus::Loading;
        self.screen = Screen::Loading;

        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        let path = self.current_path.clone();

        tokio::spawn(async move {
            let result = fetch_form_data(api, name).await;
            let _ = sender.send(Event::FormDataLoaded { path, result });
        });
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Tick => {
                if self.screen == Screen::List
                    && self.last_refresh.elapsed() >= self.config.tui.refresh_interval
                {
                    self.refresh_follower_indices();
                }
            }
            Event::Key(key) => self.handle_key_event(key),
            Event::Navigate(path) => self.navigate(&path),
            Event::NameChecked(result) => match self.form.as_mut() {
                Some(form) => form.handle_name_check(result),
                None => debug!(name = %result.name, "name check finished after the form closed"),
            },
            Event::SaveRequested { name, fields } => self.request_save(name, fields),
            Event::ClearApiError => self.api_error = None,
            Event::Saved { name, is_new, result } => self.on_saved(name, is_new, result),
            Event::FollowerIndicesLoaded(result) => match result {
                Ok(follower_indices) => {
                    self.follower_indices = follower_indices;
                    self.clamp_selection();
                }
                Err(err) => {
                    error!(error = %err, "failed to load follower indices");
                    self.error_message = Some(format!("Failed to load follower indices: {}", err));
                }
            },
            Event::FormDataLoaded { path, result } => self.on_form_data(path, result),
            Event::Fatal { title, message } => {
                error!(%title, %message, "fatal console error");
                self.form = None;
                self.focus = None;
                self.confirm_dialog = None;
                self.api_status = ApiStatus::Idle;
                self.screen = Screen::Fatal { title, message };
            }
        }
    }

    fn on_form_data(&mut self, path: String, result: CcrResult<FormData>) {
        if path != self.current_path {
            debug!(path = %path, current = %self.current_path, "discarding form data for a page no longer shown");
            return;
        }
        self.api_status = ApiStatus::Idle;

        let data = match result {
            Ok(data) => data,
            Err(err) => {
                error!(error = %err, path = %path, "failed to load follower index form");
                self.screen = Screen::Fatal {
                    title: "Error loading follower index".to_string(),
                    message: err.to_string(),
                };
                return;
            }
        };

        let props = FormProps {
            follower_index: data.follower_index,
            remote_clusters: data.remote_clusters,
            current_url: path,
            api_status: self.api_status,
            api_error: self.api_error.clone(),
        };
        let form = FollowerIndexForm::new(props, self.form_services(), &self.config.form);

        self.focus = FocusTarget::order(&form.view()).first().copied();
        self.form = Some(form);
        self.screen = Screen::Form;
    }

    fn form_services(&self) -> FormServices {
        let services = Arc::new(self.services.clone());
        FormServices {
            catalog: Arc::clone(&self.catalog),
            saver: services.clone(),
            navigator: services.clone(),
            fatal: services,
            on_name_checked: self.services.name_check_sink(),
        }
    }

    fn request_save(&mut self, name: String, fields: FieldValues) {
        let is_new = self.form.as_ref().map(FollowerIndexForm::is_new).unwrap_or(true);
        if is_new {
            self.start_save(name, fields, true);
        } else {
            self.confirm_dialog = Some(ConfirmDialog::update_follower_index(&name));
            self.pending_save = Some((name, fields));
        }
    }

    fn start_save(&mut self, name: String, fields: FieldValues, is_new: bool) {
        info!(name = %name, is_new, "saving follower index");
        self.api_status = ApiStatus::Saving;
        self.api_error = None;
        if let Some(form) = self.form.as_mut() {
            form.set_api_state(ApiStatus::Saving, None);
        }

        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = if is_new {
                api.create_follower_index(&name, &fields).await
            } else {
                api.update_follower_index(&name, &fields).await
            };
            let _ = sender.send(Event::Saved { name, is_new, result });
        });
    }

    fn on_saved(&mut self, name: String, is_new: bool, result: CcrResult<()>) {
        self.api_status = ApiStatus::Idle;
        match result {
            Ok(()) => {
                self.status_message = Some(if is_new {
                    format!("Added follower index '{}'", name)
                } else {
                    format!("Updated follower index '{}'", name)
                });
                let list_path = self.config.form.list_path.clone();
                self.navigate(&list_path);
            }
            Err(err) => {
                warn!(name = %name, error = %err, "saving follower index failed");
                let api_error = err
                    .api_error()
                    .cloned()
                    .unwrap_or_else(|| ApiError::transport(err.to_string()));
                self.api_error = Some(api_error.clone());
                if let Some(form) = self.form.as_mut() {
                    form.set_api_state(ApiStatus::Idle, Some(api_error));
                }
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        self.error_message = None;
        if self.confirm_dialog.is_some() {
            self.handle_confirm_dialog_keys(key);
            return;
        }

        match self.screen {
            Screen::List => self.handle_list_keys(key),
            Screen::Form => self.handle_form_keys(key),
            Screen::Loading => {
                if key.code == KeyCode::Esc {
                    let list_path = self.config.form.list_path.clone();
                    self.navigate(&list_path);
                }
            }
            Screen::Fatal { .. } => self.handle_fatal_keys(key),
        }
    }

    fn handle_list_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => {
                if let Some(selected) = self.list_state.selected() {
                    if selected > 0 {
                        self.list_state.select(Some(selected - 1));
                    }
                }
            }
            KeyCode::Down => {
                if let Some(selected) = self.list_state.selected() {
                    if selected < self.follower_indices.len().saturating_sub(1) {
                        self.list_state.select(Some(selected + 1));
                    }
                } else if !self.follower_indices.is_empty() {
                    self.list_state.select(Some(0));
                }
            }
            KeyCode::Char('a') => {
                self.status_message = None;
                let path = routes::add_path(&self.config.form.list_path, None);
                self.navigate(&path);
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let selected = self
                    .list_state
                    .selected()
                    .and_then(|index| self.follower_indices.get(index))
                    .map(|follower| follower.name.clone());
                if let Some(name) = selected {
                    self.status_message = None;
                    let path = routes::edit_path(&self.config.form.list_path, &name);
                    self.navigate(&path);
                }
            }
            KeyCode::Char('r') => {
                self.refresh_follower_indices();
                self.status_message = Some("Refreshing follower indices".to_string());
            }
            _ => {}
        }
    }

    fn handle_form_keys(&mut self, key: KeyEvent) {
        let saving = self
            .form
            .as_ref()
            .map(|form| form.api_status() == ApiStatus::Saving)
            .unwrap_or(true);
        if saving {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.cancel_form(),
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            KeyCode::Char('s') if ctrl => self.submit_form(),
            KeyCode::Char('a') if ctrl => self.toggle_advanced_settings(),
            KeyCode::Enter => match self.focus {
                Some(FocusTarget::AdvancedToggle) => self.toggle_advanced_settings(),
                Some(FocusTarget::Cancel) => self.cancel_form(),
                _ => self.submit_form(),
            },
            KeyCode::Up | KeyCode::Down => {
                let forward = key.code == KeyCode::Down;
                if self.focus == Some(FocusTarget::Field(FieldId::RemoteCluster)) {
                    self.cycle_remote_cluster(forward);
                } else {
                    self.move_focus(forward);
                }
            }
            KeyCode::Char(c) if !ctrl => self.edit_focused_field(|value| value.push(c)),
            KeyCode::Backspace => self.edit_focused_field(|value| {
                value.pop();
            }),
            _ => {}
        }
    }

    fn handle_confirm_dialog_keys(&mut self, key: KeyEvent) {
        let mut confirmed = false;

        if let Some(dialog) = &mut self.confirm_dialog {
            match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                    dialog.selected = !dialog.selected;
                    return;
                }
                KeyCode::Enter => confirmed = dialog.selected,
                KeyCode::Char('y') => confirmed = true,
                KeyCode::Esc | KeyCode::Char('n') => {}
                _ => return,
            }
        }

        self.confirm_dialog = None;
        match self.pending_save.take() {
            Some((name, fields)) if confirmed => self.start_save(name, fields, false),
            Some((name, _)) => debug!(name = %name, "update cancelled"),
            None => {}
        }
    }

    fn handle_fatal_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Enter => {
                let list_path = self.config.form.list_path.clone();
                self.navigate(&list_path);
            }
            _ => {}
        }
    }

    fn cancel_form(&mut self) {
        if let Some(form) = &self.form {
            form.cancel_form();
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.send_form() == SendOutcome::Invalid {
            self.error_message = Some("Fix the errors in the form before saving.".to_string());
        }
    }

    fn toggle_advanced_settings(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        form.toggle_advanced_settings();

        let order = FocusTarget::order(&form.view());
        if !self.focus.map(|focus| order.contains(&focus)).unwrap_or(false) {
            self.focus = Some(FocusTarget::AdvancedToggle).filter(|toggle| order.contains(toggle));
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let Some(form) = &self.form else {
            return;
        };
        let order = FocusTarget::order(&form.view());
        self.focus = match self.focus {
            Some(current) if forward => current.next(&order),
            Some(current) => current.previous(&order),
            None => order.first().copied(),
        };
    }

    fn cycle_remote_cluster(&mut self, forward: bool) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let clusters = form.remote_clusters();
        if clusters.is_empty() {
            return;
        }

        let current = form.fields().get(FieldId::RemoteCluster);
        let len = clusters.len();
        let next = match clusters.iter().position(|cluster| cluster.name == current) {
            Some(index) if forward => (index + 1) % len,
            Some(index) => (index + len - 1) % len,
            None => 0,
        };
        let name = clusters[next].name.clone();
        form.on_fields_change(FieldPatch::single(FieldId::RemoteCluster, name));
    }

    /// Apply a text edit to the focused field. The remote cluster is picked
    /// from the list instead.
    fn edit_focused_field(&mut self, edit: impl FnOnce(&mut String)) {
        let (Some(FocusTarget::Field(id)), Some(form)) = (self.focus, self.form.as_mut()) else {
            return;
        };
        if id == FieldId::RemoteCluster {
            return;
        }

        let mut value = form.fields().get(id).to_string();
        edit(&mut value);
        form.on_fields_change(FieldPatch::single(id, value));
    }

    fn clamp_selection(&mut self) {
        if self.follower_indices.is_empty() {
            self.list_state.select(None);
        } else {
            let last = self.follower_indices.len() - 1;
            let selected = self.list_state.selected().unwrap_or(0).min(last);
            self.list_state.select(Some(selected));
        }
    }

    pub fn selected_follower_index(&self) -> Option<&FollowerIndex> {
        self.list_state
            .selected()
            .and_then(|index| self.follower_indices.get(index))
    }
}

async fn fetch_form_data(api: Arc<dyn ClusterApi>, name: Option<String>) -> CcrResult<FormData> {
    let remote_clusters = api.load_remote_clusters().await?;
    let follower_index = match name {
        Some(name) => Some(api.get_follower_index(&name).await?),
        None => None,
    };
    Ok(FormData {
        remote_clusters,
        follower_index,
    })
}
