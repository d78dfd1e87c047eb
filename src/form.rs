use bytes::Bytes;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use crate::model::{GRAPHQL_PATH, HttpMethod};
use crate::ui::UiEffects;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Token,
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AuthType::None),
            "basic" => Ok(AuthType::Basic),
            "token" => Ok(AuthType::Token),
            other => Err(format!("unknown authentication type: {}", other)),
        }
    }
}

/// `(showBasicAuthFields, showTokenAuthFields)` for an auth type.
pub fn auth_field_visibility(auth_type: AuthType) -> (bool, bool) {
    (auth_type == AuthType::Basic, auth_type == AuthType::Token)
}

/// Checkbox state for the four supported methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSelection {
    pub get: bool,
    pub post: bool,
    pub put: bool,
    pub delete: bool,
}

impl MethodSelection {
    pub fn only(method: HttpMethod) -> Self {
        let mut selection = MethodSelection {
            get: false,
            post: false,
            put: false,
            delete: false,
        };
        selection.set(method, true);
        selection
    }

    pub fn is_selected(&self, method: HttpMethod) -> bool {
        match method {
            HttpMethod::Get => self.get,
            HttpMethod::Post => self.post,
            HttpMethod::Put => self.put,
            HttpMethod::Delete => self.delete,
        }
    }

    pub fn set(&mut self, method: HttpMethod, selected: bool) {
        match method {
            HttpMethod::Get => self.get = selected,
            HttpMethod::Post => self.post = selected,
            HttpMethod::Put => self.put = selected,
            HttpMethod::Delete => self.delete = selected,
        }
    }

    /// Selected methods in enumeration order.
    pub fn selected(&self) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .filter(|m| self.is_selected(*m))
            .collect()
    }
}

impl Default for MethodSelection {
    fn default() -> Self {
        MethodSelection::only(HttpMethod::Get)
    }
}

/// The mock response body picked by the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFile {
    pub name: String,
    pub contents: Bytes,
}

/// Draft of an endpoint registration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub path: String,
    pub methods: MethodSelection,
    pub status_code: Option<u16>,
    pub delay_ms: Option<u64>,
    pub rate_limit: String,
    pub username: String,
    pub password: String,
    pub token_data: String,
    pub response_file: Option<ResponseFile>,
    pub with_dynamic_vars: bool,
    pub(crate) auth_type: AuthType,
    pub(crate) is_graphql: bool,
}

impl FormState {
    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn is_graphql(&self) -> bool {
        self.is_graphql
    }

    pub fn show_path_field(&self) -> bool {
        !self.is_graphql
    }

    pub fn disable_http_methods(&self) -> bool {
        self.is_graphql
    }

    pub fn show_basic_auth_fields(&self) -> bool {
        auth_field_visibility(self.auth_type).0
    }

    pub fn show_token_auth_fields(&self) -> bool {
        auth_field_visibility(self.auth_type).1
    }

    fn pin_graphql_fields(&mut self) {
        self.methods = MethodSelection::only(HttpMethod::Post);
        self.path = GRAPHQL_PATH.to_string();
    }
}

/// Owner of the draft; every change is published to subscribers.
#[derive(Clone)]
pub struct FormStore {
    state: Arc<watch::Sender<FormState>>,
    effects: Arc<dyn UiEffects>,
}

impl FormStore {
    pub fn new(effects: Arc<dyn UiEffects>) -> Self {
        let (state, _) = watch::channel(FormState::default());
        FormStore {
            state: Arc::new(state),
            effects,
        }
    }

    pub fn snapshot(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    /// Edits the plain input fields. In GraphQL mode path and methods stay pinned.
    pub fn update(&self, edit: impl FnOnce(&mut FormState)) {
        self.state.send_modify(|form| {
            edit(form);
            if form.is_graphql {
                form.pin_graphql_fields();
            }
        });
    }

    /// Method checkboxes are inert while GraphQL mode is on.
    pub fn set_method(&self, method: HttpMethod, selected: bool) {
        self.state.send_if_modified(|form| {
            if form.disable_http_methods() || form.methods.is_selected(method) == selected {
                return false;
            }
            form.methods.set(method, selected);
            true
        });
    }

    pub fn update_auth_fields(&self, auth_type: AuthType) {
        debug!("Authentication type set to {:?}", auth_type);
        self.state.send_modify(|form| form.auth_type = auth_type);
    }

    pub fn handle_graphql_toggle(&self, enabled: bool) {
        debug!("GraphQL mode {}", if enabled { "enabled" } else { "disabled" });
        self.state.send_modify(|form| {
            form.is_graphql = enabled;
            if enabled {
                form.pin_graphql_fields();
            } else {
                form.methods = MethodSelection::only(HttpMethod::Get);
                form.path.clear();
            }
        });
    }

    /// Keeps the first picked file; an empty pick leaves the current one.
    pub fn handle_file_input(&self, files: impl IntoIterator<Item = ResponseFile>) {
        if let Some(file) = files.into_iter().next() {
            debug!("Response file selected: {}", file.name);
            self.state.send_modify(|form| form.response_file = Some(file));
        }
    }

    pub fn reset_form(&self) {
        debug!("Resetting endpoint form");
        self.state.send_replace(FormState::default());
        self.effects.clear_file_input();
    }
}
