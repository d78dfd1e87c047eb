use crate::error::{NetworkError, ValidationError};
use crate::form::{AuthType, FormState, MethodSelection, ResponseFile};
use serde_json::{Value, json};
use crate::model::{GRAPHQL_PATH, HttpMethod};

/// Stands in for the browser's submit event.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Validation failed; nothing was sent.
    Aborted(ValidationError),
    Succeeded,
    /// The backend call failed; the form is left as it was.
    Failed(NetworkError),
}

/// Multipart body for `POST /register`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationPayload {
    pub path: String,
    pub methods: String,
    pub status_code: Option<u16>,
    pub delay: Option<u64>,
    pub rate_limit: String,
    pub authentication: String,
    pub is_graphql: bool,
    pub with_dynamic_vars: bool,
    pub file: ResponseFile,
}

pub fn resolve_path(path: &str, is_graphql: bool) -> String {
    if is_graphql {
        GRAPHQL_PATH.to_string()
    } else {
        path.to_string()
    }
}

/// Comma-joined selected methods in GET, POST, PUT, DELETE order.
pub fn extract_methods(selection: &MethodSelection) -> Result<String, ValidationError> {
    let selected = selection.selected();
    if selected.is_empty() {
        return Err(ValidationError::NoMethodSelected);
    }

    Ok(selected
        .iter()
        .map(HttpMethod::as_str)
        .collect::<Vec<_>>()
        .join(","))
}

/// Authentication as the JSON string the backend expects in the form field.
pub fn handle_authentication(
    auth_type: AuthType,
    username: &str,
    password: &str,
    token_data: &str,
) -> Result<String, ValidationError> {
    match auth_type {
        AuthType::Basic => Ok(json!({ "username": username, "password": password }).to_string()),
        AuthType::Token => serde_json::from_str::<Value>(token_data)
            .map(|token| token.to_string())
            .map_err(ValidationError::InvalidTokenData),
        AuthType::None => Ok("null".to_string()),
    }
}

/// Validates the draft and packs it for registration.
pub fn build_payload(form: &FormState) -> Result<RegistrationPayload, ValidationError> {
    let is_graphql = form.is_graphql();
    let methods = if is_graphql {
        HttpMethod::Post.as_str().to_string()
    } else {
        extract_methods(&form.methods)?
    };
    let authentication = handle_authentication(
        form.auth_type(),
        &form.username,
        &form.password,
        &form.token_data,
    )?;
    let file = form
        .response_file
        .clone()
        .ok_or(ValidationError::MissingResponseFile)?;

    Ok(RegistrationPayload {
        path: resolve_path(&form.path, is_graphql),
        methods,
        status_code: form.status_code,
        delay: form.delay_ms,
        rate_limit: form.rate_limit.clone(),
        authentication,
        is_graphql,
        with_dynamic_vars: form.with_dynamic_vars,
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormStore;
    use crate::ui::UiEffects;
    use bytes::Bytes;
    use std::sync::Arc;

    struct NoEffects;

    impl UiEffects for NoEffects {
        fn set_loader_visible(&self, _visible: bool) {}
        fn clear_file_input(&self) {}
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    fn response_file() -> ResponseFile {
        ResponseFile {
            name: "ok.json".to_string(),
            contents: Bytes::from_static(b"{\"ok\":true}"),
        }
    }

    #[test]
    fn methods_follow_enumeration_order() {
        let selection = MethodSelection {
            get: true,
            post: true,
            put: false,
            delete: false,
        };
        assert_eq!(extract_methods(&selection).unwrap(), "GET,POST");

        let selection = MethodSelection {
            get: false,
            post: false,
            put: true,
            delete: true,
        };
        assert_eq!(extract_methods(&selection).unwrap(), "PUT,DELETE");
    }

    #[test]
    fn no_method_is_a_validation_error() {
        let none = MethodSelection {
            get: false,
            post: false,
            put: false,
            delete: false,
        };
        assert!(matches!(extract_methods(&none), Err(ValidationError::NoMethodSelected)));
    }

    #[test]
    fn basic_auth_encodes_username_then_password() {
        let encoded = handle_authentication(AuthType::Basic, "u", "p", "").unwrap();
        assert_eq!(encoded, r#"{"username":"u","password":"p"}"#);

        let encoded = handle_authentication(AuthType::Basic, "a\"b", "{bad json", "").unwrap();
        assert_eq!(encoded, r#"{"username":"a\"b","password":"{bad json"}"#);
    }

    #[test]
    fn token_auth_is_compacted_json() {
        let encoded = handle_authentication(AuthType::Token, "", "", "{ \"tokenData\": \"abc\", \"aud\": 1 }").unwrap();
        assert_eq!(encoded, r#"{"tokenData":"abc","aud":1}"#);
    }

    #[test]
    fn malformed_token_is_rejected() {
        let err = handle_authentication(AuthType::Token, "", "", "{bad json").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTokenData(_)));
        assert_eq!(err.to_string(), "Invalid token data format.");
    }

    #[test]
    fn no_auth_is_json_null() {
        assert_eq!(handle_authentication(AuthType::None, "u", "p", "x").unwrap(), "null");
    }

    #[test]
    fn graphql_overrides_path_and_methods() {
        let form = FormState {
            path: "/not-graphql".to_string(),
            methods: MethodSelection {
                get: true,
                post: false,
                put: true,
                delete: false,
            },
            response_file: Some(response_file()),
            is_graphql: true,
            ..FormState::default()
        };

        let payload = build_payload(&form).unwrap();
        assert_eq!(payload.path, GRAPHQL_PATH);
        assert_eq!(payload.methods, "POST");
        assert!(payload.is_graphql);
    }

    #[test]
    fn rest_path_is_used_verbatim() {
        let store = FormStore::new(Arc::new(NoEffects));
        store.update(|form| {
            form.path = " /spaced ".to_string();
            form.response_file = Some(response_file());
        });

        let payload = build_payload(&store.snapshot()).unwrap();
        assert_eq!(payload.path, " /spaced ");
        assert_eq!(payload.methods, "GET");
        assert_eq!(payload.authentication, "null");
    }

    #[test]
    fn missing_file_aborts() {
        let store = FormStore::new(Arc::new(NoEffects));
        store.update(|form| form.path = "/foo".to_string());

        let err = build_payload(&store.snapshot()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingResponseFile));
        assert_eq!(err.to_string(), "Please select a JSON file");
    }
}
