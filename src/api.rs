use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;
use crate::error::{NetworkError, Operation};
use crate::model::{EndpointConfig, WireEndpoint};
use crate::submission::RegistrationPayload;

/// HTTP client for the mockserver's admin routes.
#[derive(Clone, Debug)]
pub struct MockServerClient {
    http: Client,
    base_url: Url,
}

impl MockServerClient {
    pub fn new(server_url: &str) -> Result<Self, NetworkError> {
        let mut base_url = Url::parse(server_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(MockServerClient {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /list`, sorted by path.
    pub async fn list(&self) -> Result<Vec<EndpointConfig>, NetworkError> {
        let url = self.base_url.join("list")?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(NetworkError::request(Operation::List))?;
        let response = ensure_success(response, Operation::List)?;

        let endpoints: BTreeMap<String, WireEndpoint> = response
            .json()
            .await
            .map_err(NetworkError::request(Operation::List))?;

        Ok(endpoints
            .into_iter()
            .map(|(path, wire)| EndpointConfig::from_wire(path, wire))
            .collect())
    }

    /// `POST /register` with the multipart form.
    pub async fn register(&self, payload: RegistrationPayload) -> Result<(), NetworkError> {
        let url = self.base_url.join("register")?;
        debug!("POST {} for {}", url, payload.path);

        let form = multipart_form(payload).map_err(NetworkError::request(Operation::Register))?;
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(NetworkError::request(Operation::Register))?;
        ensure_success(response, Operation::Register)?;

        Ok(())
    }

    /// `DELETE /delete/{path}`, with the path escaped into a single segment.
    pub async fn delete(&self, path: &str) -> Result<(), NetworkError> {
        let url = delete_url(&self.base_url, path)?;
        debug!("DELETE {}", url);

        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(NetworkError::request(Operation::Delete))?;
        ensure_success(response, Operation::Delete)?;

        Ok(())
    }
}

/// `.` and `..` are dot-segments in any spelling and get resolved away by URL
/// parsing, so an empty path or one that doesn't survive as the last segment is refused.
fn delete_url(base_url: &Url, path: &str) -> Result<Url, NetworkError> {
    let segment = urlencoding::encode(path);
    let url = base_url.join(&format!("delete/{}", segment))?;

    let last = url.path_segments().and_then(|mut segments| segments.next_back());
    if path.is_empty() || last != Some(segment.as_ref()) {
        return Err(NetworkError::UnaddressablePath(path.to_string()));
    }
    Ok(url)
}

fn ensure_success(response: Response, operation: Operation) -> Result<Response, NetworkError> {
    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::Status { operation, status });
    }
    Ok(response)
}

fn optional_field<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn multipart_form(payload: RegistrationPayload) -> reqwest::Result<Form> {
    let file = Part::bytes(payload.file.contents.to_vec())
        .file_name(payload.file.name)
        .mime_str("application/json")?;

    let mut form = Form::new()
        .text("path", payload.path)
        .text("methods", payload.methods)
        .text("status_code", optional_field(payload.status_code))
        .text("delay", optional_field(payload.delay))
        .text("rate_limit", payload.rate_limit)
        .text("authentication", payload.authentication)
        .text("isGraphQL", payload.is_graphql.to_string());
    if payload.with_dynamic_vars {
        form = form.text("with_dynamic_vars", "true");
    }

    Ok(form.part("file", file))
}
