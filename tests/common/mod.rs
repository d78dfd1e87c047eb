#![allow(dead_code)]

use bytes::BufMut;
use futures::{StreamExt, TryStreamExt};
use mockserver_admin::config::ConsoleConfig;
use mockserver_admin::form::ResponseFile;
use mockserver_admin::notification::Notification;
use mockserver_admin::ui::UiEffects;
use mockserver_admin::AdminConsole;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub fields: HashMap<String, String>,
    pub file: Option<Vec<u8>>,
}

#[derive(Default)]
pub struct BackendState {
    pub endpoints: BTreeMap<String, Value>,
    pub requests: Vec<RecordedRequest>,
    pub fail_list: bool,
    pub fail_register: bool,
    pub fail_delete: bool,
}

pub type SharedBackend = Arc<Mutex<BackendState>>;

/// In-process stand-in for the mockserver's admin routes.
pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: SharedBackend,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state: SharedBackend = Arc::new(Mutex::new(BackendState::default()));
        let (addr, server) = warp::serve(routes(state.clone())).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        FakeBackend { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn insert(&self, path: &str, endpoint: Value) {
        self.state.lock().unwrap().endpoints.insert(path.to_string(), endpoint);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }

    pub fn set(&self, edit: impl FnOnce(&mut BackendState)) {
        edit(&mut self.state.lock().unwrap());
    }
}

fn with_state(state: SharedBackend) -> impl Filter<Extract = (SharedBackend,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn routes(state: SharedBackend) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::get()
        .and(warp::path!("list"))
        .and(with_state(state.clone()))
        .and_then(list_endpoints);

    let register = warp::post()
        .and(warp::path!("register"))
        .and(warp::multipart::form().max_length(5_000_000))
        .and(with_state(state.clone()))
        .and_then(register_endpoint);

    let delete = warp::delete()
        .and(warp::path!("delete" / String))
        .and(with_state(state))
        .and_then(delete_endpoint);

    list.or(register).or(delete)
}

fn record(state: &SharedBackend, request: RecordedRequest) {
    state.lock().unwrap().requests.push(request);
}

async fn list_endpoints(state: SharedBackend) -> Result<impl Reply, Rejection> {
    record(&state, RecordedRequest {
        method: "GET".into(),
        path: "/list".into(),
        fields: HashMap::new(),
        file: None,
    });

    let backend = state.lock().unwrap();
    if backend.fail_list {
        return Ok(warp::reply::with_status(warp::reply::json(&"boom"), StatusCode::INTERNAL_SERVER_ERROR));
    }
    Ok(warp::reply::with_status(warp::reply::json(&backend.endpoints), StatusCode::OK))
}

async fn register_endpoint(form: FormData, state: SharedBackend) -> Result<impl Reply, Rejection> {
    let mut fields = HashMap::new();
    let mut file = None;
    let mut parts = form.into_stream();

    while let Some(Ok(part)) = parts.next().await {
        let name = part.name().to_string();
        let data = part_to_bytes(part).await;
        if name == "file" {
            file = Some(data);
        } else {
            fields.insert(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    record(&state, RecordedRequest {
        method: "POST".into(),
        path: "/register".into(),
        fields: fields.clone(),
        file,
    });

    let mut backend = state.lock().unwrap();
    if backend.fail_register {
        return Ok(warp::reply::with_status(warp::reply::json(&"Registered successfully"), StatusCode::BAD_REQUEST));
    }

    let path = fields.get("path").cloned().unwrap_or_default();
    let methods: Vec<&str> = fields.get("methods").map(|m| m.split(',').collect()).unwrap_or_default();
    let authentication = fields.get("authentication").filter(|a| a.as_str() != "null");
    let endpoint = json!({
        "method": methods,
        "file": "uploads/response.json",
        "status_code": fields.get("status_code").and_then(|s| s.parse::<u16>().ok()).unwrap_or(200),
        "authentication": authentication,
        "delay": fields.get("delay").and_then(|d| d.parse::<u64>().ok()),
        "rate_limit": null,
        "with_dynamic_vars": fields.get("with_dynamic_vars").map(|v| v == "true"),
    });
    backend.endpoints.insert(path, endpoint);

    Ok(warp::reply::with_status(warp::reply::json(&"Registered successfully"), StatusCode::OK))
}

async fn delete_endpoint(encoded: String, state: SharedBackend) -> Result<impl Reply, Rejection> {
    let path = match urlencoding::decode(&encoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => encoded.clone(),
    };
    record(&state, RecordedRequest {
        method: "DELETE".into(),
        path: path.clone(),
        fields: HashMap::new(),
        file: None,
    });

    let mut backend = state.lock().unwrap();
    if backend.fail_delete || backend.endpoints.remove(&path).is_none() {
        return Ok(warp::reply::with_status("Not Found", StatusCode::NOT_FOUND));
    }
    Ok(warp::reply::with_status("Deleted successfully", StatusCode::OK))
}

async fn part_to_bytes(part: Part) -> Vec<u8> {
    part.stream()
        .try_fold(Vec::new(), |mut vec, data| async move {
            vec.put(data);
            Ok(vec)
        })
        .await
        .unwrap_or_default()
}

/// Captures every side effect the console asks for.
#[derive(Default)]
pub struct RecordingEffects {
    pub loader: Mutex<Vec<bool>>,
    pub file_input_clears: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub confirm_answer: AtomicBool,
    pub inserted: Mutex<Vec<Notification>>,
}

impl RecordingEffects {
    pub fn confirming(answer: bool) -> Arc<Self> {
        let effects = RecordingEffects::default();
        effects.confirm_answer.store(answer, Ordering::SeqCst);
        Arc::new(effects)
    }

    pub fn loader_toggles(&self) -> Vec<bool> {
        self.loader.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        self.file_input_clears.load(Ordering::SeqCst)
    }
}

impl UiEffects for RecordingEffects {
    fn set_loader_visible(&self, visible: bool) {
        self.loader.lock().unwrap().push(visible);
    }

    fn clear_file_input(&self) {
        self.file_input_clears.fetch_add(1, Ordering::SeqCst);
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn notification_inserted(&self, notification: &Notification) {
        self.inserted.lock().unwrap().push(notification.clone());
    }
}

pub fn console_for(backend: &FakeBackend, effects: Arc<RecordingEffects>) -> AdminConsole {
    let config = ConsoleConfig {
        server_url: backend.url(),
        ..ConsoleConfig::default()
    };
    AdminConsole::new(&config, effects).unwrap()
}

pub fn json_file() -> ResponseFile {
    ResponseFile {
        name: "foo.json".to_string(),
        contents: bytes::Bytes::from_static(b"{\"message\": \"ok\"}"),
    }
}
