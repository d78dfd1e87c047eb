use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::BTreeSet, fmt};
use tracing::warn;

/// Path every GraphQL endpoint is registered under.
pub const GRAPHQL_PATH: &str = "/api/graphql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Enumeration order used whenever methods are listed or joined.
    pub const ALL: [HttpMethod; 4] = [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn parse(method: &str) -> Option<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(method.trim()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    Basic(BasicCredentials),
    Token(Value),
}

impl Authentication {
    /// Classifies the JSON the backend stored for an endpoint.
    pub fn from_json(value: Value) -> Option<Authentication> {
        match value {
            Value::Null => None,
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(parsed) => Authentication::from_json(parsed),
                Err(_) => Some(Authentication::Token(Value::String(raw))),
            },
            Value::Object(map) => {
                if map.len() == 2 {
                    if let (Some(Value::String(username)), Some(Value::String(password))) =
                        (map.get("username"), map.get("password"))
                    {
                        return Some(Authentication::Basic(BasicCredentials {
                            username: username.clone(),
                            password: password.clone(),
                        }));
                    }
                }
                Some(Authentication::Token(Value::Object(map)))
            }
            other => Some(Authentication::Token(other)),
        }
    }

    /// Header a caller of the mocked endpoint has to send to get through.
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Authentication::Basic(creds) => {
                let encoded = general_purpose::STANDARD
                    .encode(format!("{}:{}", creds.username, creds.password));
                Some(format!("Basic {}", encoded))
            }
            Authentication::Token(payload) => payload
                .get("tokenData")
                .and_then(Value::as_str)
                .map(|token| format!("Bearer {}", token)),
        }
    }
}

/// An endpoint as mirrored from the backend's `/list`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointConfig {
    pub path: String,
    pub methods: BTreeSet<HttpMethod>,
    pub status_code: Option<u16>,
    pub delay_ms: Option<u64>,
    pub rate_limit: Option<String>,
    pub authentication: Option<Authentication>,
    pub is_graphql: bool,
    pub with_dynamic_vars: bool,
    pub file: Option<String>,
}

impl EndpointConfig {
    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.authentication.as_ref().and_then(Authentication::authorization_header)
    }

    pub fn methods_label(&self) -> String {
        self.methods
            .iter()
            .map(HttpMethod::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub(crate) fn from_wire(path: String, wire: WireEndpoint) -> Self {
        EndpointConfig {
            path,
            methods: wire.methods,
            status_code: wire.status_code,
            delay_ms: wire.delay,
            rate_limit: wire.rate_limit.map(WireRateLimit::into_raw),
            authentication: wire.authentication.and_then(Authentication::from_json),
            is_graphql: wire.is_graphql,
            with_dynamic_vars: wire.with_dynamic_vars.unwrap_or(false),
            file: wire.file,
        }
    }
}

/// Shape of one `/list` entry; the backend keys the map by path.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEndpoint {
    #[serde(default, rename = "method", alias = "methods", deserialize_with = "known_methods")]
    methods: BTreeSet<HttpMethod>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default, alias = "statusCode")]
    status_code: Option<u16>,
    #[serde(default, alias = "delayMs")]
    delay: Option<u64>,
    #[serde(default, alias = "rateLimit")]
    rate_limit: Option<WireRateLimit>,
    #[serde(default)]
    authentication: Option<Value>,
    #[serde(default, rename = "isGraphQL", alias = "is_graphql")]
    is_graphql: bool,
    #[serde(default)]
    with_dynamic_vars: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireRateLimit {
    Raw(String),
    Window { requests: usize, window_ms: u64 },
}

impl WireRateLimit {
    fn into_raw(self) -> String {
        match self {
            WireRateLimit::Raw(raw) => raw,
            WireRateLimit::Window { requests, window_ms } => format!("{}/{}", requests, window_ms),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireMethods {
    List(Vec<String>),
    Joined(String),
}

fn known_methods<'de, D>(deserializer: D) -> Result<BTreeSet<HttpMethod>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match WireMethods::deserialize(deserializer)? {
        WireMethods::List(methods) => methods,
        WireMethods::Joined(joined) => joined.split(',').map(String::from).collect(),
    };

    let mut methods = BTreeSet::new();
    for method in raw {
        match HttpMethod::parse(&method) {
            Some(m) => {
                methods.insert(m);
            }
            None if method.trim().is_empty() => {}
            None => warn!("Ignoring unsupported method {:?} in endpoint listing", method),
        }
    }
    Ok(methods)
}
