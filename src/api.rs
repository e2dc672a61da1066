// API transport: a small blocking HTTP client that talks to the catalog API.
//
// Every call carries the session bearer token. The verb is picked from the
// payload, caller headers are merged under the baseline set, query
// parameters are appended verbatim and the body is decoded as JSON.

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

use crate::config::Config;
use crate::error::{ApiError, Result};

/// Version prefix every API path lives under.
pub const API_PREFIX: &str = "/v2";

/// Ordered `key=value` query parameters.
///
/// Values are written as-is; callers only pass plain scalars (numbers,
/// short identifiers), so nothing is percent-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `page=1&limit=10&order=desc`, in insertion order.
    pub fn serialize(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// POST when there is something to send, GET otherwise.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` count as "nothing to send".
pub fn select_method(payload: Option<&Value>) -> Method {
    match payload {
        Some(value) if !is_empty_payload(value) => Method::POST,
        _ => Method::GET,
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Merge caller headers with the baseline. Baseline entries replace any
/// caller entry with the same (case-insensitive) name.
pub fn merge_headers(baseline: &HeaderMap, extra: Option<&HeaderMap>) -> HeaderMap {
    let mut merged = extra.cloned().unwrap_or_default();
    for (name, value) in baseline {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Root `path` under [`API_PREFIX`] unless it already is.
pub fn normalize_path(path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if path.starts_with("/v2/") {
        path
    } else {
        format!("{API_PREFIX}{path}")
    }
}

/// Path plus the serialized query, if any.
pub fn request_target(path: &str, query: Option<&Query>) -> String {
    let path = normalize_path(path);
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{}", q.serialize()),
        _ => path,
    }
}

/// Token-bearing client for the JSON API.
///
/// This is the only type that ever sees the bearer token; the asset host is
/// reached through [`crate::asset::AssetFetcher`], which has no access to it.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    baseline: HeaderMap,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(ApiClient {
            client,
            base_url: config.api_base.clone(),
            baseline: baseline_headers(&config.token)?,
        })
    }

    /// The `Accept` + `Authorization` set sent with every API call.
    pub fn baseline(&self) -> &HeaderMap {
        &self.baseline
    }

    /// Issue one API call and decode the JSON body.
    ///
    /// The HTTP status is not interpreted: the API reports failures in the
    /// JSON body and callers validate the shape they need. A network error,
    /// an empty body or a non-JSON body is an error.
    pub fn request(
        &self,
        path: &str,
        payload: Option<&Value>,
        extra_headers: Option<&HeaderMap>,
        query: Option<&Query>,
    ) -> Result<Value> {
        let method = select_method(payload);
        let url = format!("{}{}", self.base_url, request_target(path, query));
        let headers = merge_headers(&self.baseline, extra_headers);
        debug!("{method} {url}");

        let mut req = self.client.request(method.clone(), url.as_str()).headers(headers);
        if method == Method::POST {
            if let Some(payload) = payload {
                req = req.body(serde_json::to_vec(payload)?);
            }
        }

        let res = req.send()?;
        let status = res.status();
        if !status.is_success() {
            warn!("{url} answered with status {status}");
        }
        let body = res.bytes()?;
        decode_body(&body)
    }

    pub fn get(&self, path: &str, query: Option<&Query>) -> Result<Value> {
        self.request(path, None, None, query)
    }
}

fn baseline_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let mut bearer =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ApiError::InvalidToken)?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

fn decode_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyBody);
    }
    Ok(serde_json::from_slice(body)?)
}
