use crate::models::{RelayRequest, RelayResponse};
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

pub const ALLOWED_UPSTREAM: &str = "https://api.notion.com/";

const FORWARDED_HEADERS: [&str; 3] = ["Authorization", "Notion-Version", "Content-Type"];

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing url parameter")]
    MissingUrl,

    #[error("Only Notion API requests are allowed")]
    DisallowedUpstream,

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl RelayError {
    pub fn status(&self) -> u16 {
        match self {
            RelayError::MissingUrl => 400,
            RelayError::DisallowedUpstream => 403,
            RelayError::InvalidMethod(_) | RelayError::Upstream(_) => 500,
        }
    }
}

impl From<RelayError> for RelayResponse {
    fn from(err: RelayError) -> Self {
        RelayResponse::error(err.status(), err.to_string())
    }
}

/// Forwards widget requests to the one allowed upstream API.
pub struct Relay {
    client: Client,
    allowed_prefix: String,
}

impl Relay {
    pub fn new() -> Result<Self, RelayError> {
        let client = Client::builder().build()?;
        Ok(Self::with_upstream(client, ALLOWED_UPSTREAM))
    }

    pub fn with_upstream(client: Client, allowed_prefix: &str) -> Self {
        Self {
            client,
            allowed_prefix: allowed_prefix.to_string(),
        }
    }

    pub fn check_target<'a>(&self, url: Option<&'a str>) -> Result<&'a str, RelayError> {
        let url = url.filter(|u| !u.is_empty()).ok_or(RelayError::MissingUrl)?;
        if !url.starts_with(&self.allowed_prefix) {
            return Err(RelayError::DisallowedUpstream);
        }
        Ok(url)
    }

    /// Never fails: every error becomes a status code and `{ "error": ... }`.
    pub async fn handle(&self, request: RelayRequest) -> RelayResponse {
        if request.method.eq_ignore_ascii_case("OPTIONS") {
            return RelayResponse::new(200, Value::Null);
        }
        match self.forward(request).await {
            Ok(response) => response,
            Err(e) => e.into(),
        }
    }

    async fn forward(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        let target = self.check_target(request.url.as_deref())?;
        let method = parse_method(&request.method)?;

        let mut builder = self.client.request(method.clone(), target);
        for (name, value) in forwarded_headers(&request.headers) {
            builder = builder.header(name, value);
        }
        if method != Method::GET && method != Method::HEAD {
            if let Some(body) = request_body(request.body) {
                builder = builder.body(body);
            }
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body: Value = response.json().await?;
        Ok(RelayResponse::new(status, body))
    }
}

fn parse_method(method: &str) -> Result<Method, RelayError> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| RelayError::InvalidMethod(method.to_string()))
}

/// Picks the forwarded headers out of `headers`, matching names case-insensitively.
///
/// When several spellings of one name are present, the canonical spelling
/// wins, then the lexicographically smallest key.
pub fn forwarded_headers(headers: &HashMap<String, String>) -> Vec<(&'static str, String)> {
    FORWARDED_HEADERS
        .iter()
        .filter_map(|&name| {
            headers
                .get(name)
                .or_else(|| {
                    headers
                        .iter()
                        .filter(|(k, _)| k.eq_ignore_ascii_case(name))
                        .min_by(|(a, _), (b, _)| a.cmp(b))
                        .map(|(_, v)| v)
                })
                .map(|v| (name, v.clone()))
        })
        .collect()
}

fn request_body(body: Option<Value>) -> Option<String> {
    match body? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
