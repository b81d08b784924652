//! Session-aware JSON transport for the InnovaTube backend

use std::sync::Arc;

use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::{first_string, SessionStore};

/// Body fields that may carry a human-readable error, in priority order.
/// `title` is what ASP.NET problem details use.
pub const ERROR_MESSAGE_FIELDS: &[&str] = &["message", "error", "title"];

/// HTTP client bound to one backend origin and one session store
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_prefix: String,
    session: Arc<dyn SessionStore>,
}

impl HttpClient {
    /// Create a new HttpClient
    pub fn new(client: Client, config: &ClientConfig, session: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.clone(),
            session,
        }
    }

    /// The session store consulted for bearer tokens
    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// The underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Origin + prefix + `path`, plus every parameter whose value is non-empty.
    pub fn build_url(&self, path: &str, params: &[(String, Option<String>)]) -> Result<Url> {
        let full = join(&join(&self.base_url, &self.api_prefix), path);
        let mut url = Url::parse(&full)?;
        append_params(&mut url, params);
        Ok(url)
    }

    /// Start a request with an arbitrary method
    pub fn request(&self, method: Method, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, method, path)
    }

    /// Create a GET request
    pub fn get(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::PUT, path)
    }

    /// Create a DELETE request
    pub fn delete(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::DELETE, path)
    }
}

/// Helper for building and executing one backend request
pub struct FetchBuilder<'a> {
    http: &'a HttpClient,
    method: Method,
    path: String,
    params: Vec<(String, Option<String>)>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    fn new(http: &'a HttpClient, method: Method, path: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            http,
            method,
            path: path.to_string(),
            params: Vec::new(),
            headers,
            body: None,
        }
    }

    /// Add a header to the request; invalid names or values are skipped
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add a query parameter; `None` and empty values are dropped when the URL is built
    pub fn param(mut self, key: &str, value: impl Into<Option<String>>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    fn build(&self) -> Result<RequestBuilder> {
        let url = self.http.build_url(&self.path, &self.params)?;
        debug!("{} {}", self.method, url);

        let mut req = self
            .http
            .client
            .request(self.method.clone(), url)
            .headers(self.headers.clone());

        if let Some(session) = self.http.session.get() {
            if let Some(token) = session.bearer_token() {
                req = req.bearer_auth(token);
            }
        }

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    /// Execute the request.
    ///
    /// Returns `None` for 204 or an empty body, the parsed JSON otherwise, or
    /// the raw text as a JSON string when it is not JSON.
    pub async fn send(self) -> Result<Option<Value>> {
        let req = self.build()?;
        let response = req.send().await?;
        read_response(response).await
    }

    /// Execute the request and deserialize the body; an empty body is `null`
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.send().await?.unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}

/// Apply the success/failure conventions shared by every endpoint.
pub(crate) async fn read_response(response: Response) -> Result<Option<Value>> {
    let status = response.status();
    let text = response.text().await?;
    debug!("<- {} ({} bytes)", status, text.len());

    if !status.is_success() {
        return Err(error_from_body(status.as_u16(), &text));
    }

    if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(
        serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::String(text)),
    ))
}

/// Turn a failed response body into an [`Error::Http`].
pub(crate) fn error_from_body(status: u16, body: &str) -> Error {
    let fallback = format!("HTTP {status}");
    let body = body.trim();
    if body.is_empty() {
        return Error::http(status, fallback);
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => Error::http(
            status,
            first_string(&value, ERROR_MESSAGE_FIELDS).unwrap_or(fallback),
        ),
        Err(_) => Error::http(status, body),
    }
}

pub(crate) fn append_params(url: &mut Url, params: &[(String, Option<String>)]) {
    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(k, v)| match v.as_deref() {
            Some(v) if !v.is_empty() => Some((k.as_str(), v)),
            _ => None,
        })
        .collect();

    if !present.is_empty() {
        url.query_pairs_mut().extend_pairs(present);
    }
}

/// Join two URL segments with exactly one `/` between them.
fn join(a: &str, b: &str) -> String {
    if b.is_empty() {
        return a.to_string();
    }
    let a = a.trim_end_matches('/');
    if b.starts_with('/') {
        format!("{a}{b}")
    } else {
        format!("{a}/{b}")
    }
}
