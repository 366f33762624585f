//! Request builder, response parser and entrypoints for the booleans API.
//!
//! # Design
//! `BooleansClient` holds a parsed base URL and a shared `Transport`; it
//! carries no mutable state between calls. Every endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`, so the request/response mapping can be
//! exercised without I/O. `call` is the single place a request crosses the
//! transport and the single place non-2xx statuses become errors.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::handle::{ReadOnlyBool, ReadWriteBool};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::transport::ReqwestTransport;
use crate::types::{BoolInit, BoolRecord, TokenResponse};

const TOKENS_PATH: &str = "tokens";

/// Entry point to the booleans API.
///
/// Cloning is cheap: clones share the transport. Every handle owns one.
#[derive(Clone)]
pub struct BooleansClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for BooleansClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleansClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BooleansClient {
    /// Client talking to `config.base_url` over reqwest.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(&config.base_url, Arc::new(transport))
    }

    /// Client configured from the environment (see `ClientConfig::from_env`).
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env())
    }

    /// Client sending every request through `transport`.
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        // The base URL itself is the collection root.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self {
            base_url: url,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // -----------------------------------------------------------------------
    // Entrypoints
    // -----------------------------------------------------------------------

    /// Ask the service for a fresh token.
    pub async fn create_token(&self) -> Result<String> {
        let req = self.build_create_token()?;
        self.parse_token(self.call(req).await?)
    }

    /// Create a boolean and return a read-write handle already holding the
    /// server's record. `None` sends an empty object and lets the server
    /// apply its defaults.
    pub async fn create_boolean(
        &self,
        token: &str,
        initial_data: Option<&BoolInit>,
    ) -> Result<ReadWriteBool> {
        let default = BoolInit::default();
        let req = self.build_create_boolean(token, initial_data.unwrap_or(&default))?;
        let record = self.parse_record(self.call(req).await?)?;
        debug!(id = %record.id, "created boolean");
        ReadWriteBool::new(self.clone(), record.id.clone(), token, Some(record))
    }

    /// Every boolean visible to `token`, as seeded read-write handles.
    pub async fn list_booleans(&self, token: &str) -> Result<Vec<ReadWriteBool>> {
        let req = self.build_list_booleans(token)?;
        self.parse_records(self.call(req).await?)?
            .into_iter()
            .map(|record| ReadWriteBool::new(self.clone(), record.id.clone(), token, Some(record)))
            .collect()
    }

    /// Unfetched read-only handle for `id`.
    pub fn read_only(&self, id: impl Into<String>) -> ReadOnlyBool {
        ReadOnlyBool::unloaded(self.clone(), id.into())
    }

    /// Unfetched read-write handle for `id`.
    pub fn read_write(&self, id: impl Into<String>, token: impl Into<String>) -> ReadWriteBool {
        ReadWriteBool::unloaded(self.clone(), id.into(), token.into())
    }

    /// Send `request` and fail on any non-2xx status. The raw body of a
    /// failed response is logged before the error is returned.
    pub async fn call(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        debug!(status = response.status, "received response");
        check_status(&response)?;
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_create_token(&self) -> Result<HttpRequest> {
        self.request(HttpMethod::Post, Some(TOKENS_PATH), None, None)
    }

    pub fn build_create_boolean(&self, token: &str, input: &BoolInit) -> Result<HttpRequest> {
        self.request(HttpMethod::Post, None, Some(to_json(input)?), Some(token))
    }

    pub fn build_list_booleans(&self, token: &str) -> Result<HttpRequest> {
        self.request(HttpMethod::Get, None, None, Some(token))
    }

    pub fn build_get_boolean(&self, id: &str) -> Result<HttpRequest> {
        self.request(HttpMethod::Get, Some(id), None, None)
    }

    pub fn build_update_boolean(
        &self,
        id: &str,
        token: &str,
        input: &BoolInit,
    ) -> Result<HttpRequest> {
        self.request(HttpMethod::Patch, Some(id), Some(to_json(input)?), Some(token))
    }

    pub fn build_delete_boolean(&self, id: &str, token: &str) -> Result<HttpRequest> {
        self.request(HttpMethod::Delete, Some(id), None, Some(token))
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_token(&self, response: HttpResponse) -> Result<String> {
        let body: TokenResponse = require_body(parse_body(response)?)?;
        Ok(body.token)
    }

    pub fn parse_record(&self, response: HttpResponse) -> Result<BoolRecord> {
        require_body(parse_body(response)?)
    }

    pub fn parse_records(&self, response: HttpResponse) -> Result<Vec<BoolRecord>> {
        require_body(parse_body(response)?)
    }

    pub fn parse_empty(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    fn request(
        &self,
        method: HttpMethod,
        segment: Option<&str>,
        body: Option<String>,
        token: Option<&str>,
    ) -> Result<HttpRequest> {
        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Token {token}")));
        }
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        Ok(HttpRequest {
            method,
            url: self.endpoint(segment)?,
            headers,
            body,
        })
    }

    /// Absolute URL of the collection root, or of one segment below it.
    /// `PathSegmentsMut::push` drops `.` and `..`, and an empty segment
    /// resolves to the root, so those never reach the URL.
    fn endpoint(&self, segment: Option<&str>) -> Result<String> {
        let mut url = self.base_url.clone();
        if let Some(segment) = segment {
            if matches!(segment, "" | "." | "..") {
                return Err(ApiError::InvalidId(segment.to_string()));
            }
            url.path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
                .pop_if_empty()
                .push(segment);
        }
        Ok(url.into())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Map a non-2xx response to `ApiError::Http`, logging the raw body.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    error!(status = response.status, body = %response.body, "request failed");
    Err(ApiError::Http {
        status: response.status,
        status_text: response.status_text.clone(),
        body: response.body.clone(),
    })
}

/// Decode a successful response. 204 carries no body and yields `None`.
fn parse_body<T: DeserializeOwned>(response: HttpResponse) -> Result<Option<T>> {
    check_status(&response)?;
    if response.status == 204 {
        return Ok(None);
    }
    serde_json::from_str(&response.body)
        .map(Some)
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn require_body<T>(body: Option<T>) -> Result<T> {
    body.ok_or_else(|| ApiError::Deserialization("expected a response body, got 204".to_string()))
}
