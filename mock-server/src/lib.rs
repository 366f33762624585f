use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolRecord {
    pub id: String,
    pub value: bool,
    pub label: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request must be authenticated")]
    Unauthorized,
    #[error("unknown boolean {0}")]
    NotFound(String),
    #[error("invalid JSON body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default)]
struct Inner {
    booleans: HashMap<String, BoolRecord>,
    last_tick: i64,
}

impl Inner {
    /// Current time, never equal to or before a previously returned one.
    fn tick(&mut self) -> String {
        let micros = Utc::now().timestamp_micros().max(self.last_tick + 1);
        self.last_tick = micros;
        DateTime::from_timestamp_micros(micros)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// In-memory data store behind the fake API. Clones share the same data, so a
/// test can keep one and inspect what the server did.
#[derive(Clone, Debug, Default)]
pub struct Store {
    inner: Arc<RwLock<Inner>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<BoolRecord> {
        self.inner.read().await.booleans.get(id).cloned()
    }

    pub async fn insert(&self, record: BoolRecord) {
        self.inner
            .write()
            .await
            .booleans
            .insert(record.id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.booleans.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub fn app() -> Router {
    app_with_store(Store::new())
}

pub fn app_with_store(store: Store) -> Router {
    Router::new()
        .route("/tokens", post(create_token))
        .route("/", get(list_booleans).post(create_boolean))
        .route(
            "/{id}",
            get(get_boolean).patch(update_boolean).delete(delete_boolean),
        )
        .with_state(store)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_store(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_store(store)).await
}

/// Accept any `Authorization: Token <t>` header with a non-empty token.
fn require_token(headers: &HeaderMap) -> Result<(), ServiceError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token "))
        .filter(|token| !token.trim().is_empty())
        .map(|_| ())
        .ok_or(ServiceError::Unauthorized)
}

/// Read the request body once the caller is known to be authenticated. An
/// empty body counts as `{}`.
fn parse_input(body: &Bytes) -> Result<Value, ServiceError> {
    if body.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| ServiceError::InvalidBody(e.to_string()))
}

/// Fields of the wrong JSON type are treated as absent.
fn value_field(input: &Value) -> Option<bool> {
    input.get("value").and_then(Value::as_bool)
}

fn label_field(input: &Value) -> Option<String> {
    input.get("label").and_then(Value::as_str).map(str::to_string)
}

async fn create_token() -> Json<TokenResponse> {
    debug!("issued token");
    Json(TokenResponse {
        token: Uuid::new_v4().to_string(),
    })
}

async fn list_booleans(
    State(store): State<Store>,
    headers: HeaderMap,
) -> Result<Json<Vec<BoolRecord>>, ServiceError> {
    require_token(&headers)?;
    let state = store.inner.read().await;
    Ok(Json(state.booleans.values().cloned().collect()))
}

async fn create_boolean(
    State(store): State<Store>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<BoolRecord>), ServiceError> {
    require_token(&headers)?;
    let input = parse_input(&body)?;
    let mut state = store.inner.write().await;
    let now = state.tick();
    let record = BoolRecord {
        id: Uuid::new_v4().to_string(),
        value: value_field(&input).unwrap_or(false),
        label: label_field(&input),
        created_at: now.clone(),
        updated_at: now,
    };
    state.booleans.insert(record.id.clone(), record.clone());
    debug!(id = %record.id, "created boolean");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_boolean(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<BoolRecord>, ServiceError> {
    store.get(&id).await.map(Json).ok_or(ServiceError::NotFound(id))
}

async fn update_boolean(
    State(store): State<Store>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BoolRecord>, ServiceError> {
    require_token(&headers)?;
    let input = parse_input(&body)?;
    let mut state = store.inner.write().await;
    let now = state.tick();
    let record = state
        .booleans
        .get_mut(&id)
        .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
    if let Some(value) = value_field(&input) {
        record.value = value;
    }
    if let Some(label) = label_field(&input) {
        record.label = Some(label);
    }
    record.updated_at = now;
    debug!(id = %id, "updated boolean");
    Ok(Json(record.clone()))
}

async fn delete_boolean(
    State(store): State<Store>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ServiceError> {
    require_token(&headers)?;
    let mut state = store.inner.write().await;
    match state.booleans.remove(&id) {
        Some(_) => {
            debug!(id = %id, "deleted boolean");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ServiceError::NotFound(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn record_serializes_null_label() {
        let record = BoolRecord {
            id: "1".to_string(),
            value: false,
            label: None,
            created_at: "t".to_string(),
            updated_at: "t".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["value"], false);
        assert!(json["label"].is_null());
    }

    #[test]
    fn ticks_strictly_advance() {
        let mut state = Inner::default();
        let mut previous = state.tick();
        for _ in 0..1000 {
            let next = state.tick();
            assert!(next > previous, "{next} should be after {previous}");
            previous = next;
        }
    }

    #[test]
    fn ticks_are_rfc3339_utc() {
        let stamp = Inner::default().tick();
        assert!(DateTime::<chrono::FixedOffset>::parse_from_rfc3339(&stamp).is_ok());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn wrongly_typed_fields_are_ignored() {
        let input = serde_json::json!({ "value": "yes", "label": 42 });
        assert_eq!(value_field(&input), None);
        assert_eq!(label_field(&input), None);
    }

    #[test]
    fn well_typed_fields_are_read() {
        let input = serde_json::json!({ "value": true, "label": "hello!" });
        assert_eq!(value_field(&input), Some(true));
        assert_eq!(label_field(&input).as_deref(), Some("hello!"));
    }

    #[test]
    fn empty_body_reads_as_empty_object() {
        let input = parse_input(&Bytes::new()).unwrap();
        assert_eq!(input, serde_json::json!({}));
        assert!(matches!(
            parse_input(&Bytes::from_static(b"not json")),
            Err(ServiceError::InvalidBody(_))
        ));
    }

    #[test]
    fn token_header_must_use_token_scheme() {
        let mut headers = HeaderMap::new();
        assert!(require_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(require_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token "));
        assert!(require_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert!(require_token(&headers).is_ok());
    }
}
