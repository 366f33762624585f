//! Client-side handles on remote booleans.
//!
//! # Design
//! A handle is an id plus a cache that is either `Unloaded` or holds the last
//! record the server returned. Field accessors fail with
//! `ApiError::NotFetched` until the cache is loaded, either by `fetch` or by
//! seeding the handle with a record at construction. Every successful call
//! replaces the whole record; nothing is merged locally.
//!
//! `ReadWriteBool` wraps a `ReadOnlyBool` and a token instead of extending
//! it, and both expose their fields through `BoolFields`. Two handles on the
//! same id never coordinate: each one only sees what its own calls returned.

use tracing::{debug, info};

use crate::client::BooleansClient;
use crate::error::{ApiError, Result};
use crate::types::{BoolInit, BoolRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Cache {
    #[default]
    Unloaded,
    Loaded(BoolRecord),
}

/// Read access to a boolean's cached fields.
pub trait BoolFields {
    fn id(&self) -> &str;

    /// The cached record, or `NotFetched` if there is none.
    fn record(&self) -> Result<&BoolRecord>;

    fn is_fetched(&self) -> bool {
        self.record().is_ok()
    }

    fn value(&self) -> Result<bool> {
        Ok(self.record()?.value)
    }

    fn label(&self) -> Result<Option<&str>> {
        Ok(self.record()?.label.as_deref())
    }

    fn created_at(&self) -> Result<&str> {
        Ok(&self.record()?.created_at)
    }

    fn updated_at(&self) -> Result<&str> {
        Ok(&self.record()?.updated_at)
    }
}

/// Handle that can only fetch and read a boolean. Needs no token.
#[derive(Debug, Clone)]
pub struct ReadOnlyBool {
    client: BooleansClient,
    id: String,
    cache: Cache,
}

impl ReadOnlyBool {
    /// Handle for `id`, optionally seeded with a record so no fetch is needed
    /// before reading. A record for a different id is rejected up front.
    pub fn new(
        client: BooleansClient,
        id: impl Into<String>,
        initial_data: Option<BoolRecord>,
    ) -> Result<Self> {
        let mut handle = Self::unloaded(client, id.into());
        if let Some(record) = initial_data {
            handle.store(record)?;
        }
        Ok(handle)
    }

    pub(crate) fn unloaded(client: BooleansClient, id: String) -> Self {
        Self {
            client,
            id,
            cache: Cache::Unloaded,
        }
    }

    /// Reload the record from the server. On failure the cache is untouched.
    pub async fn fetch(&mut self) -> Result<()> {
        let req = self.client.build_get_boolean(&self.id)?;
        let record = self.client.parse_record(self.client.call(req).await?)?;
        self.store(record)?;
        debug!(id = %self.id, "fetched boolean");
        Ok(())
    }

    fn store(&mut self, record: BoolRecord) -> Result<()> {
        if record.id != self.id {
            return Err(ApiError::IdMismatch {
                expected: self.id.clone(),
                found: record.id,
            });
        }
        self.cache = Cache::Loaded(record);
        Ok(())
    }
}

impl BoolFields for ReadOnlyBool {
    fn id(&self) -> &str {
        &self.id
    }

    fn record(&self) -> Result<&BoolRecord> {
        match &self.cache {
            Cache::Loaded(record) => Ok(record),
            Cache::Unloaded => Err(ApiError::NotFetched),
        }
    }
}

/// Handle that can also update, toggle and destroy a boolean, authorised by
/// the token it was built with.
#[derive(Debug, Clone)]
pub struct ReadWriteBool {
    inner: ReadOnlyBool,
    token: String,
}

impl ReadWriteBool {
    pub fn new(
        client: BooleansClient,
        id: impl Into<String>,
        token: impl Into<String>,
        initial_data: Option<BoolRecord>,
    ) -> Result<Self> {
        Ok(Self {
            inner: ReadOnlyBool::new(client, id, initial_data)?,
            token: token.into(),
        })
    }

    pub(crate) fn unloaded(client: BooleansClient, id: String, token: String) -> Self {
        Self {
            inner: ReadOnlyBool::unloaded(client, id),
            token,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn as_read_only(&self) -> &ReadOnlyBool {
        &self.inner
    }

    /// Drop write access, keeping the cache.
    pub fn into_read_only(self) -> ReadOnlyBool {
        self.inner
    }

    pub async fn fetch(&mut self) -> Result<()> {
        self.inner.fetch().await
    }

    /// Apply the fields set in `partial` and cache the record the server
    /// returns. On failure the cache is untouched.
    pub async fn update(&mut self, partial: &BoolInit) -> Result<()> {
        let client = &self.inner.client;
        let req = client.build_update_boolean(&self.inner.id, &self.token, partial)?;
        let record = client.parse_record(client.call(req).await?)?;
        self.inner.store(record)?;
        debug!(id = %self.inner.id, "updated boolean");
        Ok(())
    }

    /// Flip the cached value. Requires a loaded cache.
    pub async fn toggle(&mut self) -> Result<()> {
        let value = self.value()?;
        self.update(&BoolInit::value(!value)).await
    }

    /// Delete the boolean on the server. The cache is cleared whatever the
    /// outcome; a second call reaches the server again and fails there.
    pub async fn destroy(&mut self) -> Result<()> {
        let outcome = self.send_delete().await;
        self.inner.cache = Cache::Unloaded;
        if outcome.is_ok() {
            info!(id = %self.inner.id, "destroyed boolean");
        }
        outcome
    }

    async fn send_delete(&self) -> Result<()> {
        let client = &self.inner.client;
        let req = client.build_delete_boolean(&self.inner.id, &self.token)?;
        client.parse_empty(client.call(req).await?)
    }
}

impl BoolFields for ReadWriteBool {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn record(&self) -> Result<&BoolRecord> {
        self.inner.record()
    }
}
