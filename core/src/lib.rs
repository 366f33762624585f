//! Async client for the booleans API.
//!
//! # Overview
//! Creates, fetches, updates, toggles and deletes remote booleans. Reading
//! needs nothing; mutating needs a token from `BooleansClient::create_token`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), booleans_core::ApiError> {
//! use booleans_core::{BoolFields, BoolInit, BooleansClient};
//!
//! let client = BooleansClient::from_env()?;
//! let token = client.create_token().await?;
//! let mut flag = client
//!     .create_boolean(&token, Some(&BoolInit::value(true).with_label("lights")))
//!     .await?;
//! flag.toggle().await?;
//! assert!(!flag.value()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `BooleansClient` splits every endpoint into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`); the only I/O
//!   goes through the `Transport` trait, with `ReqwestTransport` as default.
//! - Handles cache the last record they saw and refuse to read fields until
//!   something has been cached. There are no retries and no background work.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod handle;
pub mod http;
pub mod transport;
pub mod types;

pub use client::BooleansClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use handle::{BoolFields, ReadOnlyBool, ReadWriteBool};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use transport::ReqwestTransport;
pub use types::{BoolInit, BoolRecord, TokenResponse};
