//! Generic JSON HTTP requester
//!
//! This crate wraps a single long-lived `reqwest` client behind four methods,
//! GET/POST/PUT/DELETE. Each one validates the URL, builds the request from
//! [`HttpOptions`] (headers, optional JSON body, optional timeout), sends it
//! and reads the whole body. GET can decode the body into a caller-owned
//! destination; the others hand back the raw bytes.
//!
//! Every failure is a [`RequestError`] tagged with the operation and the
//! status code received so far, wrapping the [`HttpError`] that caused it.
//!
//! # Example
//!
//! ```no_run
//! use serde::Deserialize;
//! use thor::{CancellationToken, HttpClient, HttpOptions, RequestError};
//!
//! #[derive(Default, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! async fn example(client: &HttpClient) -> Result<String, RequestError> {
//!     let ctx = CancellationToken::new();
//!     let mut user = User::default();
//!     let options = HttpOptions::new("https://api.example.com/users/1")
//!         .header("Authorization", "Bearer token");
//!     client.get(&ctx, Some(&mut user), options).await?;
//!     Ok(user.name)
//! }
//! ```

mod client;
mod config;
mod endpoint;
mod error;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder, Requester};
pub use config::ClientConfig;
pub use endpoint::validate_url;
pub use error::{ErrorKind, HttpError, NetworkError, Operation, RequestError};
pub use request::HttpOptions;
pub use response::Response;
pub use tokio_util::sync::CancellationToken;
