//! HTTP response types

use serde::de::DeserializeOwned;

use crate::error::{HttpError, RequestError};

/// HTTP Response type - generic over the body type R and error type E
/// This is the primary return type for all requester operations
pub type Response<R, E = RequestError> = Result<R, E>;

/// Decode a JSON body into an owned value
pub(crate) fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R, HttpError> {
    serde_json::from_slice(body).map_err(HttpError::Decode)
}

/// Decode a JSON body into `destination`, which is left untouched on failure
pub(crate) fn decode_into<R: DeserializeOwned>(
    body: &[u8],
    destination: &mut R,
) -> Result<(), HttpError> {
    *destination = decode(body)?;
    Ok(())
}
