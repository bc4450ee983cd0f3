//! Endpoint URL validation

use url::Url;

use crate::error::HttpError;

/// Parse `raw` and require both a scheme and a host
///
/// A missing scheme already fails to parse as a relative URL without a base,
/// so only the host needs checking afterwards. Returns the parsed URL, whose
/// `as_str()` is the canonical form.
pub fn validate_url(raw: &str) -> Result<Url, HttpError> {
    let invalid = |reason: String| HttpError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid("missing host".to_string())),
    }
}
