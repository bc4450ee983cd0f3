//! Client settings loadable from an embedding program's configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings used to build an [`HttpClient`](crate::HttpClient)
///
/// Every field is optional so a partial section in a config file only changes
/// what it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Proxy URL for outgoing requests
    pub proxy: Option<url::Url>,
    /// Only requests whose host matches this regex go through the proxy
    pub proxy_matcher: Option<String>,
    /// Client-wide timeout in seconds, overridden per request by `HttpOptions::timeout`
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header sent with every request
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Client-wide timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
