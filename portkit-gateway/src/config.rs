//! Gateway configuration read from the environment.

use std::{fmt, str::FromStr, time::Duration};

use portkit_http::HttpConfig;

/// Address the gateway listens on when `PORTKIT_LISTEN_ADDR` is unset.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3456";

/// Runtime configuration for the gateway binary.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Socket address to bind, e.g. `"0.0.0.0:8080"`.
    pub listen_addr: String,

    /// Transport limits applied to every route.
    pub http: HttpConfig,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    ///
    /// - `PORTKIT_LISTEN_ADDR`: bind address (default `127.0.0.1:3456`)
    /// - `PORTKIT_MAX_BODY_BYTES`: request body limit in bytes
    /// - `PORTKIT_REQUEST_TIMEOUT_MS`: per-request deadline in milliseconds
    ///
    /// Unparseable numeric values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let listen_addr = lookup("PORTKIT_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());

        let mut http = HttpConfig::new();
        if let Some(bytes) = parse_var::<usize>(&lookup, "PORTKIT_MAX_BODY_BYTES") {
            http = http.with_max_body_bytes(bytes);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "PORTKIT_REQUEST_TIMEOUT_MS") {
            http = http.with_request_timeout(Duration::from_millis(ms));
        }

        Self { listen_addr, http }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid config value");
            None
        }
    }
}
