//! Environment-variable configuration surface for fetch transports.
//!
//! This is the documented ambient environment-variable contract, not the excluded
//! "configuration file loading": every field here is read once from the process environment.

use std::time::Duration;

/// Settings every transport honors, read once from the process environment.
#[derive(Clone, Debug, Default)]
pub struct FetchSettings {
    /// `HTTP_PROXY`: proxy URL used for `http://` and `https://` requests.
    pub http_proxy: Option<String>,
    /// `HTTP_PROXY_AUTH`: `username:password` credentials for the configured proxy.
    pub http_proxy_auth: Option<String>,
    /// `SSL_NO_VERIFY_PEER`: disables TLS certificate chain validation.
    pub ssl_no_verify_peer: bool,
    /// `SSL_NO_VERIFY_HOSTNAME`: disables TLS hostname verification.
    pub ssl_no_verify_hostname: bool,
    /// `SSL_CLIENT_KEY_FILE`: path to a client TLS private key for mutual TLS.
    pub ssl_client_key_file: Option<String>,
    /// `SSL_CLIENT_CERT_FILE`: path to a client TLS certificate for mutual TLS.
    pub ssl_client_cert_file: Option<String>,
    /// `SSL_CA_CERT_FILE`: path to an additional CA bundle file.
    pub ssl_ca_cert_file: Option<String>,
    /// `SSL_CA_CERT_PATH`: path to an additional CA bundle directory.
    pub ssl_ca_cert_path: Option<String>,
    /// `NETRC`: path to a netrc file supplying HTTP basic-auth credentials.
    pub netrc: Option<String>,
    /// `HTTP_USER_AGENT`: overrides the default `pkgcore/<version>` user agent.
    pub http_user_agent: Option<String>,
    /// `FETCH_TIMEOUT`: seconds of inactivity (or sustained sub-2KiB/s throughput) before a
    /// fetch is aborted.
    pub fetch_timeout: Duration,
    /// `FETCH_RETRY`: number of retries (cycling through SRV/HTTP mirrors) before giving up.
    pub fetch_retry: u32,
}

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FETCH_RETRY: u32 = 3;

impl FetchSettings {
    /// Reads settings from the process environment, falling back to spec defaults for any
    /// variable that is unset or fails to parse.
    pub fn from_env() -> Self {
        Self {
            http_proxy: env_string("HTTP_PROXY"),
            http_proxy_auth: env_string("HTTP_PROXY_AUTH"),
            ssl_no_verify_peer: env_flag("SSL_NO_VERIFY_PEER"),
            ssl_no_verify_hostname: env_flag("SSL_NO_VERIFY_HOSTNAME"),
            ssl_client_key_file: env_string("SSL_CLIENT_KEY_FILE"),
            ssl_client_cert_file: env_string("SSL_CLIENT_CERT_FILE"),
            ssl_ca_cert_file: env_string("SSL_CA_CERT_FILE"),
            ssl_ca_cert_path: env_string("SSL_CA_CERT_PATH"),
            netrc: env_string("NETRC"),
            http_user_agent: env_string("HTTP_USER_AGENT"),
            fetch_timeout: Duration::from_secs(
                env_string("FETCH_TIMEOUT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
            fetch_retry: env_string("FETCH_RETRY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_FETCH_RETRY),
        }
    }

    /// The low-speed floor (2 KiB/s) used to throttle-kill a stalled HTTP transfer.
    pub fn low_speed_floor_bytes_per_sec(&self) -> u64 {
        2 * 1024
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_flag(name: &str) -> bool {
    matches!(std::env::var(name).as_deref(), Ok("1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_is_unset() {
        let settings = FetchSettings {
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            fetch_retry: DEFAULT_FETCH_RETRY,
            ..Default::default()
        };
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
        assert_eq!(settings.fetch_retry, 3);
        assert_eq!(settings.low_speed_floor_bytes_per_sec(), 2048);
    }
}
