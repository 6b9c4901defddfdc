//! The HTTP(S) transport: a `reqwest::blocking::Client` stands in for libcurl's multi handle
//! (one connection per host, follows redirects, throttle-kill via
//! low-speed timeout, conditional `If-Modified-Since` GET).

use std::io::Write;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::IF_MODIFIED_SINCE;
use reqwest::header::LAST_MODIFIED;

use crate::Error;
use crate::FetchItem;
use crate::FetchOutcome;
use crate::FetchSettings;
use crate::throttle::ThrottledReader;

/// Builds a [`Client`] honoring the proxy, TLS, and user-agent settings `settings` carries.
fn build_client(settings: &FetchSettings) -> Result<Client, Error> {
    let mut builder = Client::builder()
        .timeout(settings.fetch_timeout)
        .user_agent(settings.http_user_agent.clone().unwrap_or_else(|| format!("pkgcore/{}", env!("CARGO_PKG_VERSION"))))
        .danger_accept_invalid_certs(settings.ssl_no_verify_peer);

    if let Some(proxy_url) = &settings.http_proxy {
        let mut proxy = reqwest::Proxy::all(proxy_url)?;
        if let Some(auth) = &settings.http_proxy_auth {
            if let Some((user, pass)) = auth.split_once(':') {
                proxy = proxy.basic_auth(user, pass);
            }
        }
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Fetches `url` into `dest`, honoring `item.mtime` as a conditional `If-Modified-Since` GET.
///
/// # Errors
///
/// Returns [`Error::Http`] for transport failures the caller should treat as fatal; network-
/// unreachable and timeout conditions are instead reported as their matching [`FetchOutcome`]
/// variant so retry/mirror-cycling logic in [`crate::fetch`] can act on them.
pub fn fetch_http(url: &str, item: &FetchItem, settings: &FetchSettings, dest: &mut impl Write) -> Result<FetchOutcome, Error> {
    let client = build_client(settings)?;
    let mut request = client.get(url);
    if let Some(mtime) = item.mtime {
        if let Some(date) = DateTime::<Utc>::from_timestamp(mtime, 0) {
            request = request.header(IF_MODIFIED_SINCE, date.to_rfc2822());
        }
    }

    debug!("GET {url}");
    let response = match request.send() {
        Ok(response) => response,
        Err(source) if source.is_connect() => return Ok(FetchOutcome::NoNetwork),
        Err(source) if source.is_timeout() => return Err(Error::Timeout { item: item.relpath.clone() }),
        Err(source) => return Err(Error::Http(source)),
    };

    match response.status() {
        StatusCode::NOT_MODIFIED => Ok(FetchOutcome::UpToDate),
        StatusCode::NOT_FOUND => Ok(FetchOutcome::NotFound),
        status if status.is_success() => {
            let reader = ThrottledReader::new(
                response,
                settings.low_speed_floor_bytes_per_sec(),
                Duration::from_secs(settings.fetch_timeout.as_secs().max(1)),
            );
            copy_body(reader, dest, &item.relpath)
        }
        status => {
            debug!("unexpected status {status} fetching {url}");
            Ok(FetchOutcome::Fatal)
        }
    }
}

fn copy_body(mut reader: impl std::io::Read, dest: &mut impl Write, item: &str) -> Result<FetchOutcome, Error> {
    match std::io::copy(&mut reader, dest) {
        Ok(_) => Ok(FetchOutcome::Ok),
        Err(source) if source.kind() == std::io::ErrorKind::TimedOut => Err(Error::Timeout { item: item.to_string() }),
        Err(source) => Err(Error::io("streaming HTTP response body", source)),
    }
}

/// Extracts the `Last-Modified` response header as a Unix timestamp, if present and parseable.
pub fn response_mtime(headers: &reqwest::header::HeaderMap) -> Option<i64> {
    let value = headers.get(LAST_MODIFIED)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(value).ok().map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_client_without_proxy() {
        let settings = FetchSettings::from_env();
        assert!(build_client(&settings).is_ok());
    }
}
