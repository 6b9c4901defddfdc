#![doc = include_str!("../README.md")]

//! Pluggable repository transports: scheme-selected `file`/`http(s)`/
//! `pkg+http(s)`/`ssh`/`pkg+ssh`/`tcp`, common `FetchItem`/`FetchOutcome` contract, SRV/HTTP
//! mirror discovery, and environment-driven [`FetchSettings`].

mod endpoint;
mod error;
mod file;
mod http;
mod item;
mod line_protocol;
mod mirror;
mod outcome;
mod progress;
mod settings;
mod ssh;
mod tcp;
mod throttle;

use std::io::Write;

use log::debug;
use log::warn;

pub use endpoint::MirrorType;
pub use endpoint::RepoEndpoint;
pub use endpoint::Scheme;
pub use error::Error;
pub use item::FetchItem;
pub use mirror::SrvTarget;
pub use mirror::discover_srv;
pub use mirror::parse_http_mirror_list;
pub use outcome::FetchOutcome;
pub use progress::CancelableWriter;
pub use progress::no_progress;
pub use settings::FetchSettings;

/// Fetches `item` from `endpoint`, dispatching on URL scheme and retrying across mirrors up to
/// `settings.fetch_retry` times.
///
/// `on_progress` is called with the cumulative byte count after each chunk written to `dest`;
/// returning `false` aborts the in-progress attempt and yields [`FetchOutcome::Cancel`] without
/// falling through to the next mirror.
///
/// # Errors
///
/// Returns [`Error::UnsupportedScheme`]/[`Error::MalformedUrl`] if `endpoint.base_url` doesn't
/// parse, or whatever the selected transport reports for a fatal (non-retriable) failure.
pub fn fetch(
    endpoint: &RepoEndpoint,
    item: &FetchItem,
    settings: &FetchSettings,
    dest: &mut impl Write,
    on_progress: &mut dyn FnMut(u64) -> bool,
) -> Result<FetchOutcome, Error> {
    let candidates = candidate_urls(endpoint)?;
    let attempts = (settings.fetch_retry.max(1) as usize).max(candidates.len());

    let mut last_outcome = FetchOutcome::NoNetwork;
    for (attempt, url) in candidates.iter().cycle().take(attempts).enumerate() {
        debug!("fetch attempt {attempt} for {} via {url}", item.relpath);
        let mut wrapped = CancelableWriter::new(&mut *dest, &mut *on_progress);
        match fetch_one(url, item, settings, &mut wrapped) {
            Ok(outcome @ (FetchOutcome::Ok | FetchOutcome::UpToDate | FetchOutcome::NotFound)) => return Ok(outcome),
            Ok(outcome) => last_outcome = outcome,
            Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::Interrupted => {
                return Ok(FetchOutcome::Cancel);
            }
            Err(error) => {
                warn!("fetch attempt {attempt} via {url} failed: {error}");
                last_outcome = FetchOutcome::Fatal;
            }
        }
    }
    Ok(last_outcome)
}

fn candidate_urls(endpoint: &RepoEndpoint) -> Result<Vec<String>, Error> {
    let scheme = Scheme::parse(&endpoint.base_url)?;
    if !scheme.requires_srv_discovery() && endpoint.mirror_type == MirrorType::None {
        return Ok(vec![endpoint.base_url.clone()]);
    }
    if !endpoint.srv_mirrors.is_empty() {
        return Ok(endpoint.srv_mirrors.clone());
    }
    if !endpoint.http_mirrors.is_empty() {
        return Ok(endpoint.http_mirrors.clone());
    }
    Ok(vec![endpoint.base_url.clone()])
}

fn fetch_one(url: &str, item: &FetchItem, settings: &FetchSettings, dest: &mut impl Write) -> Result<FetchOutcome, Error> {
    let scheme = Scheme::parse(url)?;
    match scheme {
        Scheme::File => {
            let path = url.strip_prefix("file://").unwrap_or(url);
            file::fetch_file(std::path::Path::new(path), item, dest)
        }
        Scheme::Http | Scheme::Https | Scheme::PkgHttp | Scheme::PkgHttps => {
            let full_url = format!("{}/{}", url.trim_end_matches('/'), item.relpath);
            http::fetch_http(&full_url, item, settings, dest)
        }
        Scheme::Ssh | Scheme::PkgSsh => {
            let (host, port) = parse_host_port(url)?;
            ssh::fetch_ssh(&host, port, item, dest)
        }
        Scheme::Tcp => {
            let (host, port) = parse_host_port(url)?;
            let port = port.ok_or_else(|| Error::MalformedUrl { url: url.to_string() })?;
            tcp::fetch_tcp(&host, port, item, settings.fetch_timeout, dest)
        }
    }
}

fn parse_host_port(url: &str) -> Result<(String, Option<u16>), Error> {
    let parsed = url::Url::parse(url).map_err(|_| Error::MalformedUrl { url: url.to_string() })?;
    let host = parsed.host_str().ok_or_else(|| Error::MalformedUrl { url: url.to_string() })?.to_string();
    Ok((host, parsed.port()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn fetches_a_local_file_endpoint() -> TestResult {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("pkg.tzst"), b"data")?;
        let endpoint = RepoEndpoint::new(format!("file://{}", dir.path().display()), MirrorType::None);
        let settings = FetchSettings::from_env();
        let mut dest = Vec::new();
        let outcome = fetch(&endpoint, &FetchItem::new("pkg.tzst"), &settings, &mut dest, &mut no_progress())?;
        assert_eq!(outcome, FetchOutcome::Ok);
        assert_eq!(dest, b"data");
        Ok(())
    }

    #[test]
    fn candidate_urls_fall_back_to_base_when_no_mirrors_are_configured() -> TestResult {
        let endpoint = RepoEndpoint::new("https://example.org/repo", MirrorType::Srv);
        assert_eq!(candidate_urls(&endpoint)?, vec!["https://example.org/repo".to_string()]);
        Ok(())
    }
}
