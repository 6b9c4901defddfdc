//! Repository endpoint configuration: base URL, scheme, and mirror discovery mode.

/// How a repository's alternate mirrors are discovered.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum MirrorType {
    /// No mirror discovery; `base_url` is the only endpoint.
    #[default]
    None,
    /// DNS SRV discovery under `_scheme._tcp.<host>`.
    Srv,
    /// HTTP mirror discovery: a GET of the repository root yields `URL: <url>` lines.
    Http,
}

/// A repository's fetch endpoint.
#[derive(Clone, Debug)]
pub struct RepoEndpoint {
    /// The configured base URL, e.g. `pkg+https://example.org/repo`.
    pub base_url: String,
    /// How alternate mirrors are discovered, if at all.
    pub mirror_type: MirrorType,
    /// Explicitly configured SRV mirrors (`repo.srv` in spec terms); bypasses discovery when
    /// non-empty.
    pub srv_mirrors: Vec<String>,
    /// Explicitly configured HTTP mirrors (`repo.http` in spec terms); bypasses discovery when
    /// non-empty.
    pub http_mirrors: Vec<String>,
}

impl RepoEndpoint {
    /// Creates an endpoint with no configured mirrors (mirror discovery, if enabled, runs on
    /// first fetch failure).
    pub fn new(base_url: impl Into<String>, mirror_type: MirrorType) -> Self {
        Self {
            base_url: base_url.into(),
            mirror_type,
            srv_mirrors: Vec::new(),
            http_mirrors: Vec::new(),
        }
    }
}

impl From<&pkg_types::Repository> for RepoEndpoint {
    /// Projects a configured [`pkg_types::Repository`] onto the narrower endpoint shape this
    /// crate's transports consume. `pkg_types::Repository` carries no explicit SRV/HTTP mirror
    /// list (those are server-discovered, not stored config), so both start empty here.
    fn from(repository: &pkg_types::Repository) -> Self {
        let mirror_type = match repository.mirror_type {
            pkg_types::MirrorType::None => MirrorType::None,
            pkg_types::MirrorType::Srv => MirrorType::Srv,
            pkg_types::MirrorType::Http => MirrorType::Http,
        };
        Self::new(repository.url.to_string(), mirror_type)
    }
}

#[cfg(test)]
mod repository_tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn converts_from_a_configured_repository() {
        let repo = pkg_types::Repository::new("example".to_string(), pkg_types::Url::from_str("https://example.org/repo").unwrap());
        let endpoint = RepoEndpoint::from(&repo);
        assert_eq!(endpoint.base_url, "https://example.org/repo");
        assert_eq!(endpoint.mirror_type, MirrorType::None);
    }
}

/// The scheme-derived parts of a repository URL.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scheme {
    /// A path on the local filesystem.
    File,
    /// Plain HTTP.
    Http,
    /// HTTPS.
    Https,
    /// HTTP with mandatory SRV mirror discovery semantics.
    PkgHttp,
    /// HTTPS with mandatory SRV mirror discovery semantics.
    PkgHttps,
    /// SSH line protocol.
    Ssh,
    /// SSH line protocol with mandatory SRV mirror discovery semantics.
    PkgSsh,
    /// Raw TCP line protocol.
    Tcp,
}

impl Scheme {
    /// Parses the scheme prefix (`scheme://...`) of a URL.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedUrl`] if no `://` separator is present, or
    /// [`crate::Error::UnsupportedScheme`] if the scheme is not one any transport understands.
    pub fn parse(url: &str) -> Result<Self, crate::Error> {
        let Some((scheme, _rest)) = url.split_once("://") else {
            return Err(crate::Error::MalformedUrl { url: url.to_string() });
        };
        match scheme {
            "file" => Ok(Scheme::File),
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            "pkg+http" => Ok(Scheme::PkgHttp),
            "pkg+https" => Ok(Scheme::PkgHttps),
            "ssh" => Ok(Scheme::Ssh),
            "pkg+ssh" => Ok(Scheme::PkgSsh),
            "tcp" => Ok(Scheme::Tcp),
            other => {
                Err(crate::Error::UnsupportedScheme { scheme: other.to_string(), url: url.to_string() })
            }
        }
    }

    /// Whether this scheme mandates SRV mirror discovery regardless of the endpoint's
    /// configured [`MirrorType`].
    pub fn requires_srv_discovery(self) -> bool {
        matches!(self, Scheme::PkgHttp | Scheme::PkgHttps | Scheme::PkgSsh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_schemes() {
        assert_eq!(Scheme::parse("https://example.org/repo").unwrap(), Scheme::Https);
        assert_eq!(Scheme::parse("pkg+https://example.org/repo").unwrap(), Scheme::PkgHttps);
        assert_eq!(Scheme::parse("tcp://example.org:8080").unwrap(), Scheme::Tcp);
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(matches!(
            Scheme::parse("ftp://example.org"),
            Err(crate::Error::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(matches!(Scheme::parse("not-a-url"), Err(crate::Error::MalformedUrl { .. })));
    }

    #[test]
    fn pkg_prefixed_schemes_require_srv_discovery() {
        assert!(Scheme::PkgHttps.requires_srv_discovery());
        assert!(!Scheme::Https.requires_srv_discovery());
    }
}
