//! Error handling.

/// An error that can occur while fetching a resource from a repository.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error while reading or writing a fetch destination.
    #[error("I/O error while {context}: {source}")]
    Io {
        /// The context in which the error occurred.
        context: &'static str,
        /// The source error.
        source: std::io::Error,
    },

    /// The URL scheme is not one any registered transport understands.
    #[error("unsupported URL scheme {scheme:?} in {url}")]
    UnsupportedScheme {
        /// The offending scheme.
        scheme: String,
        /// The full URL it was parsed from.
        url: String,
    },

    /// A URL could not be parsed into scheme/host/path components.
    #[error("malformed URL: {url}")]
    MalformedUrl {
        /// The offending URL.
        url: String,
    },

    /// The underlying HTTP client reported an error.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// DNS SRV record discovery failed.
    #[error("SRV discovery failed for {name}: {source}")]
    SrvDiscovery {
        /// The `_scheme._tcp.host` name that was queried.
        name: String,
        /// The source error.
        source: hickory_resolver::ResolveError,
    },

    /// No mirror (SRV target or HTTP mirror) could be reached.
    #[error("all {attempted} mirror(s) failed for {item}")]
    AllMirrorsFailed {
        /// How many mirrors were attempted.
        attempted: usize,
        /// The relative item path being fetched.
        item: String,
    },

    /// The line-protocol transport (SSH/TCP) received a malformed reply.
    #[error("malformed line-protocol reply from {transport}: {line:?}")]
    MalformedReply {
        /// Which transport (`ssh` or `tcp`) produced the reply.
        transport: &'static str,
        /// The offending line.
        line: String,
    },

    /// The remote line-protocol transport reported `ko:`.
    #[error("remote fetch of {item} failed (transport reported an error)")]
    RemoteError {
        /// The relative item path being fetched.
        item: String,
    },

    /// Spawning the `ssh` subprocess failed.
    #[error("failed to spawn ssh transport: {0}")]
    SpawnSsh(#[source] std::io::Error),

    /// A fetch operation exceeded `FETCH_TIMEOUT` or fell below the low-speed floor.
    #[error("fetch of {item} timed out")]
    Timeout {
        /// The relative item path being fetched.
        item: String,
    },
}

impl Error {
    /// Builds an [`Error::Io`] with the given context.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}
