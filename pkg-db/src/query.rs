//! Query selectors (`pkgdb_query(pattern, match_mode)`).

use glob::Pattern as GlobPattern;

use crate::Error;

/// How a query pattern is evaluated against a package's name.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MatchMode {
    /// Every registered package matches, `pattern` is ignored.
    All,
    /// `pattern` matches a package's internal name exactly (spec: `internal` = "exact name").
    #[default]
    Internal,
    /// `pattern` matches a package's name, origin, *or* a selector's rewritten field exactly.
    Exact,
    /// `pattern` is a shell glob.
    Glob,
    /// `pattern` is a regular expression.
    ///
    /// This reference implementation does not link a regex engine; callers needing true regex
    /// matching should pre-compile their own `regex::Regex` and drive
    /// [`crate::PackageDatabase::query`] with
    /// [`MatchMode::All`], filtering the result themselves.
    Regex,
}

/// A parsed `origin/flavor@variant` selector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selector {
    /// The base name or origin being queried.
    pub origin: String,
    /// The flavor qualifier, if present (the `/flavor` suffix).
    pub flavor: Option<String>,
    /// The variant qualifier, if present (the `@variant` suffix).
    pub variant: Option<String>,
}

impl Selector {
    /// Parses `origin/flavor@variant`, `origin/flavor`, `origin@variant`, or a bare `origin`.
    pub fn parse(raw: &str) -> Self {
        let (rest, variant) = match raw.split_once('@') {
            Some((rest, variant)) => (rest, Some(variant.to_string())),
            None => (raw, None),
        };
        let (origin, flavor) = match rest.split_once('/') {
            Some((origin, flavor)) => (origin.to_string(), Some(flavor.to_string())),
            None => (rest.to_string(), None),
        };
        Selector { origin, flavor, variant }
    }
}

/// Returns whether `name` matches `pattern` under `mode`, case-sensitively or not per
/// `case_sensitive`.
pub fn matches(mode: MatchMode, pattern: &str, name: &str, case_sensitive: bool) -> Result<bool, Error> {
    let selector = Selector::parse(pattern);
    let candidate = selector.origin.as_str();
    match mode {
        MatchMode::All => Ok(true),
        MatchMode::Internal | MatchMode::Exact => Ok(eq(candidate, name, case_sensitive)),
        MatchMode::Glob => {
            let compiled = GlobPattern::new(candidate).map_err(|source| Error::InvalidPattern {
                mode: "glob",
                pattern: pattern.to_string(),
                context: source.to_string(),
            })?;
            Ok(if case_sensitive {
                compiled.matches(name)
            } else {
                compiled.matches(&name.to_lowercase()) || compiled.matches(name)
            })
        }
        MatchMode::Regex => Err(Error::InvalidPattern {
            mode: "regex",
            pattern: pattern.to_string(),
            context: "this reference PackageDatabase does not link a regex engine; filter \
                      MatchMode::All results with your own regex::Regex instead"
                .to_string(),
        }),
    }
}

fn eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive { a == b } else { a.eq_ignore_ascii_case(b) }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("zlib", "zlib", None, None)]
    #[case("zlib/static", "zlib", Some("static"), None)]
    #[case("zlib@1.3", "zlib", None, Some("1.3"))]
    #[case("zlib/static@1.3", "zlib", Some("static"), Some("1.3"))]
    fn selector_parses_origin_flavor_variant(
        #[case] raw: &str,
        #[case] origin: &str,
        #[case] flavor: Option<&str>,
        #[case] variant: Option<&str>,
    ) {
        let selector = Selector::parse(raw);
        assert_eq!(selector.origin, origin);
        assert_eq!(selector.flavor.as_deref(), flavor);
        assert_eq!(selector.variant.as_deref(), variant);
    }

    #[rstest]
    fn glob_mode_matches_shell_patterns() -> Result<(), Error> {
        assert!(matches(MatchMode::Glob, "lib*", "libfoo", true)?);
        assert!(!matches(MatchMode::Glob, "lib*", "appfoo", true)?);
        Ok(())
    }

    #[rstest]
    fn internal_mode_is_exact_and_case_sensitive_by_default() -> Result<(), Error> {
        assert!(matches(MatchMode::Internal, "zlib", "zlib", true)?);
        assert!(!matches(MatchMode::Internal, "ZLib", "zlib", true)?);
        assert!(matches(MatchMode::Internal, "ZLib", "zlib", false)?);
        Ok(())
    }

    #[rstest]
    fn all_mode_ignores_pattern() -> Result<(), Error> {
        assert!(matches(MatchMode::All, "anything", "zlib", true)?);
        Ok(())
    }

    #[rstest]
    fn regex_mode_is_refused() {
        assert!(matches(MatchMode::Regex, ".*", "zlib", true).is_err());
    }
}
