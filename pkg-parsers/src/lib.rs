//! Shared parsing helpers used across the `pkgcore` format parsers.

pub mod custom_ini;
pub mod traits;

/// Builds a [`winnow::error::StrContext`] iterator of expected-value labels from a slice of
/// static strings, typically an enum's `strum::VariantNames::VARIANTS`.
///
/// Used to attach the full set of accepted values to a parser's error context so that
/// `cut_err` failures report something actionable (`expected one of: ...`) instead of a bare
/// parse failure.
///
/// ## Examples
/// ```
/// use pkg_parsers::iter_str_context;
/// use winnow::error::StrContext;
///
/// let variants = ["a", "b", "c"];
/// let contexts: Vec<StrContext> = iter_str_context!([variants]).collect();
/// assert_eq!(contexts.len(), 3);
/// ```
#[macro_export]
macro_rules! iter_str_context {
    ([$($slice:expr),+ $(,)?]) => {{
        std::iter::empty()
            $(.chain($slice.iter().map(|s: &'static str| {
                winnow::error::StrContext::Expected(winnow::error::StrContextValue::StringLiteral(s))
            })))+
    }};
}
