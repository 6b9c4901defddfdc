//! Internal helper macros.

/// A convenient way to create a regular expression only once.
///
/// A string literal as input is used to define the regular expression.
/// With the help of `OnceLock` the regular expression is created only once.
macro_rules! regex_once {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

pub(crate) use regex_once;
