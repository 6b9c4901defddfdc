//! Error handling.

use std::path::PathBuf;

/// An error that can occur when parsing or expanding a packing list.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A line could not be tokenized (e.g. an unterminated quote).
    #[error("line {line}: {context}")]
    Syntax {
        /// 1-based line number in the packing list.
        line: usize,
        /// What went wrong.
        context: String,
    },

    /// A `@keyword` directive named a keyword with no built-in handler and no definition file.
    #[error("line {line}: unknown keyword '{keyword}', and no definition at {path}")]
    UnknownKeyword {
        /// 1-based line number.
        line: usize,
        /// The keyword name, without the leading `@`.
        keyword: String,
        /// Where a `<keyword>.ucl` definition was looked for.
        path: PathBuf,
    },

    /// A keyword definition file failed to parse as JSON.
    #[error("keyword definition {path} is not valid JSON: {source}")]
    DefinitionJson {
        /// The definition file's path.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// A keyword definition file failed schema validation.
    #[error("keyword definition {path} does not match the expected schema: {context}")]
    DefinitionSchema {
        /// The definition file's path.
        path: PathBuf,
        /// The validation failure, rendered as text.
        context: String,
    },

    /// An action in a keyword definition referenced an argument index that the invocation did
    /// not supply.
    #[error("line {line}: keyword '{keyword}' action '{action}' references argument {index}, but only {supplied} were given")]
    MissingArgument {
        /// 1-based line number.
        line: usize,
        /// The keyword being expanded.
        keyword: String,
        /// The action name.
        action: String,
        /// The 1-based argument index that was missing.
        index: usize,
        /// How many arguments were actually supplied.
        supplied: usize,
    },

    /// An `@include` directive formed a cycle.
    #[error("include cycle detected: {path} is already being processed")]
    IncludeCycle {
        /// The path that would have been included a second time.
        path: PathBuf,
    },

    /// An I/O error occurred while reading a packing list or keyword definition.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An error from the underlying package data model.
    #[error(transparent)]
    Package(#[from] pkg_types::Error),
}
