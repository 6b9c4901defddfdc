//! `<keyword_dir>/<keyword>.ucl` definitions for unrecognized `@keyword` directives.
//!
//! A definition is a small declarative document describing which built-in actions an invocation
//! expands to, which attributes it sets, and which scripts/messages it attaches. As with
//! [`pkg_manifest`](../pkg_manifest), the document is modeled as JSON (UCL's grammar is a strict
//! superset of JSON's), validated against an embedded JSON Schema at first load and cached
//! thereafter.

use std::path::Path;
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;

/// The embedded JSON Schema a keyword definition must validate against.
const SCHEMA_JSON: &str = r#"{
    "type": "object",
    "properties": {
        "actions": { "type": "array", "items": { "type": "string" } },
        "attributes": {
            "type": "object",
            "properties": {
                "owner": { "type": "string" },
                "group": { "type": "string" },
                "mode": { "type": "string" }
            },
            "additionalProperties": false
        },
        "pre-install": { "type": "string" },
        "post-install": { "type": "string" },
        "pre-deinstall": { "type": "string" },
        "post-deinstall": { "type": "string" },
        "pre-install-lua": { "type": "string" },
        "post-install-lua": { "type": "string" },
        "pre-deinstall-lua": { "type": "string" },
        "post-deinstall-lua": { "type": "string" },
        "messages": {
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "message": { "type": "string" },
                    "type": { "type": "string" }
                },
                "required": ["message"]
            }
        },
        "prepackaging": { "type": "string" },
        "arguments": { "type": "boolean" },
        "preformat_arguments": { "type": "boolean" }
    },
    "additionalProperties": false
}"#;

fn schema() -> &'static Validator {
    static SCHEMA: OnceLock<Validator> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let value: serde_json::Value =
            serde_json::from_str(SCHEMA_JSON).expect("embedded keyword schema is valid JSON");
        jsonschema::validator_for(&value).expect("embedded keyword schema is a valid JSON Schema")
    })
}

/// The filesystem owner/group/mode a keyword's action table sets, overriding the packing list's
/// ambient `@owner`/`@group`/`@mode` context for entries this keyword produces.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct KeywordAttributes {
    /// Owning user name.
    pub owner: Option<String>,
    /// Owning group name.
    pub group: Option<String>,
    /// Permission bits, as an octal string (e.g. `"0755"`).
    pub mode: Option<String>,
}

/// A message attached by a keyword invocation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeywordMessage {
    /// The message text.
    pub message: String,
    /// The transaction phase this message applies to (`always`, `install`, `upgrade`, `remove`).
    #[serde(rename = "type")]
    pub message_type: Option<String>,
}

/// A parsed `<keyword>.ucl` definition.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct KeywordDefinition {
    /// The built-in actions this keyword expands to, e.g. `["dir", "setowner(2)"]`.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Attribute overrides applied to entries this keyword produces.
    pub attributes: Option<KeywordAttributes>,
    /// Shell pre-install script fragment contributed by this keyword.
    #[serde(rename = "pre-install")]
    pub pre_install: Option<String>,
    /// Shell post-install script fragment contributed by this keyword.
    #[serde(rename = "post-install")]
    pub post_install: Option<String>,
    /// Shell pre-deinstall script fragment contributed by this keyword.
    #[serde(rename = "pre-deinstall")]
    pub pre_deinstall: Option<String>,
    /// Shell post-deinstall script fragment contributed by this keyword.
    #[serde(rename = "post-deinstall")]
    pub post_deinstall: Option<String>,
    /// Lua pre-install script fragment.
    #[serde(rename = "pre-install-lua")]
    pub pre_install_lua: Option<String>,
    /// Lua post-install script fragment.
    #[serde(rename = "post-install-lua")]
    pub post_install_lua: Option<String>,
    /// Lua pre-deinstall script fragment.
    #[serde(rename = "pre-deinstall-lua")]
    pub pre_deinstall_lua: Option<String>,
    /// Lua post-deinstall script fragment.
    #[serde(rename = "post-deinstall-lua")]
    pub post_deinstall_lua: Option<String>,
    /// Messages to attach when this keyword is invoked.
    #[serde(default)]
    pub messages: Vec<KeywordMessage>,
    /// A Lua snippet run at packaging time (before archive creation), not at install time.
    pub prepackaging: Option<String>,
    /// If `true`, tokenize the directive's remainder into `$1..$n` for action argument lookup.
    #[serde(default)]
    pub arguments: bool,
    /// If `true`, apply shell-style pre-formatting to tokenized arguments before substitution.
    #[serde(default)]
    pub preformat_arguments: bool,
}

impl KeywordDefinition {
    /// Parses and schema-validates a keyword definition document.
    pub fn parse(path: &Path, text: &str) -> Result<Self, Error> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|source| Error::DefinitionJson {
                path: path.to_path_buf(),
                source,
            })?;
        if let Err(err) = schema().validate(&value) {
            return Err(Error::DefinitionSchema {
                path: path.to_path_buf(),
                context: err.to_string(),
            });
        }
        serde_json::from_value(value).map_err(|source| Error::DefinitionJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a keyword definition from `<keyword_dir>/<name>.ucl`.
    pub fn load(keyword_dir: &Path, name: &str) -> Result<Self, Error> {
        let path = keyword_dir.join(format!("{name}.ucl"));
        let text = std::fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&path, &text)
    }
}

/// A single parsed action from a [`KeywordDefinition::actions`] entry, e.g. `setowner(2)` parses
/// to `{ name: "setowner", arg_index: Some(2) }`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeywordAction {
    /// The action name (`dir`, `file`, `setowner`, `setgroup`, `setmode`, `comment`, ...).
    pub name: String,
    /// The 1-based argument index this action consumes, if any.
    pub arg_index: Option<usize>,
}

impl KeywordAction {
    /// Parses an action entry like `"dir"` or `"setowner(2)"`.
    pub fn parse(raw: &str) -> Self {
        if let Some(open) = raw.find('(')
            && let Some(close) = raw.find(')')
            && close > open
        {
            let name = raw[..open].to_string();
            let index = raw[open + 1..close].trim().parse::<usize>().ok();
            return KeywordAction { name, arg_index: index };
        }
        KeywordAction { name: raw.to_string(), arg_index: None }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn action_parses_bare_name() {
        let action = KeywordAction::parse("dir");
        assert_eq!(action.name, "dir");
        assert_eq!(action.arg_index, None);
    }

    #[test]
    fn action_parses_indexed_name() {
        let action = KeywordAction::parse("setowner(2)");
        assert_eq!(action.name, "setowner");
        assert_eq!(action.arg_index, Some(2));
    }

    #[test]
    fn definition_round_trips_through_schema() -> TestResult {
        let json = r#"{
            "actions": ["dir", "setowner(1)"],
            "attributes": { "owner": "root", "group": "wheel", "mode": "0755" },
            "arguments": true
        }"#;
        let def = KeywordDefinition::parse(Path::new("sample.ucl"), json)?;
        assert_eq!(def.actions, vec!["dir".to_string(), "setowner(1)".to_string()]);
        assert!(def.arguments);
        Ok(())
    }

    #[test]
    fn definition_rejects_unknown_field() {
        let json = r#"{ "not_a_real_field": 1 }"#;
        assert!(KeywordDefinition::parse(Path::new("bad.ucl"), json).is_err());
    }
}
