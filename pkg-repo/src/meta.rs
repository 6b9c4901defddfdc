//! `meta.conf` parsing and schema validation.
//!
//! The document is modeled as JSON (UCL's grammar is a strict superset of JSON's), validated
//! against an embedded JSON Schema before being deserialized into [`pkg_types::RepositoryMeta`],
//! following the same pattern [`pkg_plist`](../pkg_plist) uses for keyword definitions. A
//! `version == 1` document is accepted with a deprecation warning; it carries none of the v2
//! archive-layout fields, so those are filled in with [`RepositoryMeta::new`]'s defaults.

use std::sync::OnceLock;

use jsonschema::Validator;
use log::warn;
use pkg_types::RepositoryMeta;

use crate::Error;

const V1_SCHEMA_JSON: &str = r#"{
    "type": "object",
    "properties": {
        "version": { "const": 1 },
        "maintainer": { "type": "string" },
        "source": { "type": "string" },
        "revision": { "type": "integer", "minimum": 0 }
    },
    "required": ["version", "maintainer"]
}"#;

const V2_SCHEMA_JSON: &str = r#"{
    "type": "object",
    "properties": {
        "version": { "const": 2 },
        "maintainer": { "type": "string" },
        "source": { "type": "string" },
        "packing_format": { "type": "string" },
        "manifests_file": { "type": "string" },
        "manifests_archive": { "type": "string" },
        "conflicts_file": { "type": "string" },
        "conflicts_archive": { "type": "string" },
        "filesite_file": { "type": "string" },
        "filesite_archive": { "type": "string" },
        "data_file": { "type": "string" },
        "data_archive": { "type": "string" },
        "source_identifier": { "type": "string" },
        "revision": { "type": "integer", "minimum": 0 },
        "eol_timestamp": { "type": "integer" },
        "keys": {
            "type": "object",
            "additionalProperties": {
                "type": "object",
                "properties": {
                    "pubkey": { "type": "string" },
                    "key_type": { "type": "string" }
                },
                "required": ["pubkey", "key_type"]
            }
        }
    },
    "required": [
        "version",
        "maintainer",
        "packing_format",
        "manifests_file",
        "manifests_archive",
        "conflicts_file",
        "conflicts_archive",
        "data_file",
        "data_archive",
        "revision",
        "keys"
    ],
    "additionalProperties": false
}"#;

fn v1_schema() -> &'static Validator {
    static SCHEMA: OnceLock<Validator> = OnceLock::new();
    SCHEMA.get_or_init(|| compile(V1_SCHEMA_JSON))
}

fn v2_schema() -> &'static Validator {
    static SCHEMA: OnceLock<Validator> = OnceLock::new();
    SCHEMA.get_or_init(|| compile(V2_SCHEMA_JSON))
}

fn compile(schema_json: &str) -> Validator {
    let value: serde_json::Value =
        serde_json::from_str(schema_json).expect("embedded meta schema is valid JSON");
    jsonschema::validator_for(&value).expect("embedded meta schema is a valid JSON Schema")
}

fn validate(validator: &Validator, value: &serde_json::Value) -> Result<(), Error> {
    if let Some(error) = validator.iter_errors(value).next() {
        return Err(Error::MetaSchema { reason: error.to_string() });
    }
    Ok(())
}

/// Parses a `meta.conf` document, validating it against the embedded schema for its declared
/// `version`.
///
/// # Errors
///
/// Returns [`Error::MetaJson`] if `bytes` is not valid JSON, or [`Error::MetaSchema`] if it fails
/// schema validation for its declared version.
pub fn parse_meta(bytes: &[u8]) -> Result<RepositoryMeta, Error> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(Error::MetaJson)?;
    let version = value.get("version").and_then(serde_json::Value::as_u64).unwrap_or(0);

    if version == 1 {
        warn!("meta.conf declares schema version 1, which is deprecated; refusing to produce v1 output");
        validate(v1_schema(), &value)?;
        return Ok(parse_v1(&value));
    }

    validate(v2_schema(), &value)?;
    serde_json::from_value(value).map_err(Error::MetaJson)
}

fn parse_v1(value: &serde_json::Value) -> RepositoryMeta {
    let maintainer = value.get("maintainer").and_then(serde_json::Value::as_str).unwrap_or_default();
    let mut meta = RepositoryMeta::new(1, maintainer.to_string());
    meta.source = value.get("source").and_then(serde_json::Value::as_str).map(str::to_string);
    meta.revision = value.get("revision").and_then(serde_json::Value::as_u64).unwrap_or(0);
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_v2_meta_document() {
        let json = serde_json::json!({
            "version": 2,
            "maintainer": "packaging-team",
            "packing_format": "tzst",
            "manifests_file": "manifests",
            "manifests_archive": "manifests.pkg",
            "conflicts_file": "conflicts",
            "conflicts_archive": "conflicts.pkg",
            "data_file": "data",
            "data_archive": "data.pkg",
            "revision": 42,
            "keys": {}
        });
        let meta = parse_meta(json.to_string().as_bytes()).unwrap();
        assert_eq!(meta.version, 2);
        assert_eq!(meta.revision, 42);
        assert!(!meta.is_deprecated());
    }

    #[test]
    fn accepts_a_deprecated_v1_meta_document() {
        let json = serde_json::json!({
            "version": 1,
            "maintainer": "legacy-team",
            "revision": 3,
        });
        let meta = parse_meta(json.to_string().as_bytes()).unwrap();
        assert!(meta.is_deprecated());
        assert_eq!(meta.maintainer, "legacy-team");
        assert_eq!(meta.revision, 3);
        assert_eq!(meta.packing_format, "tzst");
    }

    #[test]
    fn rejects_a_v2_document_missing_required_fields() {
        let json = serde_json::json!({ "version": 2, "maintainer": "packaging-team" });
        assert!(matches!(parse_meta(json.to_string().as_bytes()), Err(Error::MetaSchema { .. })));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_meta(b"not json"), Err(Error::MetaJson(_))));
    }
}
