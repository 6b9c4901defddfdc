//! Emission and parsing of [`Manifest`] documents.
//!
//! A document is, on the wire, always valid JSON: UCL is a strict superset of JSON's grammar, so
//! emitting JSON satisfies the UCL form too, and parsing accepts JSON first before falling back
//! to YAML (the `pretty` form). There is no standalone UCL document syntax (braces without
//! quoted keys, `#`-comments) produced or accepted here, since nothing in this crate's
//! dependency stack parses it; callers that need that surface should deserialize with an
//! external UCL-to-JSON normalizer upstream of [`parse`].

use pkg_types::Package;

use crate::Error;
use crate::Manifest;
use crate::ManifestFlags;

/// The on-disk representation a [`Manifest`] is emitted as.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Format {
    /// Single-line JSON with no insignificant whitespace. The default: what clients fetch.
    #[default]
    JsonCompact,
    /// Multi-line, indented JSON.
    Json,
    /// Multi-line YAML, matching `pkg query -y`'s "pretty" output.
    Yaml,
    /// UCL. Emitted as indented JSON, which parses as valid UCL (see module docs).
    Ucl,
}

/// Controls what [`emit`] writes: the wire [`Format`], plus the two content filters
/// names (`no_files`, `local_metadata`).
#[derive(Clone, Copy, Debug, Default)]
pub struct EmitOptions {
    /// The wire format.
    pub format: Format,
    /// Omit `files`/`config`/`directories`.
    pub no_files: bool,
    /// Include `timestamp` and the `repository`/`relocated` annotations.
    pub local_metadata: bool,
}

impl EmitOptions {
    /// Creates the default options: [`Format::JsonCompact`], full file list, no local metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wire format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets `no_files`.
    pub fn with_no_files(mut self, no_files: bool) -> Self {
        self.no_files = no_files;
        self
    }

    /// Sets `local_metadata`.
    pub fn with_local_metadata(mut self, local_metadata: bool) -> Self {
        self.local_metadata = local_metadata;
        self
    }

    fn manifest_flags(&self) -> ManifestFlags {
        ManifestFlags::new().with_no_files(self.no_files).with_local_metadata(self.local_metadata)
    }
}

/// Serializes `package` as a manifest document per `options`.
///
/// ## Errors
///
/// Returns an error if the chosen format's serializer fails (it does not, for a well-formed
/// [`Manifest`], short of allocation failure; the `Result` exists for symmetry with [`parse`]
/// and to absorb future formats that can fail, e.g. a strict UCL emitter).
pub fn emit(package: &Package, options: &EmitOptions) -> Result<String, Error> {
    let manifest = Manifest::from_package(package, options.manifest_flags());
    match options.format {
        Format::JsonCompact => {
            serde_json::to_string(&manifest).map_err(|source| Error::Emit { format: "json-compact", source: source.to_string() })
        }
        Format::Json | Format::Ucl => serde_json::to_string_pretty(&manifest)
            .map_err(|source| Error::Emit { format: "json", source: source.to_string() }),
        Format::Yaml => {
            serde_yaml::to_string(&manifest).map_err(|source| Error::Emit { format: "yaml", source: source.to_string() })
        }
    }
}

/// Decodes a manifest document into its wire [`Manifest`] form, auto-detecting JSON/UCL vs. YAML
/// by trying JSON first.
///
/// Exposed separately from [`parse`] for callers that need fields [`Manifest`] carries but
/// [`Package`] doesn't (`scripts`, `lua_scripts`, `dep_formula`, `repopath`, `path` — see
/// DESIGN.md's "Manifest fields with no Package counterpart"), such as the installer reading a
/// package archive's lifecycle hook bodies alongside its `Package` data.
///
/// ## Errors
///
/// Returns an error if the document matches neither the JSON nor the YAML parser.
pub fn parse_manifest(document: &str) -> Result<Manifest, Error> {
    match serde_json::from_str(document) {
        Ok(manifest) => Ok(manifest),
        Err(json_err) => serde_yaml::from_str(document)
            .map_err(|_| Error::Parse { format: "json/yaml", source: json_err.to_string() }),
    }
}

/// Parses a manifest document, auto-detecting JSON/UCL vs. YAML by trying JSON first.
///
/// ## Errors
///
/// Returns an error if the document matches neither parser, or if it parses but fails to
/// convert into a [`Package`] (missing required field, malformed typed value).
pub fn parse(document: &str) -> Result<Package, Error> {
    parse_manifest(document)?.into_package()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pkg_types::Name;
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    fn sample() -> TestResult<Package> {
        let mut package = Package::new(Name::from_str("curl")?, "ftp/curl".to_string());
        package.version = Some(pkg_types::Version::new("8.9.1")?);
        package.comment = "command line tool for transferring data".to_string();
        package.maintainer = "maintainer@example.org".to_string();
        package.www = "https://curl.se/".to_string();
        package.prefix = "/usr/local".to_string();
        Ok(package)
    }

    #[rstest]
    fn compact_json_round_trips() -> TestResult<()> {
        let package = sample()?;
        let document = emit(&package, &EmitOptions::new())?;
        assert!(!document.contains('\n'));
        let round_tripped = parse(&document)?;
        assert_eq!(round_tripped.name, package.name);
        assert_eq!(round_tripped.version, package.version);
        Ok(())
    }

    #[rstest]
    fn pretty_json_round_trips() -> TestResult<()> {
        let package = sample()?;
        let document = emit(&package, &EmitOptions::new().with_format(Format::Json))?;
        assert!(document.contains('\n'));
        let round_tripped = parse(&document)?;
        assert_eq!(round_tripped.name, package.name);
        Ok(())
    }

    #[rstest]
    fn yaml_round_trips() -> TestResult<()> {
        let package = sample()?;
        let document = emit(&package, &EmitOptions::new().with_format(Format::Yaml))?;
        let round_tripped = parse(&document)?;
        assert_eq!(round_tripped.name, package.name);
        assert_eq!(round_tripped.comment, package.comment);
        Ok(())
    }

    #[rstest]
    fn ucl_form_is_valid_json() -> TestResult<()> {
        let package = sample()?;
        let document = emit(&package, &EmitOptions::new().with_format(Format::Ucl))?;
        serde_json::from_str::<serde_json::Value>(&document)?;
        Ok(())
    }

    #[rstest]
    fn malformed_document_is_rejected() {
        assert!(parse("not a manifest at all {{{").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use pkg_types::Name;
    use pkg_types::PackageFile;
    use pkg_types::Version;
    use proptest::prelude::*;

    use super::*;

    fn arb_package() -> impl Strategy<Value = Package> {
        (
            "[a-z][a-z0-9_]{2,9}",
            "[a-z][a-z0-9/_]{2,12}",
            "[a-z][a-z0-9.]{0,4}-[1-9][0-9]{0,1}",
            ".{0,30}",
            proptest::collection::vec("[a-z][a-z0-9_]{2,10}", 0..4),
        )
            .prop_map(|(name, origin, version, comment, file_names)| {
                let mut package = Package::new(Name::from_str(&name).unwrap(), origin);
                package.version = Some(Version::new(&version).unwrap());
                package.comment = comment;
                for (i, file_name) in file_names.into_iter().enumerate() {
                    package
                        .add_file(PackageFile {
                            path: format!("/usr/local/{file_name}-{i}"),
                            sha256: None,
                            uname: String::new(),
                            gname: String::new(),
                            mode: 0o644,
                            flags: 0,
                        })
                        .unwrap();
                }
                package
            })
    }

    proptest! {
        /// `parse(emit(pkg)) ≡ pkg` for the full (non-compact) document.
        #[test]
        fn full_manifest_round_trips(package in arb_package()) {
            let document = emit(&package, &EmitOptions::new())?;
            let round_tripped = parse(&document)?;
            prop_assert_eq!(round_tripped.name, package.name);
            prop_assert_eq!(round_tripped.origin, package.origin);
            prop_assert_eq!(round_tripped.version, package.version);
            prop_assert_eq!(round_tripped.comment, package.comment);
            prop_assert_eq!(round_tripped.files, package.files);
        }

        /// `parse(emit(pkg)) ≡ pkg` minus `files` under `no_files`: every other field still
        /// matches, but the file list is dropped rather than round-tripped.
        #[test]
        fn compact_manifest_round_trips_modulo_files(package in arb_package()) {
            let document = emit(&package, &EmitOptions::new().with_no_files(true))?;
            let round_tripped = parse(&document)?;
            prop_assert_eq!(round_tripped.name, package.name);
            prop_assert_eq!(round_tripped.origin, package.origin);
            prop_assert_eq!(round_tripped.version, package.version);
            prop_assert_eq!(round_tripped.comment, package.comment);
            prop_assert!(round_tripped.files.is_empty());
        }
    }
}
