//! Integration tests covering manifest emission/parsing end-to-end, independent of the
//! `Package`-internal unit tests in `src/manifest.rs`.

use std::str::FromStr;

use pkg_manifest::EmitOptions;
use pkg_manifest::Format;
use pkg_manifest::emit;
use pkg_manifest::parse;
use pkg_types::Name;
use pkg_types::Package;
use pkg_types::PackageFile;
use pkg_types::Version;
use rstest::rstest;
use testresult::TestResult;

fn sample_package() -> TestResult<Package> {
    let mut package = Package::new(Name::from_str("tmux")?, "misc/tmux".to_string());
    package.version = Some(Version::new("3.4-1")?);
    package.comment = "terminal multiplexer".to_string();
    package.desc = "a terminal multiplexer with session persistence".to_string();
    package.maintainer = "maintainer@example.org".to_string();
    package.www = "https://github.com/tmux/tmux".to_string();
    package.prefix = "/usr/local".to_string();
    package.add_file(PackageFile {
        path: "/usr/local/bin/tmux".to_string(),
        sha256: Some("sha256$0123456789abcdef".to_string()),
        uname: "root".to_string(),
        gname: "wheel".to_string(),
        mode: 0o755,
        flags: 0,
    })?;
    Ok(package)
}

#[rstest]
fn compact_manifest_omits_whitespace_and_round_trips() -> TestResult<()> {
    let package = sample_package()?;
    let document = emit(&package, &EmitOptions::new())?;
    assert!(!document.contains('\n'));

    let round_tripped = parse(&document)?;
    assert_eq!(round_tripped.name, package.name);
    assert_eq!(round_tripped.files, package.files);
    Ok(())
}

#[rstest]
fn no_files_manifest_is_client_view() -> TestResult<()> {
    let package = sample_package()?;
    let options = EmitOptions::new().with_no_files(true);
    let document = emit(&package, &options)?;
    assert!(!document.contains("/usr/local/bin/tmux"));

    let round_tripped = parse(&document)?;
    assert!(round_tripped.files.is_empty());
    assert_eq!(round_tripped.name, package.name);
    Ok(())
}

#[rstest]
#[case(Format::JsonCompact)]
#[case(Format::Json)]
#[case(Format::Yaml)]
#[case(Format::Ucl)]
fn every_format_round_trips_name_and_version(#[case] format: Format) -> TestResult<()> {
    let package = sample_package()?;
    let document = emit(&package, &EmitOptions::new().with_format(format))?;
    let round_tripped = parse(&document)?;
    assert_eq!(round_tripped.name, package.name);
    assert_eq!(round_tripped.version, package.version);
    Ok(())
}

#[rstest]
fn rejects_document_missing_name() {
    let document = r#"{"version": "1.0"}"#;
    assert!(parse(document).is_err());
}
