//! Packing-list parsing and `@keyword` expansion.
//!
//! A packing list is a plain-text file: blank lines and lines starting with `#` are ignored,
//! `@keyword args...` lines are directives, and any other line is a bare file path relative to
//! the current `@cwd`. The built-in keywords (`cwd`, `dir`, `file`, `config`, `mode`, `owner`,
//! `group`, `comment`, `include`) are handled directly; anything else is looked up as
//! `<keyword_dir>/<keyword>.ucl` (see [`crate::keyword`]).

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use log::warn;

use crate::Error;
use crate::keyword::KeywordAction;
use crate::keyword::KeywordDefinition;
use crate::plist::Plist;
use crate::plist::PlistEntry;

/// Default permission bits for directories when no `@mode` is in effect.
const DEFAULT_DIR_MODE: u32 = 0o755;
/// Default permission bits for files when no `@mode` is in effect.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Mutable parsing context, threaded through nested `@include`s.
struct Context<'a> {
    cwd: String,
    uname: String,
    gname: String,
    file_mode: u32,
    dir_mode: u32,
    keyword_dir: Option<&'a Path>,
    /// Canonicalized paths of packing lists currently being expanded, to reject include cycles.
    in_progress: HashSet<PathBuf>,
}

/// Joins a packing-list-relative path against the current `@cwd`, producing the absolute,
/// leading-slash form required of stored paths.
fn join_cwd(cwd: &str, raw: &str) -> String {
    if raw.starts_with('/') {
        normalize(raw)
    } else {
        normalize(&format!("{cwd}/{raw}"))
    }
}

/// Collapses repeated `/` and trailing slashes (but keeps a leading one).
fn normalize(path: &str) -> String {
    let mut out = String::from("/");
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if out.len() > 1 {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// Tokenizes a directive's argument string on whitespace, honoring simple double-quoted tokens.
fn tokenize(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = args.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '"' {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                token.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }
    tokens
}

/// Parses a packing list from `text`, with `source` used only for error messages, optionally
/// resolving `@include` targets relative to `base_dir` and unknown keywords against
/// `keyword_dir`.
pub fn parse_plist(
    text: &str,
    source: &Path,
    base_dir: Option<&Path>,
    keyword_dir: Option<&Path>,
) -> Result<Plist, Error> {
    let mut ctx = Context {
        cwd: "/".to_string(),
        uname: "root".to_string(),
        gname: "wheel".to_string(),
        file_mode: DEFAULT_FILE_MODE,
        dir_mode: DEFAULT_DIR_MODE,
        keyword_dir,
        in_progress: HashSet::new(),
    };
    if let Ok(canon) = source.canonicalize() {
        ctx.in_progress.insert(canon);
    }
    let mut plist = Plist::default();
    parse_into(text, source, base_dir, &mut ctx, &mut plist)?;
    Ok(plist)
}

/// Parses a packing list file, resolving `@include` relative to its own parent directory.
pub fn parse_plist_file(path: &Path, keyword_dir: Option<&Path>) -> Result<Plist, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().map(Path::to_path_buf);
    parse_plist(&text, path, base_dir.as_deref(), keyword_dir)
}

fn parse_into(
    text: &str,
    source: &Path,
    base_dir: Option<&Path>,
    ctx: &mut Context,
    plist: &mut Plist,
) -> Result<(), Error> {
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('@') {
            let (keyword, args) = match rest.split_once(char::is_whitespace) {
                Some((k, a)) => (k, a.trim()),
                None => (rest, ""),
            };
            handle_keyword(keyword, args, line_no, source, base_dir, ctx, plist)?;
        } else {
            let path = join_cwd(&ctx.cwd, line);
            plist.entries.push(PlistEntry::File {
                path,
                uname: ctx.uname.clone(),
                gname: ctx.gname.clone(),
                mode: ctx.file_mode,
                config: false,
            });
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_keyword(
    keyword: &str,
    args: &str,
    line_no: usize,
    source: &Path,
    base_dir: Option<&Path>,
    ctx: &mut Context,
    plist: &mut Plist,
) -> Result<(), Error> {
    match keyword {
        "cwd" => {
            ctx.cwd = join_cwd("/", args);
        }
        "dir" => {
            let path = join_cwd(&ctx.cwd, args);
            plist.entries.push(PlistEntry::Dir {
                path,
                uname: ctx.uname.clone(),
                gname: ctx.gname.clone(),
                mode: ctx.dir_mode,
            });
        }
        "file" => {
            let path = join_cwd(&ctx.cwd, args);
            plist.entries.push(PlistEntry::File {
                path,
                uname: ctx.uname.clone(),
                gname: ctx.gname.clone(),
                mode: ctx.file_mode,
                config: false,
            });
        }
        "config" => {
            let path = join_cwd(&ctx.cwd, args);
            plist.entries.push(PlistEntry::File {
                path,
                uname: ctx.uname.clone(),
                gname: ctx.gname.clone(),
                mode: ctx.file_mode,
                config: true,
            });
        }
        "mode" => {
            ctx.file_mode = u32::from_str_radix(args.trim_start_matches("0o"), 8).unwrap_or(ctx.file_mode);
            ctx.dir_mode = ctx.file_mode;
        }
        "owner" => ctx.uname = args.to_string(),
        "group" => ctx.gname = args.to_string(),
        "comment" => {
            // Purely documentary; no manifest effect.
        }
        "include" => {
            let include_path = if Path::new(args).is_absolute() {
                PathBuf::from(args)
            } else {
                base_dir.map(|dir| dir.join(args)).unwrap_or_else(|| PathBuf::from(args))
            };
            let canon = include_path.canonicalize().unwrap_or_else(|_| include_path.clone());
            if ctx.in_progress.contains(&canon) {
                return Err(Error::IncludeCycle { path: canon });
            }
            ctx.in_progress.insert(canon.clone());
            let included_text = std::fs::read_to_string(&include_path).map_err(|source| Error::Io {
                path: include_path.clone(),
                source,
            })?;
            let nested_base = include_path.parent().map(Path::to_path_buf);
            parse_into(&included_text, &include_path, nested_base.as_deref(), ctx, plist)?;
            ctx.in_progress.remove(&canon);
        }
        other => expand_custom_keyword(other, args, line_no, ctx, plist)?,
    }
    Ok(())
}

fn expand_custom_keyword(
    keyword: &str,
    args: &str,
    line_no: usize,
    ctx: &Context,
    plist: &mut Plist,
) -> Result<(), Error> {
    let Some(keyword_dir) = ctx.keyword_dir else {
        return Err(Error::UnknownKeyword {
            line: line_no,
            keyword: keyword.to_string(),
            path: PathBuf::from("<no keyword_dir configured>"),
        });
    };
    let def_path = keyword_dir.join(format!("{keyword}.ucl"));
    if !def_path.is_file() {
        return Err(Error::UnknownKeyword {
            line: line_no,
            keyword: keyword.to_string(),
            path: def_path,
        });
    }
    let def = KeywordDefinition::load(keyword_dir, keyword)?;
    let tokens = if def.arguments { tokenize(args) } else { vec![args.to_string()] };

    let owner = def.attributes.as_ref().and_then(|a| a.owner.clone()).unwrap_or_else(|| ctx.uname.clone());
    let group = def.attributes.as_ref().and_then(|a| a.group.clone()).unwrap_or_else(|| ctx.gname.clone());
    let mode = def
        .attributes
        .as_ref()
        .and_then(|a| a.mode.as_deref())
        .and_then(|m| u32::from_str_radix(m.trim_start_matches("0o"), 8).ok());

    let arg_or_first = |index: Option<usize>| -> Result<String, Error> {
        match index {
            Some(i) => tokens.get(i.saturating_sub(1)).cloned().ok_or_else(|| Error::MissingArgument {
                line: line_no,
                keyword: keyword.to_string(),
                action: keyword.to_string(),
                index: i,
                supplied: tokens.len(),
            }),
            None => Ok(tokens.first().cloned().unwrap_or_default()),
        }
    };

    for raw_action in &def.actions {
        let action = KeywordAction::parse(raw_action);
        match action.name.as_str() {
            "dir" => {
                let path = join_cwd(&ctx.cwd, &arg_or_first(action.arg_index)?);
                plist.entries.push(PlistEntry::Dir {
                    path,
                    uname: owner.clone(),
                    gname: group.clone(),
                    mode: mode.unwrap_or(ctx.dir_mode),
                });
            }
            "file" => {
                let path = join_cwd(&ctx.cwd, &arg_or_first(action.arg_index)?);
                plist.entries.push(PlistEntry::File {
                    path,
                    uname: owner.clone(),
                    gname: group.clone(),
                    mode: mode.unwrap_or(ctx.file_mode),
                    config: false,
                });
            }
            "config" => {
                let path = join_cwd(&ctx.cwd, &arg_or_first(action.arg_index)?);
                plist.entries.push(PlistEntry::File {
                    path,
                    uname: owner.clone(),
                    gname: group.clone(),
                    mode: mode.unwrap_or(ctx.file_mode),
                    config: true,
                });
            }
            "setowner" | "setgroup" | "setmode" | "comment" => {
                // Attribute-only actions: already folded into `owner`/`group`/`mode` above via
                // the definition's `attributes` block. No additional entry to emit.
            }
            other => warn!("keyword '{keyword}' action '{other}' has no built-in handler, ignoring"),
        }
    }

    for (hook, fragment) in [
        ("pre-install", &def.pre_install),
        ("post-install", &def.post_install),
        ("pre-deinstall", &def.pre_deinstall),
        ("post-deinstall", &def.post_deinstall),
        ("pre-install-lua", &def.pre_install_lua),
        ("post-install-lua", &def.post_install_lua),
        ("pre-deinstall-lua", &def.pre_deinstall_lua),
        ("post-deinstall-lua", &def.post_deinstall_lua),
    ] {
        if let Some(fragment) = fragment {
            plist.push_script(hook, fragment);
        }
    }

    for message in &def.messages {
        let when = message
            .message_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(pkg_types::MessageTrigger::Always);
        plist.messages.push(pkg_types::Message {
            when,
            version_range: None,
            text: message.message.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn bare_lines_use_cwd() -> TestResult {
        let plist = parse_plist("@cwd /usr/local\nbin/foo\n", Path::new("t"), None, None)?;
        assert_eq!(plist.entries.len(), 1);
        assert_eq!(plist.entries[0].path(), "/usr/local/bin/foo");
        Ok(())
    }

    #[test]
    fn config_keyword_marks_config_file() -> TestResult {
        let plist = parse_plist("@cwd /etc\n@config foo.conf\n", Path::new("t"), None, None)?;
        match &plist.entries[0] {
            PlistEntry::File { config, path, .. } => {
                assert!(*config);
                assert_eq!(path, "/etc/foo.conf");
            }
            _ => panic!("expected a file entry"),
        }
        Ok(())
    }

    #[test]
    fn owner_group_mode_apply_to_subsequent_entries() -> TestResult {
        let plist = parse_plist(
            "@cwd /usr/local\n@owner build\n@group build\n@mode 0700\nbin/tool\n",
            Path::new("t"),
            None,
            None,
        )?;
        match &plist.entries[0] {
            PlistEntry::File { uname, gname, mode, .. } => {
                assert_eq!(uname, "build");
                assert_eq!(gname, "build");
                assert_eq!(*mode, 0o700);
            }
            _ => panic!("expected a file entry"),
        }
        Ok(())
    }

    #[test]
    fn include_resolves_relative_to_base_dir() -> TestResult {
        let dir = tempfile::tempdir()?;
        let included = dir.path().join("extra.plist");
        std::fs::write(&included, "@cwd /opt\nextra\n")?;
        let main_path = dir.path().join("main.plist");
        std::fs::write(&main_path, "@include extra.plist\n")?;
        let plist = parse_plist_file(&main_path, None)?;
        assert_eq!(plist.entries[0].path(), "/opt/extra");
        Ok(())
    }

    #[test]
    fn include_cycle_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;
        let a = dir.path().join("a.plist");
        let b = dir.path().join("b.plist");
        std::fs::write(&a, "@include b.plist\n")?;
        std::fs::write(&b, "@include a.plist\n")?;
        let result = parse_plist_file(&a, None);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn unknown_keyword_without_definition_errors() {
        let result = parse_plist("@frobnicate arg\n", Path::new("t"), None, None);
        assert!(matches!(result, Err(Error::UnknownKeyword { .. })));
    }

    #[test]
    fn custom_keyword_expands_via_definition() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut def_file = NamedTempFile::new_in(dir.path())?;
        writeln!(
            def_file,
            r#"{{"actions": ["dir"], "attributes": {{"owner": "daemon", "group": "daemon", "mode": "0750"}}}}"#
        )?;
        let path = dir.path().join("sample.ucl");
        std::fs::rename(def_file.path(), &path)?;
        let plist = parse_plist("@cwd /var\n@sample state\n", Path::new("t"), None, Some(dir.path()))?;
        match &plist.entries[0] {
            PlistEntry::Dir { path, uname, gname, mode } => {
                assert_eq!(path, "/var/state");
                assert_eq!(uname, "daemon");
                assert_eq!(gname, "daemon");
                assert_eq!(*mode, 0o750);
            }
            _ => panic!("expected a dir entry"),
        }
        Ok(())
    }

    #[test]
    fn normalize_collapses_duplicate_slashes() {
        assert_eq!(normalize("/usr//local//bin/"), "/usr/local/bin");
    }
}
