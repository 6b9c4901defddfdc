//! The embedded Lua VM lifecycle scripts run against: a sandboxed standard library plus the
//! `pkg` table, each of whose functions transforms absolute paths into
//! `openat`-style root-relative operations.

use std::fs;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write as _;
use std::sync::mpsc::Sender;

use log::info;
use mlua::Lua;
use mlua::UserData;
use mlua::UserDataMethods;
use mlua::Value;
use mlua::Variadic;

use crate::Error;
use crate::Hook;
use crate::RootedPath;

/// A file handle returned by the sandboxed `io.open`, standing in for Lua's own file userdata.
struct SandboxedFile(fs::File);

impl UserData for SandboxedFile {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("write", |_, this, data: String| {
            this.0.write_all(data.as_bytes()).map_err(mlua::Error::external)?;
            Ok(())
        });
        methods.add_method_mut("read", |_, this, _: ()| {
            let mut buf = String::new();
            this.0.read_to_string(&mut buf).map_err(mlua::Error::external)?;
            Ok(buf)
        });
        methods.add_method_mut("close", |_, _this, _: ()| Ok(()));
    }
}

/// Runs `script` as a sandboxed Lua hook rooted at `root`, for lifecycle point `hook`.
///
/// `io.open`, `os.remove`, and `os.rename` are rebound to operate through [`RootedPath`]; `os`
/// keeps no `execute` or `exit` binding at all, since a script declared sandboxed must not be
/// able to fork or terminate the host process.
///
/// # Errors
///
/// Returns [`Error::Lua`] if the script fails to compile or raises a runtime error.
pub fn run_lua_hook(script: &str, hook: Hook, root: &RootedPath, messages: Sender<String>) -> Result<(), Error> {
    let lua = Lua::new();
    install_sandbox(&lua, root, &messages)?;
    lua.globals().set("PKG_HOOK", hook.to_string())?;
    lua.load(script).set_name(hook.to_string()).exec()?;
    Ok(())
}

fn install_sandbox(lua: &Lua, root: &RootedPath, messages: &Sender<String>) -> mlua::Result<()> {
    rebind_io(lua, root)?;
    disable_os_escape_hatches(lua)?;
    install_pkg_table(lua, root, messages)?;
    install_msgfd(lua, messages.clone())?;
    Ok(())
}

fn rebind_io(lua: &Lua, root: &RootedPath) -> mlua::Result<()> {
    let io: mlua::Table = lua.globals().get("io")?;
    let os: mlua::Table = lua.globals().get("os")?;

    let open_root = root.clone();
    let open = lua.create_function(move |lua, (path, mode): (String, Option<String>)| {
        let resolved = open_root.resolve(&path).map_err(mlua::Error::external)?;
        let mode = mode.unwrap_or_else(|| "r".to_string());
        let opened = match mode.as_str() {
            "r" => OpenOptions::new().read(true).open(&resolved),
            "w" => OpenOptions::new().write(true).create(true).truncate(true).open(&resolved),
            "a" => OpenOptions::new().append(true).create(true).open(&resolved),
            other => return Err(mlua::Error::external(format!("unsupported io.open mode {other:?}"))),
        };
        match opened {
            Ok(file) => Ok((Some(lua.create_userdata(SandboxedFile(file))?), None)),
            Err(source) => Ok((None, Some(source.to_string()))),
        }
    })?;
    io.set("open", open)?;

    let remove_root = root.clone();
    let remove = lua.create_function(move |_, path: String| {
        let resolved = remove_root.resolve(&path).map_err(mlua::Error::external)?;
        match fs::remove_file(&resolved) {
            Ok(()) => Ok((true, None)),
            Err(source) => Ok((false, Some(source.to_string()))),
        }
    })?;
    os.set("remove", remove)?;

    let rename_root = root.clone();
    let rename = lua.create_function(move |_, (from, to): (String, String)| {
        let from = rename_root.resolve(&from).map_err(mlua::Error::external)?;
        let to = rename_root.resolve(&to).map_err(mlua::Error::external)?;
        match fs::rename(&from, &to) {
            Ok(()) => Ok((true, None)),
            Err(source) => Ok((false, Some(source.to_string()))),
        }
    })?;
    os.set("rename", rename)?;

    Ok(())
}

fn disable_os_escape_hatches(lua: &Lua) -> mlua::Result<()> {
    let os: mlua::Table = lua.globals().get("os")?;
    os.set("execute", Value::Nil)?;
    os.set("exit", Value::Nil)?;
    Ok(())
}

fn install_msgfd(lua: &Lua, messages: Sender<String>) -> mlua::Result<()> {
    let table = lua.create_table()?;
    let send = lua.create_function(move |_, message: String| {
        let _ = messages.send(message);
        Ok(())
    })?;
    table.set("send", send)?;
    lua.globals().set("msgfd", table)?;
    Ok(())
}

fn install_pkg_table(lua: &Lua, root: &RootedPath, messages: &Sender<String>) -> mlua::Result<()> {
    let pkg = lua.create_table()?;

    let msg_tx = messages.clone();
    pkg.set(
        "print_msg",
        lua.create_function(move |_, message: String| {
            info!("{message}");
            let _ = msg_tx.send(message);
            Ok(())
        })?,
    )?;

    let prefixed_root = root.clone();
    pkg.set(
        "prefixed_path",
        lua.create_function(move |_, path: String| {
            let resolved = prefixed_root.resolve(&path).map_err(mlua::Error::external)?;
            Ok(resolved.to_string_lossy().into_owned())
        })?,
    )?;

    let filecmp_root = root.clone();
    pkg.set(
        "filecmp",
        lua.create_function(move |_, (a, b): (String, String)| {
            let a = filecmp_root.resolve(&a).map_err(mlua::Error::external)?;
            let b = filecmp_root.resolve(&b).map_err(mlua::Error::external)?;
            Ok(fs::read(&a).ok() == fs::read(&b).ok())
        })?,
    )?;

    let copy_root = root.clone();
    pkg.set(
        "copy",
        lua.create_function(move |_, (src, dst): (String, String)| {
            let src = copy_root.resolve(&src).map_err(mlua::Error::external)?;
            let dst = copy_root.resolve(&dst).map_err(mlua::Error::external)?;
            fs::copy(&src, &dst).map_err(mlua::Error::external)?;
            Ok(())
        })?,
    )?;

    let stat_root = root.clone();
    pkg.set(
        "stat",
        lua.create_function(move |lua, path: String| {
            let resolved = stat_root.resolve(&path).map_err(mlua::Error::external)?;
            match fs::symlink_metadata(&resolved) {
                Ok(meta) => {
                    let table = lua.create_table()?;
                    table.set("size", meta.len())?;
                    table.set("is_dir", meta.is_dir())?;
                    table.set("is_symlink", meta.file_type().is_symlink())?;
                    Ok(Value::Table(table))
                }
                Err(_) => Ok(Value::Nil),
            }
        })?,
    )?;

    let readdir_root = root.clone();
    pkg.set(
        "readdir",
        lua.create_function(move |lua, path: String| {
            let resolved = readdir_root.resolve(&path).map_err(mlua::Error::external)?;
            let table = lua.create_table()?;
            for (index, entry) in fs::read_dir(&resolved).map_err(mlua::Error::external)?.enumerate() {
                let entry = entry.map_err(mlua::Error::external)?;
                table.set(index + 1, entry.file_name().to_string_lossy().into_owned())?;
            }
            Ok(table)
        })?,
    )?;

    let exec_root = root.clone();
    pkg.set(
        "exec",
        lua.create_function(move |_, (command, args): (String, Variadic<String>)| {
            let status = std::process::Command::new(&command)
                .args(args.iter())
                .current_dir(exec_root.root())
                .status()
                .map_err(mlua::Error::external)?;
            Ok(status.code().unwrap_or(-1))
        })?,
    )?;

    let symlink_root = root.clone();
    pkg.set(
        "symlink",
        lua.create_function(move |_, (target, link): (String, String)| {
            let link = symlink_root.resolve(&link).map_err(mlua::Error::external)?;
            std::os::unix::fs::symlink(&target, &link).map_err(mlua::Error::external)?;
            Ok(())
        })?,
    )?;

    lua.globals().set("pkg", pkg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn print_msg_reaches_the_message_channel() -> TestResult {
        let dir = tempfile::tempdir()?;
        let root = RootedPath::new(dir.path());
        let (tx, rx) = mpsc::channel();
        run_lua_hook(r#"pkg.print_msg("hello")"#, Hook::PostInstall, &root, tx)?;
        assert_eq!(rx.try_recv()?, "hello");
        Ok(())
    }

    #[test]
    fn io_open_is_confined_to_root() -> TestResult {
        let dir = tempfile::tempdir()?;
        let root = RootedPath::new(dir.path());
        let (tx, _rx) = mpsc::channel();
        run_lua_hook(
            r#"
            local f = io.open("/greeting.txt", "w")
            f:write("hi")
            f:close()
            "#,
            Hook::PostInstall,
            &root,
            tx,
        )?;
        assert_eq!(fs::read_to_string(dir.path().join("greeting.txt"))?, "hi");
        Ok(())
    }

    #[test]
    fn os_execute_is_disabled() -> TestResult {
        let dir = tempfile::tempdir()?;
        let root = RootedPath::new(dir.path());
        let (tx, _rx) = mpsc::channel();
        let err = run_lua_hook("os.execute(\"true\")", Hook::PostInstall, &root, tx).unwrap_err();
        assert!(matches!(err, Error::Lua(_)));
        Ok(())
    }

    #[test]
    fn pkg_stat_reports_file_size() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a"), b"hello")?;
        let root = RootedPath::new(dir.path());
        let (tx, _rx) = mpsc::channel();
        run_lua_hook(
            r#"
            local s = pkg.stat("/a")
            assert(s.size == 5)
            "#,
            Hook::PostInstall,
            &root,
            tx,
        )?;
        Ok(())
    }
}
