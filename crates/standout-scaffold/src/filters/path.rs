//! Path filters.
//!
//! The POSIX helpers (`basename`, `dirname`, `splitext`, `relpath`) and the Windows
//! helpers (`win_*`) are pure string operations, so they behave the same on every
//! host. Only `realpath`, `relpath`, `fileglob` and the `expand*` filters look at
//! the filesystem or the process environment.

use std::path::{Component, Path, PathBuf};

use glob::MatchOptions;
use minijinja::value::Kwargs;
use minijinja::{Error, Value};
use regex::{Captures, Regex};

use super::args;
use crate::error::{FilterError, Result};

/// Final path component (`"/a/b/"` has none).
pub fn basename(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => path[i + 1..].to_string(),
        None => path.to_string(),
    }
}

/// Everything before the final component, without trailing slashes.
pub fn dirname(path: &str) -> String {
    let head = match path.rfind('/') {
        Some(i) => &path[..i + 1],
        None => "",
    };
    if head.is_empty() || head.bytes().all(|b| b == b'/') {
        head.to_string()
    } else {
        head.trim_end_matches('/').to_string()
    }
}

/// Splits off the extension; leading dots of the file name do not start one.
pub fn splitext(path: &str) -> (String, String) {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    if let Some(dot) = path.rfind('.') {
        if dot > name_start && path[name_start..dot].bytes().any(|b| b != b'.') {
            return (path[..dot].to_string(), path[dot..].to_string());
        }
    }
    (path.to_string(), String::new())
}

/// Lexically normalizes a POSIX path.
pub fn normpath(path: &str) -> String {
    if path.is_empty() {
        return ".".into();
    }
    let leading = if path.starts_with("//") && !path.starts_with("///") {
        2
    } else if path.starts_with('/') {
        1
    } else {
        0
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." if leading == 0 && parts.last().map_or(true, |last| *last == "..") => {
                parts.push("..")
            }
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let joined = format!("{}{}", "/".repeat(leading), parts.join("/"));
    if joined.is_empty() {
        ".".into()
    } else {
        joined
    }
}

fn current_dir() -> Result<String> {
    Ok(std::env::current_dir()?.to_string_lossy().into_owned())
}

fn abspath(path: &str) -> Result<String> {
    if path.starts_with('/') {
        Ok(normpath(path))
    } else {
        Ok(normpath(&format!("{}/{}", current_dir()?, path)))
    }
}

/// `path` relative to `start`, computed lexically.
pub fn relpath(path: &str, start: &str) -> Result<String> {
    if path.is_empty() {
        return Err(FilterError::invalid("no path specified"));
    }
    let path = abspath(path)?;
    let start = abspath(start)?;
    let path_parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let start_parts: Vec<&str> = start.split('/').filter(|p| !p.is_empty()).collect();

    let common = path_parts
        .iter()
        .zip(&start_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel: Vec<&str> = vec![".."; start_parts.len() - common];
    rel.extend(&path_parts[common..]);
    if rel.is_empty() {
        Ok(".".into())
    } else {
        Ok(rel.join("/"))
    }
}

/// Absolute path with symlinks resolved as far as the path exists.
pub fn realpath(path: &str) -> Result<String> {
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::from("/");
    for component in absolute.components() {
        match component {
            Component::Prefix(prefix) => resolved = PathBuf::from(prefix.as_os_str()),
            Component::RootDir => resolved.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(canonical) = std::fs::canonicalize(&resolved) {
                    resolved = canonical;
                }
            }
        }
    }
    Ok(resolved.to_string_lossy().into_owned())
}

/// `~` and `~/…` expand to the home directory; `~user` is left alone.
pub fn expanduser(path: &str) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_string();
    };
    if !(rest.is_empty() || rest.starts_with('/')) {
        return path.to_string();
    }
    let home = std::env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .or_else(|| dirs::home_dir().map(|home| home.to_string_lossy().into_owned()));

    match home {
        Some(home) => {
            let expanded = format!("{}{}", home.trim_end_matches('/'), rest);
            if expanded.is_empty() {
                "/".into()
            } else {
                expanded
            }
        }
        None => path.to_string(),
    }
}

/// Substitutes `$name` and `${name}`; unknown variables stay as written.
pub fn expandvars(path: &str) -> Result<String> {
    if !path.contains('$') {
        return Ok(path.to_string());
    }
    let pattern = Regex::new(r"\$([A-Za-z0-9_]+|\{[^}]*\})")?;
    let expanded = pattern.replace_all(path, |caps: &Captures| {
        let raw = &caps[1];
        let name = raw
            .strip_prefix('{')
            .and_then(|inner| inner.strip_suffix('}'))
            .unwrap_or(raw);
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(expanded.into_owned())
}

/// Regular files matching `pattern`; `**` spans directories.
pub fn fileglob(pattern: &str) -> Result<Vec<String>> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    Ok(glob::glob_with(pattern, options)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .map(|path| path.to_string_lossy().into_owned())
        .collect())
}

fn is_win_sep(c: char) -> bool {
    c == '\\' || c == '/'
}

/// Splits a Windows drive (`C:`) or UNC share (`\\server\share`) from the rest.
pub fn win_splitdrive(path: &str) -> (String, String) {
    let normalized = path.replace('/', "\\");
    if normalized.starts_with("\\\\") && !normalized[2..].starts_with('\\') {
        let Some(server_end) = normalized[2..].find('\\').map(|i| i + 2) else {
            return (String::new(), path.to_string());
        };
        let share_end = match normalized[server_end + 1..].find('\\') {
            Some(0) => return (String::new(), path.to_string()),
            Some(i) => server_end + 1 + i,
            None => path.len(),
        };
        return (path[..share_end].to_string(), path[share_end..].to_string());
    }
    let mut chars = path.chars();
    if let (Some(first), Some(':')) = (chars.next(), chars.next()) {
        let drive_end = first.len_utf8() + 1;
        return (path[..drive_end].to_string(), path[drive_end..].to_string());
    }
    (String::new(), path.to_string())
}

/// Windows `(head, tail)` split.
pub fn win_split(path: &str) -> (String, String) {
    let (drive, rest) = win_splitdrive(path);
    let tail_start = rest.rfind(is_win_sep).map_or(0, |i| i + 1);
    let (head, tail) = rest.split_at(tail_start);
    let trimmed = head.trim_end_matches(is_win_sep);
    let head = if trimmed.is_empty() { head } else { trimmed };
    (format!("{}{}", drive, head), tail.to_string())
}

fn pair(pair: (String, String)) -> Value {
    Value::from(vec![pair.0, pair.1])
}

pub fn basename_filter(path: &str) -> String {
    basename(path)
}

pub fn dirname_filter(path: &str) -> String {
    dirname(path)
}

pub fn splitext_filter(path: &str) -> Value {
    pair(splitext(path))
}

pub fn expanduser_filter(path: &str) -> String {
    expanduser(path)
}

pub fn expandvars_filter(path: &str) -> std::result::Result<String, Error> {
    Ok(expandvars(path)?)
}

pub fn realpath_filter(path: &str) -> std::result::Result<String, Error> {
    Ok(realpath(path)?)
}

/// `relpath(path, start=cwd)`
pub fn relpath_filter(
    path: &str,
    start: Option<Value>,
    kwargs: Kwargs,
) -> std::result::Result<String, Error> {
    let start = args::string_param(start, &kwargs, "start")?;
    kwargs.assert_all_used()?;
    let start = match start {
        Some(start) => start,
        None => current_dir()?,
    };
    Ok(relpath(path, &start)?)
}

pub fn fileglob_filter(pattern: &str) -> std::result::Result<Value, Error> {
    Ok(Value::from(fileglob(pattern)?))
}

pub fn win_basename(path: &str) -> String {
    win_split(path).1
}

pub fn win_dirname(path: &str) -> String {
    win_split(path).0
}

pub fn win_splitdrive_filter(path: &str) -> Value {
    pair(win_splitdrive(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_posix_components() {
        assert_eq!(basename("/etc/asdf/foo.txt"), "foo.txt");
        assert_eq!(basename("/a/b/"), "");
        assert_eq!(dirname("/etc/asdf/foo.txt"), "/etc/asdf");
        assert_eq!(dirname("/etc//foo"), "/etc");
        assert_eq!(dirname("/foo"), "/");
        assert_eq!(dirname("foo"), "");
    }

    #[test]
    fn test_splitext() {
        assert_eq!(splitext("foo.txt"), ("foo".into(), ".txt".into()));
        assert_eq!(splitext("a/b.tar.gz"), ("a/b.tar".into(), ".gz".into()));
        assert_eq!(splitext(".bashrc"), (".bashrc".into(), String::new()));
        assert_eq!(splitext("..x"), ("..x".into(), String::new()));
        assert_eq!(splitext("a.b/c"), ("a.b/c".into(), String::new()));
    }

    #[test]
    fn test_normpath() {
        assert_eq!(normpath("/a/./b/../c/"), "/a/c");
        assert_eq!(normpath("../a/.."), "..");
        assert_eq!(normpath("/.."), "/");
        assert_eq!(normpath("//a"), "//a");
        assert_eq!(normpath(""), ".");
    }

    #[test]
    fn test_relpath_between_absolute_paths() {
        assert_eq!(relpath("/etc/asdf/foo.txt", "/etc").unwrap(), "asdf/foo.txt");
        assert_eq!(relpath("/etc", "/etc/asdf").unwrap(), "..");
        assert_eq!(relpath("/a/b", "/a/b").unwrap(), ".");
        assert_eq!(relpath("/x/y", "/a/b").unwrap(), "../../x/y");
        assert!(relpath("", "/").is_err());
    }

    #[test]
    fn test_realpath_collapses_parent_segments() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("a/c")).unwrap();
        fs::write(root.join("a/b/foo.txt"), "").unwrap();

        let input = format!("{}/a/c/../b/foo.txt", dir.path().display());
        let expected = root.join("a/b/foo.txt");
        assert_eq!(realpath(&input).unwrap(), expected.to_string_lossy());
    }

    #[cfg(unix)]
    #[test]
    fn test_realpath_resolves_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir(root.join("target")).unwrap();
        std::os::unix::fs::symlink(root.join("target"), root.join("link")).unwrap();

        let input = format!("{}/link/missing.txt", root.display());
        let expected = root.join("target/missing.txt");
        assert_eq!(realpath(&input).unwrap(), expected.to_string_lossy());
    }

    #[test]
    #[serial]
    fn test_expanduser_uses_home() {
        let previous = std::env::var("HOME").ok();
        std::env::set_var("HOME", "/home/scaffold/");

        assert_eq!(expanduser("~/path/to/foo.txt"), "/home/scaffold/path/to/foo.txt");
        assert_eq!(expanduser("~"), "/home/scaffold");
        assert_eq!(expanduser("~other/x"), "~other/x");
        assert_eq!(expanduser("a/~"), "a/~");

        match previous {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
    }

    #[test]
    #[serial]
    fn test_expandvars() {
        std::env::set_var("SCAFFOLD_TEST_DIR", "/srv/app");
        std::env::remove_var("SCAFFOLD_TEST_UNSET");

        assert_eq!(expandvars("$SCAFFOLD_TEST_DIR/x").unwrap(), "/srv/app/x");
        assert_eq!(expandvars("${SCAFFOLD_TEST_DIR}/x").unwrap(), "/srv/app/x");
        assert_eq!(
            expandvars("$SCAFFOLD_TEST_UNSET/x").unwrap(),
            "$SCAFFOLD_TEST_UNSET/x"
        );
        assert_eq!(expandvars("cost: $").unwrap(), "cost: $");

        std::env::remove_var("SCAFFOLD_TEST_DIR");
    }

    #[test]
    fn test_win_splitdrive() {
        assert_eq!(
            win_splitdrive("C:\\Temp\\asdf\\foo.txt"),
            ("C:".into(), "\\Temp\\asdf\\foo.txt".into())
        );
        assert_eq!(
            win_splitdrive("C:/Temp/asdf/foo.txt"),
            ("C:".into(), "/Temp/asdf/foo.txt".into())
        );
        assert_eq!(
            win_splitdrive("\\\\server\\share\\dir\\f"),
            ("\\\\server\\share".into(), "\\dir\\f".into())
        );
        assert_eq!(
            win_splitdrive("\\\\server"),
            (String::new(), "\\\\server".into())
        );
        assert_eq!(win_splitdrive("relative"), (String::new(), "relative".into()));
    }

    #[test]
    fn test_win_split() {
        assert_eq!(win_basename("C:\\Temp\\asdf\\foo.txt"), "foo.txt");
        assert_eq!(win_basename("C:/Temp/asdf/foo.txt"), "foo.txt");
        assert_eq!(win_dirname("C:\\Temp\\asdf\\foo.txt"), "C:\\Temp\\asdf");
        assert_eq!(win_dirname("C:/Temp/asdf/foo.txt"), "C:/Temp/asdf");
        assert_eq!(win_dirname("C:\\foo"), "C:\\");
        assert_eq!(win_dirname("foo"), "");
    }
}
