//! Turning theme file paths into route keys, and request paths into
//! requested routes. Pure string operations, no file system access.

use std::path::{Path, Component};

use anyhow::{Result, bail, anyhow};


/// The part of a file name before its first dot, e.g. `login` for
/// `login.hbs` or `login.en.hbs`.
pub fn name_without_extensions(filename: &str) -> &str {
    match filename.find('.') {
        Some(i) => &filename[..i],
        None => filename
    }
}

/// Map the path of a file below `dir` to its route key: the path
/// relative to `dir`, with the extension of the last segment removed
/// and segments joined with `/`, without a leading separator.
/// E.g. `theme/pages` + `theme/pages/unauthenticated/login.hbs` ->
/// `unauthenticated/login`.
pub fn route_key(dir: &Path, file: &Path) -> Result<String> {
    let rel = file.strip_prefix(dir).map_err(
        |_| anyhow!("{:?} is not below {:?}", file, dir))?;
    let mut segments: Vec<&str> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(s) => segments.push(
                s.to_str().ok_or_else(
                    || anyhow!("path is not valid unicode: {:?}",
                               rel.to_string_lossy()))?),
            Component::CurDir => (),
            _ => bail!("unexpected path component in {:?}", rel),
        }
    }
    let last = match segments.pop() {
        Some(last) => last,
        None => bail!("empty path relative to {:?}", dir),
    };
    let stem = name_without_extensions(last);
    if stem.is_empty() {
        bail!("file name without a stem: {:?}", rel);
    }
    segments.push(stem);
    Ok(segments.join("/"))
}

/// The route requested by a URL path: one leading slash removed,
/// trailing slashes removed. `/` and the empty string give `""`.
pub fn requested_route(url_path: &str) -> &str {
    let s = url_path.strip_prefix('/').unwrap_or(url_path);
    s.trim_end_matches('/')
}
