//! Reading a theme from disk: the `partials`, `pages` and `specs`
//! subdirectories, every file keyed by its route key.

use std::{path::{Path, PathBuf}, fs, collections::HashMap};

use kstring::KString;
use walkdir::{DirEntry, WalkDir};

use crate::path::{route_key, name_without_extensions};


#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("can't read theme directory {path:?}: {source}")]
    ReadDir { path: PathBuf, source: std::io::Error },
    #[error("can't read theme file {path:?}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid theme file path: {0:#}")]
    BadPath(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeFile {
    pub contents: String,
    /// Base name including extension, e.g. `login.hbs`
    pub filename: String,
    /// Base name up to the first dot, e.g. `login`
    pub name: String,
    /// e.g. `unauthenticated/login`
    pub route_key: KString,
    pub path: PathBuf,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// All plain files below `dir`, depth-first in file name order.
/// Hidden entries are skipped, symlinks followed (loops are errors).
fn theme_filepaths(dir: &Path) -> Result<Vec<PathBuf>, ThemeError> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|e| ThemeError::ReadDir {
            path: e.path().unwrap_or(dir).to_owned(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Read the file at `path` below `dir`. Contents that are not valid
/// UTF-8 are decoded lossily.
pub fn read_theme_file(dir: &Path, path: PathBuf) -> Result<ThemeFile, ThemeError> {
    let bytes = fs::read(&path).map_err(
        |source| ThemeError::ReadFile { path: path.clone(), source })?;
    let contents = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("theme file {path:?} is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    let key = route_key(dir, &path).map_err(ThemeError::BadPath)?;
    let filename = path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name_without_extensions(&filename).to_string();
    Ok(ThemeFile {
        contents,
        filename,
        name,
        route_key: KString::from_string(key),
        path,
    })
}

/// Read all files below `dir`. Any unreadable file fails the whole
/// read.
pub fn read_theme_dir(dir: &Path) -> Result<Vec<ThemeFile>, ThemeError> {
    theme_filepaths(dir)?
        .into_iter()
        .map(|path| read_theme_file(dir, path))
        .collect()
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Partials,
    Pages,
    Specs,
}

impl ThemeKind {
    pub fn dirname(self) -> &'static str {
        match self {
            ThemeKind::Partials => "partials",
            ThemeKind::Pages => "pages",
            ThemeKind::Specs => "specs",
        }
    }

    pub fn members() -> &'static [Self] {
        &[ThemeKind::Partials, ThemeKind::Pages, ThemeKind::Specs]
    }
}

/// Two or more files in the same theme subdirectory mapping to the
/// same route key. The last one in enumeration order is the one
/// used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRouteKey {
    pub kind: ThemeKind,
    pub route_key: KString,
    pub paths: Vec<PathBuf>,
}

impl std::fmt::Display for DuplicateRouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.paths.last().map(|p| p.to_string_lossy()).unwrap_or_default();
        write!(f, "{} route key {:?} is defined by {} files, using {:?}",
               self.kind.dirname(), self.route_key.as_str(), self.paths.len(), used)
    }
}

/// A snapshot of a theme as read from disk.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub partials: Vec<ThemeFile>,
    pub pages: Vec<ThemeFile>,
    pub specs: Vec<ThemeFile>,
}

impl Theme {
    pub fn read(root: &Path) -> Result<Theme, ThemeError> {
        Ok(Theme {
            partials: read_theme_dir(&root.join(ThemeKind::Partials.dirname()))?,
            pages: read_theme_dir(&root.join(ThemeKind::Pages.dirname()))?,
            specs: read_theme_dir(&root.join(ThemeKind::Specs.dirname()))?,
        })
    }

    pub fn files(&self, kind: ThemeKind) -> &[ThemeFile] {
        match kind {
            ThemeKind::Partials => &self.partials,
            ThemeKind::Pages => &self.pages,
            ThemeKind::Specs => &self.specs,
        }
    }

    /// Report route keys that are defined more than once per
    /// subdirectory.
    pub fn validate(&self) -> Vec<DuplicateRouteKey> {
        let mut out = Vec::new();
        for &kind in ThemeKind::members() {
            let mut seen: HashMap<&str, Vec<PathBuf>> = HashMap::new();
            let mut order: Vec<&str> = Vec::new();
            for file in self.files(kind) {
                let paths = seen.entry(file.route_key.as_str()).or_insert_with(|| {
                    order.push(file.route_key.as_str());
                    Vec::new()
                });
                paths.push(file.path.clone());
            }
            for key in order {
                if let Some(paths) = seen.remove(key) {
                    if paths.len() > 1 {
                        out.push(DuplicateRouteKey {
                            kind,
                            route_key: KString::from_ref(key),
                            paths,
                        });
                    }
                }
            }
        }
        out
    }
}
