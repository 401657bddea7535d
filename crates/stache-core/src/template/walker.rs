use std::path::{Path, PathBuf};

use log::debug;
use regex_lite::Regex;
use walkdir::WalkDir;

use crate::error::{Result, StacheError};

/// Matches template files by extension and strips it to derive names.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    pattern: Regex,
}

impl TemplateMatcher {
    /// Build a matcher for one or more extensions (without the leading dot).
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| regex_lite::escape(ext.as_ref()))
            .collect();
        let pattern = Regex::new(&format!(r"\.(?:{})$", alternatives.join("|")))
            .map_err(|e| StacheError::InvalidMatcher { source: e })?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }

    /// Strip the matched extension, or `None` if the file name does not match.
    pub fn strip<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        self.pattern
            .find(file_name)
            .map(|m| &file_name[..m.start()])
    }
}

/// A template file found under a source folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to the folder, extension stripped, segments joined by `/`.
    pub name: String,
    /// Sibling `.json` file sharing the template's base name.
    pub data_path: PathBuf,
}

/// Lazily walk `folder` and yield every file whose name matches.
///
/// Entries are sorted by file name so the discovery order is stable across
/// platforms. A missing folder yields nothing.
pub fn discover<'a>(
    folder: &'a Path,
    matcher: &'a TemplateMatcher,
) -> impl Iterator<Item = Result<DiscoveredFile>> + 'a {
    let walker = folder.is_dir().then(|| {
        WalkDir::new(folder)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
    });

    walker.into_iter().flatten().filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let context = match e.path() {
                    Some(p) => format!("walking {}", p.display()),
                    None => format!("walking {}", folder.display()),
                };
                return Some(Err(StacheError::Io {
                    context,
                    source: e.into(),
                }));
            }
        };

        if !entry.file_type().is_file() {
            return None;
        }

        let rel_path = entry.path().strip_prefix(folder).ok()?;
        let Some(file_name) = entry.file_name().to_str() else {
            debug!("skipping {}: file name is not UTF-8", entry.path().display());
            return None;
        };
        let stem = matcher.strip(file_name)?.to_string();
        let Some(name) = derive_name(rel_path, &stem) else {
            debug!("skipping {}: folder name is not UTF-8", entry.path().display());
            return None;
        };
        let data_path = entry.path().with_file_name(format!("{stem}.json"));

        debug!("discovered {} as '{}'", entry.path().display(), name);

        Some(Ok(DiscoveredFile {
            path: entry.path().to_path_buf(),
            name,
            data_path,
        }))
    })
}

/// Join the parent directories of `rel_path` with `stem` using `/`.
fn derive_name(rel_path: &Path, stem: &str) -> Option<String> {
    let mut segments: Vec<&str> = rel_path
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    segments.push(stem);
    Some(segments.join("/"))
}
