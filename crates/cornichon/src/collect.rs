//! Feature collection: the parse cache and filesystem discovery.
//!
//! Feature files are immutable for the duration of a run, so parsing is
//! memoised in an explicit [`FeatureCache`] keyed by canonical path. The
//! cache is owned by the collection phase and never invalidated within one
//! process run.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use hashbrown::HashMap;

use crate::error::CollectError;
use crate::model::{Feature, build};
use crate::syntax::parse;

/// Parsed-feature cache keyed by canonical absolute path.
#[derive(Debug, Default)]
pub struct FeatureCache {
    entries: HashMap<Utf8PathBuf, Arc<Feature>>,
}

impl FeatureCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch a feature, parsing and validating it on first access.
    ///
    /// Later lookups of the same file, through any path spelling that
    /// canonicalises to it, return the cached document without re-reading
    /// the file.
    ///
    /// # Errors
    /// Returns [`CollectError`] for IO failures, syntax errors, or model
    /// validation failures.
    pub fn get_or_parse(&mut self, path: &Utf8Path) -> Result<Arc<Feature>, CollectError> {
        let abs = path
            .canonicalize_utf8()
            .map_err(|source| CollectError::Io {
                path: path.to_string(),
                source,
            })?;
        if let Some(feature) = self.entries.get(&abs) {
            return Ok(Arc::clone(feature));
        }
        let text = std::fs::read_to_string(&abs).map_err(|source| CollectError::Io {
            path: abs.to_string(),
            source,
        })?;
        let document = parse(&text, abs.as_str())?;
        let feature = Arc::new(build(document, abs.clone(), path.to_owned())?);
        self.entries.insert(abs, Arc::clone(&feature));
        Ok(feature)
    }
}

/// Collect features from files and directories.
///
/// Directories are walked recursively for `*.feature` files, in sorted
/// directory order so discovery is deterministic. Paths that canonicalise
/// to the same file are collected once. The result is sorted by feature
/// name, falling back to the file name for unnamed features.
///
/// # Errors
/// Returns the first [`CollectError`] encountered; callers wanting
/// per-file isolation can drive [`FeatureCache::get_or_parse`] themselves.
pub fn collect_features(
    paths: &[Utf8PathBuf],
    cache: &mut FeatureCache,
) -> Result<Vec<Arc<Feature>>, CollectError> {
    let mut files: Vec<Utf8PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_features(path, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }

    let mut features: Vec<Arc<Feature>> = Vec::new();
    for file in &files {
        let feature = cache.get_or_parse(file)?;
        if !features.iter().any(|f| f.path() == feature.path()) {
            features.push(feature);
        }
    }
    features.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
    Ok(features)
}

/// Recursively gather `*.feature` files under `dir` in sorted order.
fn walk_features(dir: &Utf8Path, out: &mut Vec<Utf8PathBuf>) -> Result<(), CollectError> {
    let io_error = |source| CollectError::Io {
        path: dir.to_string(),
        source,
    };
    let mut entries: Vec<Utf8PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(|p| {
            CollectError::NonUtf8Path {
                path: p.display().to_string(),
            }
        })?;
        entries.push(path);
    }
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk_features(&path, out)?;
        } else if path.extension() == Some("feature") {
            out.push(path);
        }
    }
    Ok(())
}
