// src/watch/filter.rs

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled exclude globs for the change detector.
///
/// Patterns are relative to the watch root; the watcher passes relative
/// paths (e.g. `"bin/app"`) into [`ExcludeFilter::is_excluded`]. The build
/// destination is always excluded so writing the binary cannot trigger
/// another rebuild.
#[derive(Clone)]
pub struct ExcludeFilter {
    set: GlobSet,
    patterns: Vec<String>,
}

impl fmt::Debug for ExcludeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeFilter")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl ExcludeFilter {
    pub fn new(patterns: &[String], destination: &Path) -> Result<Self> {
        let mut all: Vec<String> = patterns.to_vec();
        if let Some(dest) = relative_destination(destination) {
            all.push(globset::escape(&dest));
        }

        let mut builder = GlobSetBuilder::new();
        for pat in &all {
            let glob = Glob::new(pat).with_context(|| format!("invalid exclude glob '{pat}'"))?;
            builder.add(glob);
        }
        let set = builder.build().context("building exclude glob set")?;

        Ok(Self { set, patterns: all })
    }

    /// A filter that excludes nothing.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// `./bin/app` -> `bin/app`; absolute destinations cannot be expressed
/// relative to the root and are skipped.
fn relative_destination(destination: &Path) -> Option<String> {
    if destination.is_absolute() {
        return None;
    }
    let cleaned: PathBuf = destination
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        return None;
    }
    Some(cleaned.to_string_lossy().replace('\\', "/"))
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
