// src/watch/patterns.rs

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::Globs;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Compiled include/exclude patterns, anchored at a working directory.
///
/// Relative patterns are joined onto `cwd` before compiling, so `matches`
/// expects paths in the same form the filesystem hands back (either both
/// relative to `"."` or both absolute).
#[derive(Clone)]
pub struct GlobMatcher {
    include: GlobSet,
    exclude: Option<GlobSet>,
    /// Non-glob prefix of each positive pattern, in pattern order.
    bases: Vec<PathBuf>,
    /// Positive patterns without any glob syntax.
    literals: Vec<PathBuf>,
    /// Where each positive pattern starts searching, in pattern order.
    roots: Vec<SearchRoot>,
}

#[derive(Clone, Debug)]
enum SearchRoot {
    /// Walk this directory.
    Walk(PathBuf),
    /// Look at this one path only.
    Literal(PathBuf),
}

impl fmt::Debug for GlobMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobMatcher")
            .field("bases", &self.bases)
            .field("literals", &self.literals)
            .finish_non_exhaustive()
    }
}

impl GlobMatcher {
    pub fn compile(globs: &Globs, cwd: &Path) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut has_exclude = false;
        let mut bases = Vec::new();
        let mut literals = Vec::new();
        let mut roots = Vec::new();

        for raw in globs.patterns() {
            let (negated, pattern) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let anchored = anchor(cwd, pattern);
            let text = path_str(&anchored);
            let glob = GlobBuilder::new(&text)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid glob pattern: {raw}"))?;

            if negated {
                exclude.add(glob);
                has_exclude = true;
                continue;
            }

            include.add(glob);
            if is_glob(&text) {
                let base = glob_base(&anchored);
                roots.push(SearchRoot::Walk(base.clone()));
                bases.push(base);
            } else {
                bases.push(anchored.parent().map(Path::to_path_buf).unwrap_or_else(|| anchored.clone()));
                roots.push(SearchRoot::Literal(anchored.clone()));
                literals.push(anchored);
            }
        }

        let exclude = if has_exclude {
            Some(exclude.build()?)
        } else {
            None
        };

        Ok(Self {
            include: include.build()?,
            exclude,
            bases,
            literals,
            roots,
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        let text = path_str(path);
        if !self.include.is_match(&text) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(&text),
            None => true,
        }
    }

    /// Directories a search (or a watch) has to start from.
    pub fn bases(&self) -> &[PathBuf] {
        &self.bases
    }

    pub fn literals(&self) -> &[PathBuf] {
        &self.literals
    }

    /// The base a matched path belongs to: the longest base that prefixes it.
    pub fn base_for(&self, path: &Path) -> Option<&Path> {
        self.bases
            .iter()
            .filter(|b| path.starts_with(b))
            .max_by_key(|b| b.components().count())
            .map(PathBuf::as_path)
    }
}

/// Join a relative pattern onto `cwd`, dropping interior `.` components.
fn anchor(cwd: &Path, pattern: &str) -> PathBuf {
    let joined = cwd.join(pattern);
    let mut out = PathBuf::new();
    for (i, comp) in joined.components().enumerate() {
        match comp {
            Component::CurDir if i > 0 => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn is_glob(text: &str) -> bool {
    text.contains(GLOB_META)
}

/// Leading components of `pattern` that contain no glob syntax.
fn glob_base(pattern: &Path) -> PathBuf {
    let mut base = PathBuf::new();
    for comp in pattern.components() {
        if is_glob(&comp.as_os_str().to_string_lossy()) {
            break;
        }
        base.push(comp.as_os_str());
    }
    if base.as_os_str().is_empty() {
        base.push(".");
    }
    base
}

pub(crate) fn path_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Collect every file the patterns select, in pattern order, without
/// duplicates. Literal patterns are looked up directly; only glob bases are
/// walked.
pub fn collect_matching_files(fs: &dyn FileSystem, matcher: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for root in &matcher.roots {
        let base = match root {
            SearchRoot::Literal(path) => {
                if fs.is_file(path) && matcher.matches(path) && !files.contains(path) {
                    files.push(path.clone());
                }
                continue;
            }
            SearchRoot::Walk(base) => base,
        };
        if fs.is_file(base) {
            if matcher.matches(base) && !files.contains(base) {
                files.push(base.clone());
            }
            continue;
        }
        if !fs.is_dir(base) {
            continue;
        }

        let mut found = Vec::new();
        let mut stack = vec![base.clone()];
        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) && matcher.matches(&path) {
                    found.push(path);
                }
            }
        }
        found.sort();
        for path in found {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    Ok(files)
}
