//! Include/exclude filtering for watch events.
//!
//! The [`EventFilter`] trait decides whether the paths of an event are
//! relevant. [`PatternFilter`] is the production implementation: an event is
//! watched iff at least one of its paths matches an include pattern and none
//! of its paths matches an exclude pattern.
//!
//! # Pattern Semantics
//!
//! Patterns are shell-style globs (`*`, `?`, `[...]`, `**`). `*` and `?` never
//! cross a `/`.
//!
//! - A relative pattern matches a trailing run of path segments, so `*.py`
//!   matches `main.py` anywhere in the tree and `ignore/*.py` matches
//!   `/home/project/ignore/myfile.py`.
//! - An absolute pattern must match the whole path.
//!
//! # Examples
//!
//! ```
//! use ptw_watcher::{EventFilter, PatternFilter};
//! use camino::Utf8Path;
//!
//! let filter = PatternFilter::new(&["*.py"], &["ignore/**"]).unwrap();
//!
//! assert!(filter.is_watched(&[Utf8Path::new("main.py")]));
//! assert!(!filter.is_watched(&[Utf8Path::new("main.pyc")]));
//! assert!(!filter.is_watched(&[Utf8Path::new("ignore/x.py")]));
//! ```

use camino::Utf8Path;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::WatchError;

/// Include pattern used when none is configured.
pub const DEFAULT_PATTERNS: &[&str] = &["*.py"];

/// A predicate deciding whether an event's paths should trigger a run.
///
/// Filters run on the watcher's delivery thread, so they must be [`Send`],
/// [`Sync`] and `'static`.
pub trait EventFilter: Send + Sync + 'static {
    /// Returns `true` if an event touching `paths` should trigger a run.
    ///
    /// `paths` holds the source path and, for moves, the destination path.
    fn is_watched(&self, paths: &[&Utf8Path]) -> bool;
}

/// Glob-based include/exclude filter.
///
/// Exclusion takes precedence: if any path matches an exclude pattern, the
/// event is rejected even when another path matches an include pattern.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    include: GlobSet,
    exclude: GlobSet,
    patterns: Vec<String>,
    ignore_patterns: Vec<String>,
}

impl PatternFilter {
    /// Builds a filter from include and exclude patterns.
    ///
    /// An empty include list falls back to [`DEFAULT_PATTERNS`]. Empty
    /// pattern strings are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidPattern`] for the first pattern that is
    /// not a valid glob.
    pub fn new<S: AsRef<str>>(patterns: &[S], ignore_patterns: &[S]) -> Result<Self, WatchError> {
        let mut include: Vec<String> = non_empty(patterns);
        if include.is_empty() {
            include = DEFAULT_PATTERNS.iter().map(|p| (*p).to_owned()).collect();
        }
        let exclude = non_empty(ignore_patterns);

        Ok(Self {
            include: build_set(&include)?,
            exclude: build_set(&exclude)?,
            patterns: include,
            ignore_patterns: exclude,
        })
    }

    /// Returns the effective include patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns the exclude patterns.
    #[must_use]
    pub fn ignore_patterns(&self) -> &[String] {
        &self.ignore_patterns
    }

    /// Returns `true` if `path` matches an include pattern.
    #[must_use]
    pub fn is_included(&self, path: &Utf8Path) -> bool {
        self.include.is_match(path.as_std_path())
    }

    /// Returns `true` if `path` matches an exclude pattern.
    #[must_use]
    pub fn is_excluded(&self, path: &Utf8Path) -> bool {
        self.exclude.is_match(path.as_std_path())
    }
}

impl Default for PatternFilter {
    fn default() -> Self {
        let include = DEFAULT_PATTERNS.iter().map(|p| (*p).to_owned()).collect::<Vec<_>>();
        Self {
            include: build_set(&include).unwrap_or_else(|_| GlobSet::empty()),
            exclude: GlobSet::empty(),
            patterns: include,
            ignore_patterns: Vec::new(),
        }
    }
}

impl EventFilter for PatternFilter {
    fn is_watched(&self, paths: &[&Utf8Path]) -> bool {
        if paths.iter().any(|path| self.is_excluded(path)) {
            return false;
        }
        paths.iter().any(|path| self.is_included(path))
    }
}

fn non_empty<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Rewrites a pattern so that relative patterns match as a path suffix.
fn anchor(pattern: &str) -> String {
    if pattern.starts_with('/') || pattern.starts_with("**") {
        pattern.to_owned()
    } else {
        format!("**/{pattern}")
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, WatchError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(&anchor(pattern))
            .literal_separator(true)
            .build()
            .map_err(|source| WatchError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| WatchError::InvalidPattern {
        pattern: patterns.join(","),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watched(filter: &PatternFilter, path: &str) -> bool {
        filter.is_watched(&[Utf8Path::new(path)])
    }

    fn includes(patterns: &[&str]) -> PatternFilter {
        PatternFilter::new(patterns, &[]).expect("valid patterns")
    }

    fn excludes(ignore_patterns: &[&str]) -> PatternFilter {
        PatternFilter::new(&[], ignore_patterns).expect("valid patterns")
    }

    #[test]
    fn test_default_patterns_watched() {
        let filter = includes(&[]);
        assert_eq!(filter.patterns(), ["*.py"]);
        for path in ["main.py", "./main.py", "/home/project/main.py", "tests/test_x.py"] {
            assert!(watched(&filter, path), "{path} should be watched");
        }
    }

    #[test]
    fn test_default_patterns_not_watched() {
        let filter = PatternFilter::default();
        for path in ["main.pyc", "sqlite.db", "/home/project/file.txt"] {
            assert!(!watched(&filter, path), "{path} should not be watched");
        }
    }

    #[test]
    fn test_custom_patterns_watched() {
        let cases: &[(&[&str], &str)] = &[
            (&["*.txt"], "file.txt"),
            (&["main.pyc"], "main.pyc"),
            (&["/home/path/example.txt"], "/home/path/example.txt"),
            (&["*some*.txt"], "/home/path/something.txt"),
        ];
        for (patterns, path) in cases {
            assert!(watched(&includes(patterns), path), "{patterns:?} vs {path}");
        }
    }

    #[test]
    fn test_custom_patterns_not_watched() {
        let cases: &[(&[&str], &str)] = &[
            (&["*.txt"], "file.txtf"),
            (&["*.pyi", "*.pdb"], "wrong.pdf"),
            (&["/home/path/example.txt"], "/home/path/wrong.txt"),
        ];
        for (patterns, path) in cases {
            assert!(!watched(&includes(patterns), path), "{patterns:?} vs {path}");
        }
    }

    #[test]
    fn test_ignore_patterns_not_watched() {
        let cases: &[(&[&str], &str)] = &[
            (&["ignore/*.py"], "ignore/myfile.py"),
            (&["ignore/**"], "ignore/main.py"),
            (&["ignore/**"], "ignore/x.py"),
            (&["*pytest*"], "/home/project/pytest.py"),
        ];
        for (ignore, path) in cases {
            assert!(!watched(&excludes(ignore), path), "{ignore:?} vs {path}");
        }
    }

    #[test]
    fn test_ignore_pattern_does_not_leak() {
        let filter = excludes(&["ignore/**"]);
        assert!(watched(&filter, "src/main.py"));
        assert!(watched(&filter, "not_ignore/main.py"));
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let filter = includes(&["src/*.py"]);
        assert!(watched(&filter, "/project/src/app.py"));
        assert!(!watched(&filter, "/project/src/pkg/app.py"));
    }

    #[test]
    fn test_move_destination_matches() {
        let filter = PatternFilter::default();
        assert!(filter.is_watched(&[Utf8Path::new("a.tmp"), Utf8Path::new("a.py")]));
        assert!(!filter.is_watched(&[Utf8Path::new("main.tmp"), Utf8Path::new("main.temp")]));
    }

    #[test]
    fn test_exclude_wins_over_include_across_paths() {
        let filter = PatternFilter::new(&["*.py"], &["*.tmp"]).expect("valid patterns");
        // The destination is included, but the source is excluded.
        assert!(!filter.is_watched(&[Utf8Path::new("a.tmp"), Utf8Path::new("a.py")]));
    }

    #[test]
    fn test_empty_pattern_strings_are_skipped() {
        let filter = PatternFilter::new(&["", " "], &[""]).expect("valid patterns");
        assert_eq!(filter.patterns(), ["*.py"]);
        assert!(filter.ignore_patterns().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = PatternFilter::new(&["[abc"], &[]).expect_err("unclosed class");
        assert!(matches!(err, WatchError::InvalidPattern { ref pattern, .. } if pattern == "[abc"));
    }
}
