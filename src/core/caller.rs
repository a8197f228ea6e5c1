//! Caller resolution: mapping an emission call to a source file and line
//!
//! The native call-site facility in Rust is `#[track_caller]`: every public
//! emission method, facade function and macro target in this crate carries
//! the attribute, so `Location::caller()` inside the logger reports the
//! application's call site. Each forwarding layer must keep the attribute;
//! a layer without it silently shifts every reported location to itself.
//!
//! The numeric stack depth stored in a [`Record`] mirrors that contract: it
//! grows by exactly one for every forwarding layer between the public entry
//! point and the resolver, and is handed to the [`CallerResolver`] for
//! resolvers that walk frames themselves.
//!
//! `Location::file()` is the path the compiler was given. For crates in the
//! current workspace it is relative (`src/main.rs`), so absolute
//! [`SourceRoots`] never match them and full-path mode shows the relative
//! path as is. Stripping applies to absolute paths only, such as registry
//! dependencies or builds using `--remap-path-prefix`.

use super::formatter::FormatSettings;
use super::record::Record;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

/// File marker used when no frame information is available
pub const UNKNOWN_FILE: &str = "???";

/// Resolved source position of a log call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub file: String,
    pub line: i64,
}

impl CallSite {
    pub fn new(file: impl Into<String>, line: i64) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// `???:-1`
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_FILE, -1)
    }

    pub fn is_unknown(&self) -> bool {
        self.file == UNKNOWN_FILE && self.line == -1
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Unstripped frame information reported by a [`CallerResolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub path: Cow<'static, str>,
    pub line: u32,
}

impl Frame {
    pub fn new(path: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// Capability that locates the originating frame of a record.
///
/// Implementations must not panic; returning `None` yields the unknown
/// marker. Tests inject deterministic resolvers through this trait.
pub trait CallerResolver: Send + Sync {
    fn locate(&self, record: &Record) -> Option<Frame>;
}

/// Default resolver backed by the location captured with `#[track_caller]`
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackedCallerResolver;

impl CallerResolver for TrackedCallerResolver {
    fn locate(&self, record: &Record) -> Option<Frame> {
        record
            .location()
            .map(|location| Frame::new(location.file(), location.line()))
    }
}

impl<F> CallerResolver for F
where
    F: Fn(&Record) -> Option<Frame> + Send + Sync,
{
    fn locate(&self, record: &Record) -> Option<Frame> {
        self(record)
    }
}

/// Ordered set of source-root prefixes stripped in full-path mode.
///
/// Each root is normalized to forward slashes with exactly one trailing
/// separator. Longer roots are kept ahead of shorter ones so the first match
/// strips the most context. Reads vastly outnumber writes, so the list sits
/// behind a reader-writer lock.
#[derive(Debug, Default)]
pub struct SourceRoots {
    roots: RwLock<Vec<String>>,
}

static GLOBAL_ROOTS: OnceLock<Arc<SourceRoots>> = OnceLock::new();

impl SourceRoots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roots = Self::new();
        for path in paths {
            roots.add(path);
        }
        roots
    }

    /// Process-wide root set, seeded with the parent of the working directory
    pub fn global() -> Arc<SourceRoots> {
        Arc::clone(GLOBAL_ROOTS.get_or_init(|| {
            let roots = SourceRoots::new();
            if let Ok(cwd) = std::env::current_dir() {
                if let Some(parent) = parent_prefix(&cwd.to_string_lossy()) {
                    roots.add(parent);
                }
            }
            Arc::new(roots)
        }))
    }

    /// Register a root. Returns `false` for empty or already-known roots.
    pub fn add(&self, path: impl AsRef<str>) -> bool {
        let Some(root) = normalize_root(path.as_ref()) else {
            return false;
        };
        let mut roots = self.roots.write();
        if roots.iter().any(|existing| *existing == root) {
            return false;
        }
        let pos = roots
            .iter()
            .position(|existing| existing.len() < root.len())
            .unwrap_or(roots.len());
        roots.insert(pos, root);
        true
    }

    /// Register the parent directory of a build directory.
    ///
    /// Returns the registered prefix, or `None` when `dir` has no parent.
    pub fn add_build_dir(&self, dir: impl AsRef<str>) -> Option<String> {
        let prefix = parent_prefix(dir.as_ref())?;
        self.add(&prefix);
        Some(prefix)
    }

    pub fn roots(&self) -> Vec<String> {
        self.roots.read().clone()
    }

    pub fn len(&self) -> usize {
        self.roots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.read().is_empty()
    }

    /// Remove the first matching root from `path`, or return it unchanged
    pub fn strip(&self, path: &str) -> String {
        let roots = self.roots.read();
        roots
            .iter()
            .find_map(|root| path.strip_prefix(root.as_str()))
            .unwrap_or(path)
            .to_string()
    }
}

/// Everything after the last `/`
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

fn to_forward_slashes(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

fn normalize_root(path: &str) -> Option<String> {
    let path = to_forward_slashes(path.trim());
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("{trimmed}/"))
}

/// Parent directory of `dir` with a trailing separator
fn parent_prefix(dir: &str) -> Option<String> {
    let dir = to_forward_slashes(dir.trim());
    let trimmed = dir.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(pos) if pos > 0 => Some(trimmed[..=pos].to_string()),
        _ => None,
    }
}

/// Resolve the call site of `record` using `settings`.
///
/// Never panics: a resolver that fails or panics yields [`CallSite::unknown`].
pub fn resolve(record: &Record, settings: &FormatSettings) -> CallSite {
    let located = catch_unwind(AssertUnwindSafe(|| settings.resolver.locate(record)));
    let Ok(Some(frame)) = located else {
        return CallSite::unknown();
    };

    let path = to_forward_slashes(&frame.path);
    let file = if settings.full_path {
        settings.source_roots.strip(&path)
    } else {
        basename(&path).to_string()
    };
    CallSite::new(file, i64::from(frame.line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/home/user/project/pkg/file.rs"), "file.rs");
        assert_eq!(basename("file.rs"), "file.rs");
        assert_eq!(basename("dir/"), "");
    }

    #[test]
    fn test_strip_first_matching_root() {
        let roots = SourceRoots::from_paths(["/home/user/project/"]);
        assert_eq!(roots.strip("/home/user/project/pkg/file.rs"), "pkg/file.rs");
        assert_eq!(roots.strip("/opt/other/file.rs"), "/opt/other/file.rs");
    }

    #[test]
    fn test_roots_are_normalized() {
        let roots = SourceRoots::new();
        assert!(roots.add(r"C:\work\proj\\"));
        assert!(roots.add("/srv/app"));
        assert!(!roots.add("/srv/app/"));
        assert!(!roots.add("   "));
        assert_eq!(roots.roots(), vec!["C:/work/proj/", "/srv/app/"]);
    }

    #[test]
    fn test_longer_roots_tried_first() {
        let roots = SourceRoots::from_paths(["/home/user/", "/home/user/project/"]);
        assert_eq!(roots.roots()[0], "/home/user/project/");
        assert_eq!(roots.strip("/home/user/project/src/lib.rs"), "src/lib.rs");
        assert_eq!(roots.strip("/home/user/notes/a.rs"), "notes/a.rs");
    }

    #[test]
    fn test_build_dir_registers_parent() {
        let roots = SourceRoots::new();
        assert_eq!(
            roots.add_build_dir("/home/user/project/cmd/"),
            Some("/home/user/project/".to_string())
        );
        assert_eq!(roots.strip("/home/user/project/cmd/main.rs"), "cmd/main.rs");
        assert_eq!(roots.add_build_dir("relative"), None);
    }

    #[test]
    fn test_call_site_display() {
        assert_eq!(CallSite::new("pkg/a.rs", 7).to_string(), "pkg/a.rs:7");
        assert_eq!(CallSite::unknown().to_string(), "???:-1");
        assert!(CallSite::unknown().is_unknown());
    }
}
