//! Logical path normalization.
//!
//! Every path-taking facade operation runs its input through [`normalize`]
//! before doing anything else; it is the single enforcement point for path
//! safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{VfsError, VfsResult};

/// A normalized, slash-delimited logical path.
///
/// The empty path is the logical root. A `VfsPath` never starts or ends with
/// `/` and has no empty, `.` or `..` segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VfsPath(String);

impl VfsPath {
    /// The logical root.
    pub const ROOT: VfsPath = VfsPath(String::new());

    /// Normalize `raw` into a path.
    pub fn new(raw: &str) -> VfsResult<Self> {
        normalize(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the logical root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a (possibly multi-segment) relative path and normalize.
    pub fn join(&self, rest: &str) -> VfsResult<Self> {
        if self.is_root() {
            normalize(rest)
        } else {
            normalize(&format!("{}/{}", self.0, rest))
        }
    }

    /// Parent directory, or `None` for the root.
    pub fn parent(&self) -> Option<VfsPath> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rsplit_once('/') {
            Some((parent, _)) => VfsPath(parent.to_string()),
            None => VfsPath::ROOT,
        })
    }

    /// Last segment (empty for the root).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Returns true if `self` lies strictly below `dir`.
    pub fn is_descendant_of(&self, dir: &VfsPath) -> bool {
        if dir.is_root() {
            return !self.is_root();
        }
        self.0
            .strip_prefix(dir.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Deref for VfsPath {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VfsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VfsPath {
    type Err = VfsError;

    fn from_str(s: &str) -> VfsResult<Self> {
        normalize(s)
    }
}

impl TryFrom<String> for VfsPath {
    type Error = VfsError;

    fn try_from(s: String) -> VfsResult<Self> {
        normalize(&s)
    }
}

impl From<VfsPath> for String {
    fn from(p: VfsPath) -> Self {
        p.0
    }
}

/// Zero-width and bidi formatting characters that render as nothing.
fn is_unprintable(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{00AD}'
                | '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{FEFF}'
        )
}

/// Canonicalize a raw logical path.
///
/// Backslashes become `/`, unprintable characters are stripped, empty and
/// `.` segments are dropped and `..` pops the previous segment. A `..` with
/// nothing left to pop fails with [`VfsError::InvalidPath`] instead of
/// clamping at the root.
pub fn normalize(raw: &str) -> VfsResult<VfsPath> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !is_unprintable(*c))
        .map(|c| if c == '\\' { '/' } else { c })
        .collect();

    let mut parts: Vec<&str> = Vec::new();
    for segment in cleaned.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(VfsError::invalid_path(format!(
                        "{raw} is outside of the defined root"
                    )));
                }
            }
            other => parts.push(other),
        }
    }
    Ok(VfsPath(parts.join("/")))
}
