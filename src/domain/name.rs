use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// A single validated segment of a page name.
///
/// Segments are non-empty, carry no leading or trailing whitespace, do not
/// start with `.`, and contain neither the `:` namespace separator nor a
/// path separator. Underscores are read as spaces, so `Release_Notes` and
/// `Release Notes` are the same segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment(NonEmptyString);

impl Segment {
    /// Creates a new `Segment` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSegmentError` if the string is empty, has surrounding
    /// whitespace, starts with `.`, or contains `:`, `/` or `\`.
    pub fn new(s: String) -> Result<Self, InvalidSegmentError> {
        let s = s.replace('_', " ");
        // `.` and `..` would escape the notebook; other dot names are hidden
        if s.trim() != s || s.starts_with('.') || s.contains([':', '/', '\\']) {
            return Err(InvalidSegmentError(s));
        }
        let non_empty = NonEmptyString::new(s).map_err(InvalidSegmentError)?;
        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The segment as it appears in a file name (spaces become underscores).
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.as_str().replace(' ', "_")
    }
}

impl Deref for Segment {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid page name segment.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid page name segment '{0}': must be non-empty, trimmed, not start with '.', and free of ':' and '/'"
)]
pub struct InvalidSegmentError(String);

/// The name of a page within a notebook.
///
/// Format: `{NAMESPACE:}*{BASENAME}`, e.g. `Dev:Release Checklist`.
/// The page `Dev:Release Checklist` is stored at `Dev/Release_Checklist.txt`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageName {
    segments: Vec<Segment>,
}

impl PageName {
    /// Creates a page name from its segments.
    ///
    /// Returns `None` when `segments` is empty.
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Returns the segments of the name.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The last segment, e.g. `Release` for `Dev:Release`.
    #[must_use]
    pub fn basename(&self) -> &str {
        self.segments
            .last()
            .map_or("", Segment::as_str)
    }

    /// The namespace segments, excluding the basename.
    #[must_use]
    pub fn namespace(&self) -> &[Segment] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Returns the sub-page `self:segment`.
    #[must_use]
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Resolves a link target written on this page.
    ///
    /// - `+child` is a sub-page of this page.
    /// - `:abs:name` is absolute from the notebook root.
    /// - `name` (or `name:sub`) is resolved next to this page, in its
    ///   namespace.
    /// - URLs (`scheme://...`, `mailto:`) and file paths (`./`, `../`, `/`,
    ///   `~`) are external and returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is neither external nor a valid page
    /// name.
    pub fn resolve(&self, target: &str) -> Result<LinkTarget, Error> {
        let target = target.trim();
        if is_external(target) {
            return Ok(LinkTarget::External(target.to_string()));
        }

        if let Some(child) = target.strip_prefix('+') {
            let relative: Self = child.parse()?;
            let mut segments = self.segments.clone();
            segments.extend(relative.segments);
            return Ok(LinkTarget::Page(Self { segments }));
        }

        if target.starts_with(':') {
            return Ok(LinkTarget::Page(target.parse()?));
        }

        let relative: Self = target.parse()?;
        let mut segments = self.namespace().to_vec();
        segments.extend(relative.segments);
        Ok(LinkTarget::Page(Self { segments }))
    }
}

fn is_external(target: &str) -> bool {
    target.contains("://")
        || target.starts_with("mailto:")
        || target.starts_with("./")
        || target.starts_with("../")
        || target.starts_with('/')
        || target.starts_with('~')
}

/// The destination of a link once resolved against the page it appears on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Another page in the same notebook.
    Page(PageName),
    /// A URL or file path outside the notebook.
    External(String),
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let joined = self
            .segments
            .iter()
            .map(Segment::as_str)
            .collect::<Vec<_>>()
            .join(":");
        f.write_str(&joined)
    }
}

/// Errors that can occur when parsing a page name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The name has no segments.
    #[error("Invalid page name: empty")]
    Empty,

    /// One of the segments is invalid.
    #[error(transparent)]
    Segment(#[from] InvalidSegmentError),
}

impl FromStr for PageName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches(':');
        if s.is_empty() {
            return Err(Error::Empty);
        }

        let segments = s
            .split(':')
            .map(|segment| Segment::new(segment.trim().to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }
}

impl TryFrom<&str> for PageName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

impl Serialize for PageName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PageName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
