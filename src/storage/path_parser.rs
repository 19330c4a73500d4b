//! Path parsing utilities for notebook pages
//!
//! Page names map onto the directory structure of the notebook:
//! namespaces are subfolders and the basename is the file stem, with spaces
//! stored as underscores.
//!
//! - `Dev:Release Checklist` ↔ `Dev/Release_Checklist.txt`
//! - `Home` ↔ `Home.txt`

use std::path::{Component, Path, PathBuf};

use crate::domain::{
    name::{InvalidSegmentError, Segment},
    PageName,
};

/// Parse a page name from a file path.
///
/// # Errors
///
/// Returns an error if:
/// - The path is not below `root` or is not valid UTF-8
/// - Any path component is not a valid page name segment
pub fn parse_name_from_path(path: &Path, root: &Path) -> Result<PageName, ParseError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ParseError::InvalidPath)?;
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or(ParseError::InvalidPath)?;

    let mut segments = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|component| match component {
                    Component::Normal(s) => Some(s.to_str().ok_or(ParseError::InvalidPath)),
                    _ => None,
                })
                .map(|component| component.and_then(segment_from_file_stem))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    segments.push(segment_from_file_stem(stem)?);

    PageName::new(segments).ok_or(ParseError::InvalidPath)
}

fn segment_from_file_stem(stem: &str) -> Result<Segment, ParseError> {
    Segment::new(stem.to_string()).map_err(ParseError::Segment)
}

/// Construct a file path from a page name.
///
/// Namespace segments become subdirectories of `root` and the basename
/// becomes the file name, with the given extension.
#[must_use]
pub fn construct_path_from_name(root: &Path, name: &PageName, extension: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in name.namespace() {
        path.push(segment.file_stem());
    }
    path.push(format!("{}.{extension}", name.basename().replace(' ', "_")));
    path
}

/// Errors that can occur during path parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The path is not below the notebook root or is not valid UTF-8.
    #[error("Invalid file path")]
    InvalidPath,

    /// A path component is not a valid page name segment.
    #[error("Invalid page name: {0}")]
    Segment(#[from] InvalidSegmentError),
}
