//! Link resolution for rendered output.
//!
//! A [`Linker`] turns the raw target of a `[[link]]` into an href. The
//! [`StaticLinker`] is used for exports: it resolves page links relative to
//! the page being rendered and produces relative file paths.

use crate::domain::{name::Segment, LinkTarget, PageName};

/// Resolves link targets to hrefs.
pub trait Linker {
    /// Returns the href for a link target, or `None` if the target cannot be
    /// resolved and should be rendered as plain text.
    fn href(&self, target: &str) -> Option<String>;
}

/// A linker that uses link targets verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawLinker;

impl Linker for RawLinker {
    fn href(&self, target: &str) -> Option<String> {
        Some(target.to_string())
    }
}

/// Links between pages of an exported notebook.
///
/// Each page `A:B:C` is exported to `A/B/C.<extension>`; hrefs are relative
/// to the directory of the page being rendered.
#[derive(Debug, Clone)]
pub struct StaticLinker {
    page: PageName,
    extension: String,
}

impl StaticLinker {
    /// Creates a linker for links appearing on `page`.
    #[must_use]
    pub fn new(page: PageName, extension: impl Into<String>) -> Self {
        Self {
            page,
            extension: extension.into(),
        }
    }

    /// The relative href from the current page to another page.
    #[must_use]
    pub fn link_page(&self, target: &PageName) -> String {
        let from_dir: Vec<String> = self
            .page
            .namespace()
            .iter()
            .map(Segment::file_stem)
            .collect();
        let to: Vec<String> = target.segments().iter().map(Segment::file_stem).collect();
        let (to_dir, file) = to.split_at(to.len() - 1);

        let common = from_dir
            .iter()
            .zip(to_dir)
            .take_while(|(a, b)| a == b)
            .count();

        let mut href = if from_dir.len() == common {
            "./".to_string()
        } else {
            "../".repeat(from_dir.len() - common)
        };
        for segment in &to_dir[common..] {
            href.push_str(segment);
            href.push('/');
        }
        href.push_str(&file[0]);
        href.push('.');
        href.push_str(&self.extension);
        href
    }
}

impl Linker for StaticLinker {
    fn href(&self, target: &str) -> Option<String> {
        match self.page.resolve(target) {
            Ok(LinkTarget::Page(page)) => Some(self.link_page(&page)),
            Ok(LinkTarget::External(url)) => Some(url),
            Err(error) => {
                tracing::debug!("Unresolvable link '{target}' on {}: {error}", self.page);
                None
            }
        }
    }
}
