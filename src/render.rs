//! Renderers from a [`Document`] to text formats.
//!
//! - [`wiki`]: back to the markup the parser reads
//! - [`plain`]: markup stripped
//! - [`html`]: an HTML fragment or page, with links resolved by a [`Linker`]

use serde::{Deserialize, Serialize};

use crate::domain::Document;

pub mod html;
mod linker;
pub mod plain;
pub mod wiki;

pub use linker::{Linker, RawLinker, StaticLinker};

/// A rendering target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Wiki markup.
    #[default]
    Wiki,
    /// Plain text.
    Plain,
    /// A standalone HTML page.
    Html,
}

impl Format {
    /// The file extension for files in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wiki | Self::Plain => "txt",
            Self::Html => "html",
        }
    }
}

/// Renders a document in the given format.
///
/// HTML links are rendered with their targets unchanged; use
/// [`html::render_page`] with a [`StaticLinker`] to resolve page links.
#[must_use]
pub fn render(document: &Document, format: Format) -> String {
    match format {
        Format::Wiki => wiki::render(document),
        Format::Plain => plain::render(document),
        Format::Html => {
            let title = document
                .title()
                .or_else(|| document.name().map(crate::domain::PageName::basename))
                .unwrap_or_default();
            html::render_page(document, title, &RawLinker)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const INPUT: &str = "====== Release ======\n* [[Home]]\n";

    #[test]
    fn dispatches_on_format() {
        let document = parse(INPUT).unwrap();
        assert_eq!(render(&document, Format::Wiki), INPUT);
        assert_eq!(render(&document, Format::Plain), "Release\n=======\n\n- Home\n");
        let page = render(&document, Format::Html);
        assert!(page.contains("<title>Release</title>"));
        assert!(page.contains("<a href=\"Home\" title=\"Home\">Home</a>"));
    }

    #[test]
    fn extensions() {
        assert_eq!(Format::Html.extension(), "html");
        assert_eq!(Format::Plain.extension(), "txt");
    }
}
