//! Exporting a notebook to a directory of rendered files.
//!
//! Each page `A:B:C` is written to `DEST/A/B/C.<ext>`, where the extension
//! follows the [`Format`]. HTML pages link to each other with relative
//! hrefs. An optional index page lists every exported page.

use std::{
    fmt::Write,
    fs, io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    domain::{name::Segment, Block, Bullet, Document, Inline, Item, PageName, Section, Text},
    render::{self, html, Format, StaticLinker},
    storage::{path_parser::construct_path_from_name, Notebook},
};

/// Renders notebook pages into an output directory.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    format: Format,
    index_page: Option<PageName>,
}

impl Exporter {
    /// Creates an exporter writing pages in `format`, without an index.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            format,
            index_page: None,
        }
    }

    /// Also write an index page with the given name.
    #[must_use]
    pub fn with_index(mut self, index_page: PageName) -> Self {
        self.index_page = Some(index_page);
        self
    }

    /// The output format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Renders a single page as it would be exported.
    #[must_use]
    pub fn render_page(&self, name: &PageName, document: &Document) -> String {
        match self.format {
            Format::Html => {
                let title = document.title().unwrap_or_else(|| name.basename());
                let linker = StaticLinker::new(name.clone(), self.format.extension());
                html::render_page(document, title, &linker)
            }
            format => render::render(document, format),
        }
    }

    /// Renders the index of the given pages.
    ///
    /// The HTML index is a nested list following the namespaces; the text
    /// formats use a flat list of links.
    #[must_use]
    pub fn render_index<'a>(
        &self,
        index: &PageName,
        pages: impl IntoIterator<Item = &'a PageName>,
    ) -> String {
        match self.format {
            Format::Html => {
                let linker = StaticLinker::new(index.clone(), self.format.extension());
                html::wrap_page(index.basename(), &html_index(&linker, pages))
            }
            format => render::render(&text_index(index, pages), format),
        }
    }

    /// Exports every page of the notebook into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written, or if the index page
    /// name collides with a page in the notebook.
    #[tracing::instrument(level = "debug", skip(self, notebook))]
    pub fn export_all(&self, notebook: &Notebook, dest: &Path) -> Result<ExportSummary, ExportError> {
        if let Some(index) = self.index_page.as_ref().filter(|i| notebook.get(i).is_some()) {
            return Err(ExportError::IndexCollision(index.clone()));
        }

        let extension = self.format.extension();
        let pages: Vec<(&PageName, &Document)> = notebook.pages().collect();

        pages.into_par_iter().try_for_each(|(name, document)| {
            let path = construct_path_from_name(dest, name, extension);
            tracing::trace!("Exporting {name} to {}", path.display());
            write_file(&path, &self.render_page(name, document))
        })?;

        let index = match &self.index_page {
            Some(index) => {
                let path = construct_path_from_name(dest, index, extension);
                write_file(&path, &self.render_index(index, notebook.pages().map(|(n, _)| n)))?;
                Some(path)
            }
            None => None,
        };

        tracing::debug!("Exported {} pages to {}", notebook.len(), dest.display());
        Ok(ExportSummary {
            pages: notebook.len(),
            index,
        })
    }
}

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// The number of pages written, excluding the index.
    pub pages: usize,
    /// The index file, if one was written.
    pub index: Option<PathBuf>,
}

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// An output file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The index would overwrite an exported page.
    #[error("Index page {0} would overwrite a page of the same name")]
    IndexCollision(PageName),
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    let result = match path.parent() {
        Some(parent) => fs::create_dir_all(parent).and_then(|()| fs::write(path, content)),
        None => fs::write(path, content),
    };
    result.map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn html_index<'a>(
    linker: &StaticLinker,
    pages: impl IntoIterator<Item = &'a PageName>,
) -> String {
    let mut out = String::from("<ul>\n");
    let mut open: Vec<&str> = Vec::new();

    for page in pages {
        let namespace: Vec<&str> = page.namespace().iter().map(Segment::as_str).collect();
        let common = open
            .iter()
            .zip(&namespace)
            .take_while(|(a, b)| a == b)
            .count();

        while open.len() > common {
            out.push_str("</ul>\n</li>\n");
            open.pop();
        }
        for segment in &namespace[common..] {
            let _ = writeln!(out, "<li>{}\n<ul>", html::escape(segment));
            open.push(*segment);
        }

        let label = html::escape(page.basename());
        let _ = writeln!(
            out,
            "<li><a href=\"{}\" title=\"{label}\">{label}</a></li>",
            html::escape(&linker.link_page(page))
        );
    }

    for _ in open {
        out.push_str("</ul>\n</li>\n");
    }
    out.push_str("</ul>\n");
    out
}

fn text_index<'a>(index: &PageName, pages: impl IntoIterator<Item = &'a PageName>) -> Document {
    let mut section = Section::new(1, index.basename());
    for page in pages {
        let link = Inline::Link {
            target: format!(":{page}"),
            label: Some(page.to_string()),
        };
        section.push(Block::Item(Item::new(Bullet::Plain, Text::new(vec![link]))));
    }

    let mut document = Document::new();
    document.push_section(section);
    document
}
