use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::instrument;
use wikidoc::{render::Format, Exporter, Notebook, PageName};

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Render every page into a directory")]
pub struct Export {
    /// The output directory
    dest: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: ExportFormat,

    /// Also write an index of all pages under this name
    ///
    /// Defaults to `index_page` in the notebook configuration.
    #[arg(long, value_name = "NAME")]
    index_page: Option<PageName>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ExportFormat {
    #[default]
    Html,
    Plain,
    Wiki,
}

impl From<ExportFormat> for Format {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Html => Self::Html,
            ExportFormat::Plain => Self::Plain,
            ExportFormat::Wiki => Self::Wiki,
        }
    }
}

impl Export {
    #[cfg(test)]
    pub const fn new(dest: PathBuf, format: Format, index_page: Option<PageName>) -> Self {
        let format = match format {
            Format::Html => ExportFormat::Html,
            Format::Plain => ExportFormat::Plain,
            Format::Wiki => ExportFormat::Wiki,
        };
        Self {
            dest,
            format,
            index_page,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let notebook = Notebook::open(root)?;

        let index_page = match self.index_page {
            Some(index_page) => Some(index_page),
            None => notebook
                .config()
                .index_page
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(|e| anyhow::anyhow!("Invalid index_page in config: {e}"))?,
        };

        let mut exporter = Exporter::new(self.format.into());
        if let Some(index_page) = index_page {
            exporter = exporter.with_index(index_page);
        }

        let summary = exporter.export_all(&notebook, &self.dest)?;

        println!(
            "{}",
            format!("Exported {} pages to {}", summary.pages, self.dest.display()).success()
        );
        if let Some(index) = summary.index {
            println!("  Index: {}", index.display());
        }
        Ok(())
    }
}
