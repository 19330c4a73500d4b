use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::instrument;
use wikidoc::{
    render::{html, plain, wiki, StaticLinker},
    Notebook, PageName,
};

#[derive(Debug, Parser)]
#[command(about = "Render a page")]
pub struct Show {
    /// The name of the page, e.g. `Projects:Wikidoc`
    name: PageName,

    /// Output format
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Canonical wiki markup
    #[default]
    Wiki,
    /// Text with the markup removed
    Plain,
    /// A standalone HTML page
    Html,
    /// The parsed document as JSON
    Json,
}

impl Show {
    #[cfg(test)]
    pub const fn new(name: PageName, output: OutputFormat) -> Self {
        Self { name, output }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let notebook = Notebook::open(root)?;

        let Some(document) = notebook.get(&self.name) else {
            anyhow::bail!("Page {} not found", self.name);
        };

        match self.output {
            OutputFormat::Wiki => print!("{}", wiki::render(document)),
            OutputFormat::Plain => print!("{}", plain::render(document)),
            OutputFormat::Html => {
                let title = document.title().unwrap_or_else(|| self.name.basename());
                let linker = StaticLinker::new(self.name.clone(), "html");
                print!("{}", html::render_page(document, title, &linker));
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), document)
                    .context("failed to render json output")?;
                println!();
            }
        }

        Ok(())
    }
}
