use std::path::PathBuf;

use clap::Parser;
use tracing::instrument;
use wikidoc::{Notebook, PageName};

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Show the pages a page links to")]
pub struct Links {
    /// The name of the page, e.g. `Projects:Wikidoc`
    name: PageName,

    /// Show the pages linking to this page instead
    #[arg(long, short)]
    backlinks: bool,
}

impl Links {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let notebook = Notebook::open(root)?;
        if notebook.get(&self.name).is_none() {
            anyhow::bail!("Page {} not found", self.name);
        }

        if self.backlinks {
            for source in notebook.backlinks(&self.name) {
                println!("{source}");
            }
            return Ok(());
        }

        for target in notebook.links_from(&self.name) {
            if notebook.get(&target).is_some() {
                println!("{target}");
            } else {
                println!("{target} {}", "(missing)".warning());
            }
        }
        Ok(())
    }
}
