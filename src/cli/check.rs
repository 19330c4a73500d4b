use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use tracing::instrument;
use wikidoc::{
    parse,
    render::wiki,
    storage::notebook::{collect_document_paths, load_config},
};

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Check that documents parse")]
pub struct Check {
    /// Files to check (defaults to every page in the notebook)
    files: Vec<PathBuf>,

    /// Also fail files that are not in canonical form
    ///
    /// A file is canonical if rendering it back to wiki markup reproduces it
    /// exactly.
    #[arg(long)]
    canonical: bool,
}

enum Outcome {
    Ok,
    NotCanonical,
    Failed(String),
}

impl Check {
    #[cfg(test)]
    pub const fn new(files: Vec<PathBuf>, canonical: bool) -> Self {
        Self { files, canonical }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let files = if self.files.is_empty() {
            let config = load_config(root);
            collect_document_paths(root, config.extension())
        } else {
            self.files.clone()
        };

        let mut failed = 0;
        for path in &files {
            match Self::check_file(path) {
                Outcome::Ok => println!("{} {}", "ok".success(), path.display()),
                Outcome::NotCanonical => {
                    println!("{} {}: not canonical", "warn".warning(), path.display());
                    if self.canonical {
                        failed += 1;
                    }
                }
                Outcome::Failed(reason) => {
                    println!("{} {}: {reason}", "error".error(), path.display());
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            anyhow::bail!("{failed} of {} files failed", files.len());
        }
        Ok(())
    }

    fn check_file(path: &Path) -> Outcome {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        let document = match parse(&text) {
            Ok(document) => document,
            Err(e) => return Outcome::Failed(e.to_string()),
        };

        let rendered = wiki::render(&document);
        match parse(&rendered) {
            Ok(reparsed) if reparsed == document => {}
            Ok(_) => {
                tracing::error!("{} changes meaning when rendered", path.display());
                return Outcome::Failed("rendered markup does not parse the same".to_string());
            }
            Err(e) => return Outcome::Failed(format!("rendered markup does not parse: {e}")),
        }

        if rendered == text {
            Outcome::Ok
        } else {
            tracing::debug!("{} differs from its canonical form", path.display());
            Outcome::NotCanonical
        }
    }
}
