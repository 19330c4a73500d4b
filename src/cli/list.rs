use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::instrument;
use wikidoc::{Document, Notebook, PageName};

use super::terminal::{self, Colorize};

/// Command arguments for `wikidoc list`.
#[derive(Debug, Default, Parser)]
#[command(about = "List pages")]
pub struct List {
    /// Only list pages in this namespace (and below it).
    #[arg(long, value_name = "NS")]
    namespace: Option<PageName>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Print page names only, one per line.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct Entry {
    name: String,
    title: Option<String>,
    sections: usize,
    items: usize,
    created: Option<DateTime<FixedOffset>>,
    path: PathBuf,
}

impl Entry {
    fn new(notebook: &Notebook, name: &PageName, document: &Document) -> Self {
        Self {
            name: name.to_string(),
            title: document.title().map(str::to_string),
            sections: document.sections().len(),
            items: document.item_count(),
            created: document.header().creation_date(),
            path: notebook.path_for(name),
        }
    }
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let notebook = Notebook::open(root)?;

        let entries: Vec<Entry> = notebook
            .pages()
            .filter(|(name, _)| self.in_namespace(name))
            .map(|(name, document)| Entry::new(&notebook, name, document))
            .collect();
        tracing::debug!("Listing {} of {} pages", entries.len(), notebook.len());

        match self.output {
            OutputFormat::Table if self.quiet => {
                for entry in &entries {
                    println!("{}", entry.name);
                }
            }
            OutputFormat::Table => render_table(&entries),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &entries)
                    .context("failed to render json output")?;
                println!();
            }
        }
        Ok(())
    }

    fn in_namespace(&self, name: &PageName) -> bool {
        self.namespace.as_ref().is_none_or(|namespace| {
            name.segments().len() > namespace.segments().len()
                && name.segments().starts_with(namespace.segments())
        })
    }
}

fn render_table(entries: &[Entry]) {
    if entries.is_empty() {
        println!("{}", "No pages".dim());
        return;
    }

    let headers = ["NAME", "TITLE", "ITEMS", "CREATED"];
    let data: Vec<[String; 4]> = entries
        .iter()
        .map(|entry| {
            [
                entry.name.clone(),
                entry.title.clone().unwrap_or_default(),
                entry.items.to_string(),
                entry
                    .created
                    .map(|created| created.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    // The title column gives way on narrow terminals.
    if let Some(available) = terminal::terminal_width() {
        let others: usize = widths
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != 1)
            .map(|(_, width)| width + 2)
            .sum();
        let room = available.saturating_sub(others + 2).max(headers[1].len());
        widths[1] = widths[1].min(room);
    }

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    let rule: String = widths.iter().map(|width| format!("{:-<width$}  ", "")).collect();
    println!("{}", rule.dim());

    for row in data {
        for (idx, value) in row.iter().enumerate() {
            let width = widths[idx];
            let value = terminal::truncate(value, width);
            print!("{value:<width$}  ");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(None, "Dev:Release", true; "no filter")]
    #[test_case(Some("Dev"), "Dev:Release", true; "direct child")]
    #[test_case(Some("Dev"), "Dev:Release:Notes", true; "nested child")]
    #[test_case(Some("Dev"), "Dev", false; "namespace page itself")]
    #[test_case(Some("Dev"), "Devices:Phone", false; "prefix of segment")]
    fn namespace_filter(namespace: Option<&str>, page: &str, expected: bool) {
        let list = List {
            namespace: namespace.map(|ns| ns.parse().unwrap()),
            ..List::default()
        };
        assert_eq!(list.in_namespace(&page.parse().unwrap()), expected);
    }
}
