//! `wikidoc`: manage a notebook of plain-text wiki pages.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
