use std::{
    fs,
    path::{Path, PathBuf},
};

mod check;
mod export;
mod links;
mod list;
mod show;
mod terminal;

use check::Check;
use clap::ArgAction;
use export::Export;
use links::Links;
use list::List;
use show::Show;
use terminal::Colorize;
use tracing::instrument;
use wikidoc::{
    storage::notebook::{config_path, CONFIG_DIR},
    Config, Notebook, PageName,
};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the notebook
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new notebook
    Init(Init),

    /// Create a new page
    New(New),

    /// List pages (default)
    List(List),

    /// Render a page
    Show(Show),

    /// Check that documents parse
    ///
    /// Reports the line of the first error in each file that does not.
    Check(Check),

    /// Show the pages a page links to, or links from
    Links(Links),

    /// Render every page into a directory
    Export(Export),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(&root)?,
            Self::New(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Check(command) => command.run(&root)?,
            Self::Links(command) => command.run(root)?,
            Self::Export(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// The file extension of pages
    #[arg(long, default_value = "txt")]
    extension: String,
}

impl Init {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        if config_dir.exists() {
            anyhow::bail!("Notebook already initialized (found existing {CONFIG_DIR} directory)");
        }

        fs::create_dir_all(&config_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_DIR} directory: {e}"))?;

        let mut config = Config::default();
        config.set_extension(&self.extension);
        config
            .save(&config_path(root))
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!(
            "{}",
            format!("Initialized notebook in {}", root.display()).success()
        );
        println!("  Created: {CONFIG_DIR}/config.toml");
        println!();
        println!("Next steps:");
        println!("  wikidoc new Home --title \"Home\"");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct New {
    /// The name of the page, e.g. `Projects:Wikidoc`
    name: PageName,

    /// The page heading (defaults to the last part of the name)
    #[clap(long, short)]
    title: Option<String>,
}

impl New {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut notebook = Notebook::open(root)?;
        let path = notebook.path_for(&self.name);
        notebook.create(self.name.clone(), self.title.as_deref())?;

        println!(
            "{}",
            format!("Created {} at {}", self.name, path.display()).success()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use wikidoc::{render::Format, storage::notebook::load_config};

    use super::*;

    fn name(s: &str) -> PageName {
        s.parse().unwrap()
    }

    #[test]
    fn init_writes_config() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let init = Init {
            extension: ".wiki".to_string(),
        };
        init.run(&root).expect("init should succeed");

        assert!(config_path(&root).exists());
        assert_eq!(load_config(&root).extension(), "wiki");
    }

    #[test]
    fn init_refuses_existing_notebook() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        fs::create_dir(root.join(CONFIG_DIR)).unwrap();

        let init = Init {
            extension: "txt".to_string(),
        };
        assert!(init.run(&root).is_err());
    }

    #[test]
    fn new_creates_page() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let new = New {
            name: name("Projects:Garden"),
            title: Some("The Garden".to_string()),
        };
        new.run(root.clone()).expect("new should succeed");

        let notebook = Notebook::open(root).unwrap();
        let page = notebook.get(&name("Projects:Garden")).unwrap();
        assert_eq!(page.title(), Some("The Garden"));
    }

    #[test]
    fn new_refuses_existing_page() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        fs::write(root.join("Home.txt"), "====== Home ======\n").unwrap();

        let new = New {
            name: name("Home"),
            title: None,
        };
        assert!(new.run(root.clone()).is_err());
        assert_eq!(
            fs::read_to_string(root.join("Home.txt")).unwrap(),
            "====== Home ======\n"
        );
    }

    #[test]
    fn show_missing_page_fails() {
        let tmp = tempdir().unwrap();
        let show = Show::new(name("Nowhere"), show::OutputFormat::Wiki);
        assert!(show.run(tmp.path().to_path_buf()).is_err());
    }

    #[test]
    fn export_writes_pages() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("notes");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("Home.txt"), "====== Home ======\n* [[Todo]]\n").unwrap();
        fs::write(root.join("Todo.txt"), "====== Todo ======\n[ ] water\n").unwrap();

        let dest = tmp.path().join("site");
        let export = Export::new(dest.clone(), Format::Html, Some(name("index")));
        export.run(root).expect("export should succeed");

        assert!(dest.join("Home.html").exists());
        assert!(dest.join("Todo.html").exists());
        let index = fs::read_to_string(dest.join("index.html")).unwrap();
        assert!(index.contains("<a href=\"./Todo.html\" title=\"Todo\">Todo</a>"));
    }

    #[test]
    fn check_reports_broken_files() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        fs::write(root.join("Good.txt"), "====== Good ======\n").unwrap();
        fs::write(root.join("Bad.txt"), "====== Bad\n").unwrap();

        let check = Check::new(Vec::new(), false);
        let error = check.run(&root).unwrap_err();
        assert!(error.to_string().contains("1 of 2"));
    }

    #[test]
    fn check_canonical_form() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let loose = root.join("Loose.txt");
        fs::write(&loose, "====== Loose ======\n\n\n*   spaced\n").unwrap();

        assert!(Check::new(vec![loose.clone()], false).run(&root).is_ok());
        assert!(Check::new(vec![loose], true).run(&root).is_err());
    }
}
