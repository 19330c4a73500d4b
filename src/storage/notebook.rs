//! A filesystem backed store of documents
//!
//! A [`Notebook`] is a directory of wiki documents. Every file with the
//! configured extension below the root is a page, named after its path:
//! `Dev/Release_Notes.txt` is the page `Dev:Release Notes`. Hidden files and
//! directories, including the `.wikidoc` configuration directory, are ignored.

use std::{
    collections::BTreeMap,
    fmt, io,
    path::{Path, PathBuf},
};

use chrono::Local;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::{
    domain::{Block, Config, Document, Header, LinkTarget, PageName, Paragraph, Section, Text},
    storage::{
        file::{self, LoadError},
        path_parser::{self, construct_path_from_name, parse_name_from_path},
    },
};

/// The directory below the notebook root holding configuration.
pub const CONFIG_DIR: &str = ".wikidoc";

/// The configuration file name within [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// A filesystem backed store of documents.
#[derive(Debug)]
pub struct Notebook {
    /// The root of the directory documents are stored in.
    root: PathBuf,
    config: Config,
    pages: BTreeMap<PageName, Document>,
}

impl Notebook {
    /// Opens the notebook at `root` and loads every document in it.
    ///
    /// # Errors
    ///
    /// This method has different behaviour depending on the configuration file
    /// in the notebook root. If `allow_unrecognised` is `true`, then any files
    /// whose names are not valid page names, or that cannot be parsed, are
    /// skipped with a warning. If `allow_unrecognised` is `false` (the
    /// default), any such file fails the whole load.
    pub fn open(root: PathBuf) -> Result<Self, NotebookError> {
        let config = load_config(&root);
        let paths = collect_document_paths(&root, config.extension());
        tracing::debug!("Found {} documents in {}", paths.len(), root.display());

        let results: Vec<_> = paths
            .par_iter()
            .map(|path| try_load_page(path, &root))
            .collect();

        let mut pages = BTreeMap::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok((name, document)) => {
                    pages.insert(name, document);
                }
                Err(failure) => failures.push(failure),
            }
        }

        if !failures.is_empty() {
            if !config.allow_unrecognised {
                return Err(NotebookError::Unrecognised(failures));
            }
            for failure in &failures {
                tracing::warn!("Skipping {failure}");
            }
        }

        Ok(Self {
            root,
            config,
            pages,
        })
    }

    /// The notebook root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The notebook configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the notebook has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Looks up a page by name.
    #[must_use]
    pub fn get(&self, name: &PageName) -> Option<&Document> {
        self.pages.get(name)
    }

    /// All pages, ordered by name.
    pub fn pages(&self) -> impl Iterator<Item = (&PageName, &Document)> {
        self.pages.iter()
    }

    /// The file a page is (or would be) stored in.
    #[must_use]
    pub fn path_for(&self, name: &PageName) -> PathBuf {
        construct_path_from_name(&self.root, name, self.config.extension())
    }

    /// The pages linked from `name`, in order of first appearance.
    ///
    /// Links are resolved relative to the page; external links are omitted.
    /// Targets are included whether or not the page exists.
    #[must_use]
    pub fn links_from(&self, name: &PageName) -> Vec<PageName> {
        let Some(document) = self.pages.get(name) else {
            return Vec::new();
        };

        let mut links: Vec<PageName> = Vec::new();
        for target in document.links() {
            match name.resolve(target) {
                Ok(LinkTarget::Page(page)) => {
                    if !links.contains(&page) {
                        links.push(page);
                    }
                }
                Ok(LinkTarget::External(_)) => {}
                Err(e) => tracing::debug!("Ignoring link '{target}' on {name}: {e}"),
            }
        }
        links
    }

    /// The pages that link to `name`, ordered by name.
    #[must_use]
    pub fn backlinks(&self, name: &PageName) -> Vec<PageName> {
        self.pages
            .keys()
            .filter(|source| *source != name && self.links_from(source).contains(name))
            .cloned()
            .collect()
    }

    /// Creates a new page and writes it to disk.
    ///
    /// The page gets a fresh header (with the current local time as its
    /// creation date), a level-1 heading, and a `Created ...` line. The
    /// heading defaults to the page basename; a given title is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the page already exists, in the notebook or on
    /// disk, if the title is blank or spans more than one line, or if the
    /// file cannot be written.
    pub fn create(
        &mut self,
        name: PageName,
        title: Option<&str>,
    ) -> Result<&Document, NotebookError> {
        let path = self.path_for(&name);
        if self.pages.contains_key(&name) || path.exists() {
            return Err(NotebookError::AlreadyExists(name));
        }

        let title = title.map_or_else(|| name.basename(), str::trim);
        if title.is_empty() || title.contains(['\n', '\r']) {
            return Err(NotebookError::InvalidTitle(title.to_string()));
        }

        let now = Local::now();
        let header = Header::new(self.config.wiki_format(), now.fixed_offset());
        let created = format!("Created {}", now.format("%A %d %B %Y"));
        let section = Section::new(1, title)
            .with(Block::Paragraph(Paragraph::new(vec![Text::plain_text(created)])));

        let mut document = Document::with_header(header);
        document.push_section(section);

        file::save(&path, &document).map_err(|source| NotebookError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Created {name} at {}", path.display());

        Ok(self.pages.entry(name.clone()).or_insert(document.named(name)))
    }
}

/// A file that could not be loaded as a page.
#[derive(Debug)]
pub struct LoadFailure {
    /// The offending file.
    pub path: PathBuf,
    /// Why it could not be loaded.
    pub reason: FailureReason,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Why a file could not be loaded as a page.
#[derive(Debug, thiserror::Error)]
pub enum FailureReason {
    /// The file name is not a valid page name.
    #[error(transparent)]
    Name(#[from] path_parser::ParseError),
    /// The file could not be read or parsed.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Errors raised by a [`Notebook`].
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    /// Files that could not be loaded, when `allow_unrecognised` is off.
    Unrecognised(Vec<LoadFailure>),
    /// A page with this name already exists.
    AlreadyExists(PageName),
    /// A title that cannot be written as a heading.
    InvalidTitle(String),
    /// A page could not be written.
    Write {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

impl fmt::Display for NotebookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognised(failures) => {
                write!(f, "Unrecognised files: ")?;
                for (i, failure) in failures.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{failure}")?;
                }
                Ok(())
            }
            Self::AlreadyExists(name) => write!(f, "Page {name} already exists"),
            Self::InvalidTitle(title) => {
                write!(f, "Invalid title '{title}': must be a single non-empty line")
            }
            Self::Write { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
        }
    }
}

/// The path of the configuration file for a notebook root.
#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Loads the configuration of the notebook at `root`.
///
/// Falls back to the defaults if there is no configuration file, or if it
/// cannot be read.
#[must_use]
pub fn load_config(root: &Path) -> Config {
    let path = config_path(root);
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Config::default();
    }
    Config::load(&path).unwrap_or_else(|e| {
        tracing::warn!("Ignoring invalid config: {e}");
        Config::default()
    })
}

/// Lists the document files below `root`, sorted by path.
///
/// Hidden files and directories are skipped.
#[must_use]
pub fn collect_document_paths(root: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext == extension)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}

fn try_load_page(path: &Path, root: &Path) -> Result<(PageName, Document), LoadFailure> {
    let failure = |reason: FailureReason| LoadFailure {
        path: path.to_path_buf(),
        reason,
    };

    let name = parse_name_from_path(path, root).map_err(|e| failure(e.into()))?;
    let document = file::load(path).map_err(|e| failure(e.into()))?;

    tracing::trace!("Loaded {name} from {}", path.display());
    Ok((name.clone(), document.named(name)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;

    const HOME: &str = "Content-Type: text/x-zim-wiki
Wiki-Format: zim 0.4
Creation-Date: 2010-11-27T12:00:00+01:00

====== Home ======
* [[Dev:Release]]
* [[Dev:Contrib|contributing]]
* [[http://zim-wiki.org]]
";

    const RELEASE: &str = "====== Release ======
[ ] Check [[+Translations]]
[ ] Read [[Contrib]] again
[ ] Back to [[:Home]]
";

    const CONTRIB: &str = "====== Contrib ======
See [[Release]].
";

    fn name(s: &str) -> PageName {
        s.parse().unwrap()
    }

    fn seed() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Home.txt"), HOME).unwrap();
        fs::create_dir(dir.path().join("Dev")).unwrap();
        fs::write(dir.path().join("Dev/Release.txt"), RELEASE).unwrap();
        fs::write(dir.path().join("Dev/Contrib.txt"), CONTRIB).unwrap();
        dir
    }

    #[test]
    fn open_loads_all_pages() {
        let dir = seed();
        let notebook = Notebook::open(dir.path().to_path_buf()).unwrap();

        assert_eq!(notebook.len(), 3);
        let names: Vec<String> = notebook.pages().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, ["Dev:Contrib", "Dev:Release", "Home"]);

        let release = notebook.get(&name("Dev:Release")).unwrap();
        assert_eq!(release.title(), Some("Release"));
        assert_eq!(release.name(), Some(&name("Dev:Release")));
    }

    #[test]
    fn open_skips_hidden_and_other_files() {
        let dir = seed();
        fs::create_dir(dir.path().join(".wikidoc")).unwrap();
        fs::write(dir.path().join(".wikidoc/notes.txt"), "== broken").unwrap();
        fs::write(dir.path().join("README.md"), "== broken").unwrap();

        let notebook = Notebook::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(notebook.len(), 3);
    }

    #[test]
    fn open_rejects_unparsable_files() {
        let dir = seed();
        fs::write(dir.path().join("Broken.txt"), "* **unterminated\n").unwrap();

        let error = Notebook::open(dir.path().to_path_buf()).unwrap_err();
        let NotebookError::Unrecognised(failures) = &error else {
            panic!("expected unrecognised files");
        };
        assert_eq!(failures.len(), 1);
        assert!(failures[0].path.ends_with("Broken.txt"));
        assert!(error.to_string().contains("line 1"));
    }

    #[test]
    fn open_skips_unparsable_files_when_allowed() {
        let dir = seed();
        fs::write(dir.path().join("Broken.txt"), "* **unterminated\n").unwrap();

        let mut config = Config::default();
        config.allow_unrecognised = true;
        fs::create_dir(dir.path().join(CONFIG_DIR)).unwrap();
        config.save(&config_path(dir.path())).unwrap();

        let notebook = Notebook::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(notebook.len(), 3);
    }

    #[test]
    fn configured_extension() {
        let dir = seed();
        fs::write(dir.path().join("Other.wiki"), "====== Other ======\n").unwrap();

        let mut config = Config::default();
        config.set_extension("wiki");
        fs::create_dir(dir.path().join(CONFIG_DIR)).unwrap();
        config.save(&config_path(dir.path())).unwrap();

        let notebook = Notebook::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(notebook.len(), 1);
        assert!(notebook.get(&name("Other")).is_some());
    }

    #[test]
    fn links_resolve_relative_to_page() {
        let dir = seed();
        let notebook = Notebook::open(dir.path().to_path_buf()).unwrap();

        assert_eq!(
            notebook.links_from(&name("Dev:Release")),
            [name("Dev:Release:Translations"), name("Dev:Contrib"), name("Home")]
        );
        assert_eq!(
            notebook.links_from(&name("Home")),
            [name("Dev:Release"), name("Dev:Contrib")]
        );
    }

    #[test]
    fn backlinks() {
        let dir = seed();
        let notebook = Notebook::open(dir.path().to_path_buf()).unwrap();

        assert_eq!(
            notebook.backlinks(&name("Dev:Release")),
            [name("Dev:Contrib"), name("Home")]
        );
        assert!(notebook.backlinks(&name("Nowhere")).is_empty());
    }

    #[test]
    fn create_writes_new_page() {
        let dir = seed();
        let mut notebook = Notebook::open(dir.path().to_path_buf()).unwrap();

        let document = notebook
            .create(name("Dev:Release Notes"), Some("Notes for 0.5"))
            .unwrap();
        assert_eq!(document.title(), Some("Notes for 0.5"));
        assert_eq!(document.header().wiki_format(), Some("zim 0.4"));
        assert!(document.header().creation_date().is_some());

        let path = dir.path().join("Dev/Release_Notes.txt");
        assert!(path.exists());

        let reopened = Notebook::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.len(), 4);
        assert_eq!(
            reopened.get(&name("Dev:Release Notes")).unwrap().title(),
            Some("Notes for 0.5")
        );
    }

    #[test]
    fn create_defaults_title_to_basename() {
        let dir = TempDir::new().unwrap();
        let mut notebook = Notebook::open(dir.path().to_path_buf()).unwrap();
        let document = notebook.create(name("Ideas"), None).unwrap();
        assert_eq!(document.title(), Some("Ideas"));
    }

    #[test]
    fn create_trims_title() {
        let dir = TempDir::new().unwrap();
        let mut notebook = Notebook::open(dir.path().to_path_buf()).unwrap();
        let document = notebook.create(name("Ideas"), Some("  Big ideas ")).unwrap();
        assert_eq!(document.title(), Some("Big ideas"));
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "blank")]
    #[test_case("two\nlines"; "newline")]
    #[test_case("two\r\nlines"; "carriage return")]
    fn create_rejects_unwritable_title(title: &str) {
        let dir = TempDir::new().unwrap();
        let mut notebook = Notebook::open(dir.path().to_path_buf()).unwrap();

        let result = notebook.create(name("Ideas"), Some(title));
        assert!(matches!(result, Err(NotebookError::InvalidTitle(_))));
        assert!(!dir.path().join("Ideas.txt").exists());
        assert!(Notebook::open(dir.path().to_path_buf()).unwrap().is_empty());
    }

    #[test]
    fn created_underscored_page_reopens_under_same_name() {
        let dir = TempDir::new().unwrap();
        let mut notebook = Notebook::open(dir.path().to_path_buf()).unwrap();
        notebook.create(name("Foo_Bar"), None).unwrap();
        assert!(dir.path().join("Foo_Bar.txt").exists());

        let reopened = Notebook::open(dir.path().to_path_buf()).unwrap();
        let names: Vec<String> = reopened.pages().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, ["Foo Bar"]);
        assert!(reopened.get(&name("Foo_Bar")).is_some());
        assert_eq!(reopened.get(&name("Foo Bar")).unwrap().title(), Some("Foo Bar"));
    }

    #[test]
    fn create_refuses_existing_page() {
        let dir = seed();
        let mut notebook = Notebook::open(dir.path().to_path_buf()).unwrap();

        let result = notebook.create(name("Home"), None);
        assert!(matches!(result, Err(NotebookError::AlreadyExists(_))));
        assert_eq!(fs::read_to_string(dir.path().join("Home.txt")).unwrap(), HOME);
    }

    #[test]
    fn empty_directory() {
        let dir = TempDir::new().unwrap();
        let notebook = Notebook::open(dir.path().to_path_buf()).unwrap();
        assert!(notebook.is_empty());
    }
}
