//! Filesystem storage for wiki documents.
//!
//! - [`file`]: reading and writing a single document
//! - [`notebook`]: a directory of documents addressed by page name
//! - [`export`]: rendering a notebook into a directory of output files

pub mod export;
pub mod file;
pub mod notebook;
mod path_parser;

pub use export::{ExportError, ExportSummary, Exporter};
pub use file::LoadError;
pub use notebook::{Notebook, NotebookError};
pub use path_parser::{construct_path_from_name, parse_name_from_path, ParseError};
