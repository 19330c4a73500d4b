//! Plain-text wiki documents
//!
//! Parses, renders and exports pages written in the zim wiki dialect: a small
//! markup of headings, bullet and checkbox lists, verbatim blocks, inline
//! styles and `[[links]]`. Pages live as text files in a notebook directory.
//!
//! ```
//! use wikidoc::{parse, render::{render, Format}};
//!
//! let document = parse("====== Todo ======\n[ ] write **docs**\n").unwrap();
//! assert_eq!(document.title(), Some("Todo"));
//! assert_eq!(render(&document, Format::Plain), "Todo\n====\n\n[ ] write docs\n");
//! ```

pub mod domain;
pub use domain::{Config, Document, PageName};

/// Parsing wiki markup into a [`Document`].
pub mod parser;
pub use parser::{parse, ParseError};

pub mod render;

/// Filesystem storage, notebooks and export.
pub mod storage;
pub use storage::{Exporter, Notebook};
