//! Domain models for wiki documents.
//!
//! This module contains the document model produced by the parser, inline
//! markup spans, page names, and notebook configuration.

/// The document model: header, sections, blocks and list items.
pub mod document;
pub use document::{
    Block, Bullet, CheckState, Document, Field, Header, Item, Paragraph, Section, Verbatim,
};

/// Inline markup spans.
pub mod inline;
pub use inline::{Inline, Style, Text};

mod config;
pub use config::Config;

/// Page names and link resolution.
pub mod name;
pub use name::{Error as NameError, LinkTarget, PageName};
