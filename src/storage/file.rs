//! Reading and writing single document files.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use crate::{
    domain::Document,
    parser::{parse, ParseError},
    render::wiki,
};

/// Reads and parses a document from a reader.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not valid markup.
pub fn read<R: Read>(reader: &mut R) -> Result<Document, LoadError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse(&text)?)
}

/// Writes a document as wiki markup.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write<W: Write>(writer: &mut W, document: &Document) -> io::Result<()> {
    writer.write_all(wiki::render(document).as_bytes())
}

/// Loads a document from a file.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if there is no such file, or another
/// error if it cannot be read or parsed.
pub fn load(path: &Path) -> Result<Document, LoadError> {
    let mut file = File::open(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(io_error),
    })?;
    read(&mut file)
}

/// Writes a document to a file in wiki markup.
///
/// Parent directories are created automatically if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn save(path: &Path, document: &Document) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer, document)?;
    writer.flush()
}

/// Errors that can occur when loading a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document file was not found.
    #[error("file not found")]
    NotFound,
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The markup could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
