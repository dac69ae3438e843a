//! Defines the [`Post`], [`Parser`], and [`Error`] types. A [`Post`] is a
//! single source document read from disk: its [`Metadata`] and its rendered
//! HTML body.

use crate::markdown;
use crate::metadata::{InvalidMetadata, Metadata};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// A parsed source document.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The metadata of the post. The `href` field is left empty by the
    /// [`Parser`].
    pub meta: Metadata,

    /// The rendered HTML body. The metadata block is not part of it.
    pub content: String,
}

impl Post {
    /// Builds a [`Post`] from a walked [`markdown::Document`]. A non-empty
    /// title from the metadata block takes precedence over the heading title.
    pub fn from_document(document: markdown::Document) -> Post {
        let mut meta = document.metadata.unwrap_or_default();
        if meta.title.is_empty() {
            if let Some(heading) = document.heading {
                meta.title = heading;
            }
        }
        Post {
            meta,
            content: document.html,
        }
    }
}

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// The directory against which relative source paths are resolved.
    source_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser which reads files under `source_directory`.
    pub fn new(source_directory: &'a Path) -> Parser<'a> {
        Parser { source_directory }
    }

    /// Parses the source file at `relative_path` (relative to the source
    /// directory) into a [`Post`].
    pub fn parse(&self, relative_path: &Path) -> Result<Post> {
        let path = self.source_directory.join(relative_path);
        let mut file = File::open(&path).map_err(Error::Open)?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(Error::Read)?;

        Ok(Post::from_document(markdown::walk(&contents)?))
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when the source file can't be opened.
    Open(io::Error),

    /// Returned when the source file can't be read, including when it isn't
    /// valid UTF-8.
    Read(io::Error),

    /// Returned when the metadata block is malformed.
    Metadata(InvalidMetadata),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open(err) => write!(f, "open file: {}", err),
            Error::Read(err) => write!(f, "read file: {}", err),
            Error::Metadata(err) => write!(f, "set metadata: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open(err) => Some(err),
            Error::Read(err) => Some(err),
            Error::Metadata(err) => Some(err),
        }
    }
}

impl From<InvalidMetadata> for Error {
    /// Converts an [`InvalidMetadata`] into an [`Error`]. It allows us to use
    /// the `?` operator on the markdown walk.
    fn from(err: InvalidMetadata) -> Error {
        Error::Metadata(err)
    }
}
