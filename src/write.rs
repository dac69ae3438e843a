//! Templating and writing HTML pages to disk. Regular documents are rendered
//! with the template chosen by [`Templates::resolve`]. The homepage is built
//! in one of two ways:
//!
//! * Without an index document, [`INDEX`] is executed directly against the
//!   sorted list of metadata.
//! * With an index document (`index.md`), its rendered HTML is itself a
//!   template. [`listing_template`] compiles it, [`render_listing`] executes
//!   it against the sorted list of metadata, and [`wrap_homepage`] wraps the
//!   result in the template chosen by [`Templates::resolve_homepage`].

use crate::metadata::Metadata;
use crate::post::Post;
use crate::template::{self, Templates, INDEX};
use crate::value;
use gtmpl::Template;
use log::{debug, info};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The file name of the homepage, relative to the output directory.
pub const HOMEPAGE: &str = "index.html";

/// The template name under which the index document's content is compiled.
pub const HOMEPAGE_SOURCE: &str = "index.md";

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The compiled template set.
    pub templates: &'a Templates,

    /// The root of the output tree. Page paths are relative to it.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders a regular document with its resolved template and writes it to
    /// `{output_directory}/{meta.href}`, creating missing directories.
    pub fn write_post(&self, post: &Post) -> Result<()> {
        let name = self.templates.resolve(&post.meta)?;
        debug!("rendering `{}` with `{}`", post.meta.href, name);
        let html = self
            .templates
            .render(name, value::page(&post.meta, &post.content))?;

        let path = self.output_directory.join(&post.meta.href);
        if let Some(dir) = path.parent() {
            mkdir(dir)?;
        }
        write_file(&path, &html)?;
        info!("wrote {}", post.meta.href);
        Ok(())
    }

    /// Writes the homepage. `metas` must already be sorted; `index` is the
    /// index document, if the source tree has one.
    pub fn write_homepage(&self, index: Option<&Post>, metas: &[Metadata]) -> Result<()> {
        let html = match index {
            None => self.templates.render(INDEX, value::listing(metas))?,
            Some(index) => {
                let listing = render_listing(&listing_template(index)?, metas)?;
                wrap_homepage(self.templates, index, &listing)?
            }
        };

        mkdir(self.output_directory)?;
        write_file(&self.output_directory.join(HOMEPAGE), &html)?;
        info!("wrote {} ({} entries)", HOMEPAGE, metas.len());
        Ok(())
    }
}

/// Compiles the rendered content of the index document as a template.
pub fn listing_template(index: &Post) -> template::Result<Template> {
    template::compile(HOMEPAGE_SOURCE, &index.content)
}

/// Executes the index document's template against the sorted metadata.
pub fn render_listing(listing: &Template, metas: &[Metadata]) -> template::Result<String> {
    template::execute(HOMEPAGE_SOURCE, listing, value::listing(metas))
}

/// Wraps the rendered listing in the index document's template (its explicit
/// template, else [`INDEX`]).
pub fn wrap_homepage(templates: &Templates, index: &Post, listing: &str) -> template::Result<String> {
    let name = templates.resolve_homepage(&index.meta)?;
    templates.render(name, value::page(&index.meta, listing))
}

/// Creates `dir` and any missing parents. New directories get mode `0744` on
/// unix.
fn mkdir(dir: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o744);
    }
    builder.create(dir).map_err(|err| Error::CreateDirectory {
        path: dir.to_owned(),
        err,
    })
}

/// Writes `contents` to `path`. The file handle is closed before returning on
/// every path.
fn write_file(path: &Path, contents: &str) -> Result<()> {
    let annotate = |err| Error::WriteFile {
        path: path.to_owned(),
        err,
    };
    let mut file = File::create(path).map_err(annotate)?;
    file.write_all(contents.as_bytes()).map_err(annotate)?;
    file.flush().map_err(annotate)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error resolving or executing a template.
    Template(template::Error),

    /// An error creating an output directory.
    CreateDirectory { path: PathBuf, err: io::Error },

    /// An error writing an output file.
    WriteFile { path: PathBuf, err: io::Error },
}

impl From<template::Error> for Error {
    /// Converts a [`template::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for template operations.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::CreateDirectory { path, err } => {
                write!(f, "mkdir {}: {}", path.display(), err)
            }
            Error::WriteFile { path, err } => {
                write!(f, "write file {}: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::CreateDirectory { path: _, err } => Some(err),
            Error::WriteFile { path: _, err } => Some(err),
        }
    }
}
