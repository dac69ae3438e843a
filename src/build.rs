//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: loading the templates
//! ([`crate::template`]), parsing each markdown source ([`crate::post`]),
//! writing the pages ([`crate::write`]), and finally writing the homepage
//! from the metadata of every page, most recent first.

use crate::config::Config;
use crate::metadata::Metadata;
use crate::post::{Error as ParseError, Parser as PostParser, Post};
use crate::template::{Error as TemplateError, Templates};
use crate::write::{Error as WriteError, Writer, HOMEPAGE};
use log::{debug, info};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";
const HTML_EXTENSION: &str = "html";

/// A cancellation flag shared with the caller. The build checks it before
/// each source file and stops with [`Error::Cancelled`] once it is set.
#[derive(Clone, Debug, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    /// Requests that the build stop before its next file.
    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    /// Returns `true` once [`Cancel::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// Builds the site described by a [`Config`].
///
/// Templates are loaded before any source file is read. Every `.md` file
/// under the input directory becomes `{relative path}.html` in the output
/// directory, except the root `index.md`, which becomes the body of the
/// homepage. The first error aborts the build; pages already written are
/// left in place.
pub fn build_site(config: &Config, cancel: &Cancel) -> Result<()> {
    let templates = Templates::load(&config.template_directory)?;
    let files = markdown_files(&config.input_directory)?;
    debug!("found {} markdown files", files.len());

    let parser = PostParser::new(&config.input_directory);
    let writer = Writer {
        templates: &templates,
        output_directory: &config.output_directory,
    };

    let mut index: Option<Post> = None;
    let mut metas: Vec<Metadata> = Vec::with_capacity(files.len());
    for file in &files {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut post = parser.parse(file).map_err(|err| Error::Parse {
            path: file.to_owned(),
            err,
        })?;
        post.meta.href = output_href(file);

        if post.meta.href == HOMEPAGE {
            index = Some(post);
            continue;
        }

        writer.write_post(&post)?;
        metas.push(post.meta);
    }

    sort_by_date(&mut metas);
    writer.write_homepage(index.as_ref(), &metas)?;
    info!("built {} pages into {}", metas.len() + 1, config.output_directory.display());
    Ok(())
}

/// Returns the paths of all markdown files under `dir`, relative to `dir`,
/// in file-name order. Symlinks to regular files count as files; symlinked
/// directories are not descended into.
pub fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for result in WalkDir::new(dir).sort_by_file_name() {
        let entry = result?;
        if !entry.path().is_file()
            || entry.path().extension().and_then(|e| e.to_str()) != Some(MARKDOWN_EXTENSION)
        {
            continue;
        }
        // strip_prefix() can't fail: every entry is under `dir`
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            files.push(relative.to_owned());
        }
    }
    Ok(files)
}

/// The output path for a source file: the same relative path with an
/// `.html` extension, using `/` as the separator.
pub fn output_href(relative_path: &Path) -> String {
    relative_path
        .with_extension(HTML_EXTENSION)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Sorts metadata by date, most recent first. Undated pages go last and ties
/// keep their current order.
pub fn sort_by_date(metas: &mut [Metadata]) {
    metas.sort_by(|a, b| match (a.date, b.date) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the templates.
    Template(TemplateError),

    /// Returned for errors walking the input directory.
    Walk(walkdir::Error),

    /// Returned for errors parsing a source file.
    Parse { path: PathBuf, err: ParseError },

    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned when the build was cancelled between two files.
    Cancelled,
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => write!(f, "templates: {}", err),
            Error::Walk(err) => write!(f, "walkdir in: {}", err),
            Error::Parse { path, err } => {
                write!(f, "parsing post `{}`: {}", path.display(), err)
            }
            Error::Write(err) => err.fmt(f),
            Error::Cancelled => write!(f, "build cancelled"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Walk(err) => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::Write(err) => Some(err),
            Error::Cancelled => None,
        }
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
