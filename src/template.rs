//! Loads the template set and resolves which template renders a document.
//!
//! Every `*.tmpl` file in the template directory is compiled under its file
//! name. Three of them are reserved and must exist: [`INDEX`], [`POST`] and
//! [`PAGE`]. A document names an explicit template with the `template` key of
//! its metadata block; otherwise posts use [`POST`] and pages use [`PAGE`].

use crate::metadata::Metadata;
use gtmpl::{Context, Template, Value};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The template for the homepage.
pub const INDEX: &str = "index.tmpl";

/// The default template for dated documents.
pub const POST: &str = "post.tmpl";

/// The default template for undated documents.
pub const PAGE: &str = "page.tmpl";

const TEMPLATE_EXTENSION: &str = "tmpl";

/// Parses a single template from `source`. `name` is only used to annotate
/// errors.
pub fn compile(name: &str, source: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(source).map_err(|err| Error::Parse {
        name: name.to_owned(),
        err: err.to_string(),
    })?;
    Ok(template)
}

/// Executes `template` against `data` and returns the output.
pub fn execute(name: &str, template: &Template, data: Value) -> Result<String> {
    let annotate = |err: String| Error::Execute {
        name: name.to_owned(),
        err,
    };
    let context = Context::from(data).map_err(|err| annotate(err.to_string()))?;
    let mut out: Vec<u8> = Vec::new();
    template
        .execute(&mut out, &context)
        .map_err(|err| annotate(err.to_string()))?;
    String::from_utf8(out).map_err(|err| annotate(err.to_string()))
}

/// The compiled template set.
pub struct Templates {
    templates: HashMap<String, Template>,
}

impl Templates {
    /// Compiles the reserved templates and any other `*.tmpl` files found
    /// directly in `directory`.
    pub fn load(directory: &Path) -> Result<Templates> {
        let mut templates = Templates {
            templates: HashMap::new(),
        };
        for name in &[INDEX, POST, PAGE] {
            templates.load_file(name, &directory.join(name))?;
        }

        let entries = fs::read_dir(directory).map_err(|err| Error::OpenTemplateFile {
            path: directory.to_owned(),
            err,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|err| Error::OpenTemplateFile {
                    path: directory.to_owned(),
                    err,
                })?
                .path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !templates.templates.contains_key(name) {
                    templates.load_file(name, &path)?;
                }
            }
        }
        Ok(templates)
    }

    /// Builds a template set from in-memory `(name, source)` pairs. The
    /// reserved templates must be among them.
    #[cfg(test)]
    pub(crate) fn from_sources<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Templates> {
        let mut templates = HashMap::new();
        for (name, source) in sources {
            templates.insert(name.to_owned(), compile(name, source)?);
        }
        for name in &[INDEX, POST, PAGE] {
            if !templates.contains_key(*name) {
                return Err(Error::NotFound(name.to_string()));
            }
        }
        Ok(Templates { templates })
    }

    fn load_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?;
        debug!("compiling template `{}`", name);
        self.templates.insert(name.to_owned(), compile(name, &source)?);
        Ok(())
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    /// Returns the name of the template which renders a regular document: the
    /// explicit template if one is declared, otherwise [`POST`] for posts and
    /// [`PAGE`] for pages. An explicit template that doesn't exist is an
    /// error; there is no fallback.
    pub fn resolve<'m>(&self, meta: &'m Metadata) -> Result<&'m str> {
        self.resolve_or(meta, if meta.is_post() { POST } else { PAGE })
    }

    /// Like [`Templates::resolve`], but for the index document, whose default
    /// is [`INDEX`].
    pub fn resolve_homepage<'m>(&self, meta: &'m Metadata) -> Result<&'m str> {
        self.resolve_or(meta, INDEX)
    }

    fn resolve_or<'m>(&self, meta: &'m Metadata, default: &'static str) -> Result<&'m str> {
        match &meta.template {
            Some(name) if !self.templates.contains_key(name) => {
                Err(Error::NotFound(name.clone()))
            }
            Some(name) => Ok(name.as_str()),
            None => Ok(default),
        }
    }

    /// Executes the template called `name` against `data`.
    pub fn render(&self, name: &str, data: Value) -> Result<String> {
        execute(name, self.get(name)?, data)
    }
}

/// The result of a template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading, resolving, or executing templates.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned when a template doesn't compile.
    Parse { name: String, err: String },

    /// Returned when a requested template isn't in the set.
    NotFound(String),

    /// Returned when executing a template fails.
    Execute { name: String, err: String },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "opening template file '{}': {}", path.display(), err)
            }
            Error::Parse { name, err } => write!(f, "parse {}: {}", name, err),
            Error::NotFound(name) => write!(f, "template not found: {}", name),
            Error::Execute { name, err } => write!(f, "execute {}: {}", name, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::Parse { .. } => None,
            Error::NotFound(_) => None,
            Error::Execute { .. } => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value;
    use chrono::NaiveDate;

    fn templates() -> Templates {
        Templates::from_sources(vec![
            (INDEX, "{{range .}}{{.Title}};{{end}}"),
            (POST, "post:{{.Meta.Title}}"),
            (PAGE, "page:{{.Meta.Title}}"),
            ("wide.tmpl", "wide:{{.Content}}"),
        ])
        .unwrap()
    }

    fn post() -> Metadata {
        Metadata {
            title: String::from("A post"),
            date: NaiveDate::from_ymd_opt(2022, 1, 1),
            ..Metadata::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let templates = templates();
        assert_eq!(POST, templates.resolve(&post()).unwrap());
        assert_eq!(PAGE, templates.resolve(&Metadata::default()).unwrap());
        assert_eq!(INDEX, templates.resolve_homepage(&post()).unwrap());
    }

    #[test]
    fn test_resolve_explicit() {
        let templates = templates();
        let meta = Metadata {
            template: Some(String::from("wide.tmpl")),
            ..post()
        };
        assert_eq!("wide.tmpl", templates.resolve(&meta).unwrap());
        assert_eq!("wide.tmpl", templates.resolve_homepage(&meta).unwrap());
    }

    #[test]
    fn test_resolve_missing_is_an_error() {
        let meta = Metadata {
            template: Some(String::from("missing.tmpl")),
            ..Metadata::default()
        };
        match templates().resolve(&meta) {
            Err(Error::NotFound(name)) => assert_eq!("missing.tmpl", name),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_render() {
        let templates = templates();
        let out = templates
            .render(POST, value::page(&post(), "<p>raw</p>"))
            .unwrap();
        assert_eq!("post:A post", out);
        let out = templates
            .render("wide.tmpl", value::page(&post(), "<p>raw</p>"))
            .unwrap();
        assert_eq!("wide:<p>raw</p>", out);
    }

    #[test]
    fn test_from_sources_requires_reserved_templates() {
        match Templates::from_sources(vec![(INDEX, ""), (POST, "")]) {
            Err(Error::NotFound(name)) => assert_eq!(PAGE, name),
            _ => panic!("expected NotFound"),
        }
    }

    #[test]
    fn test_compile_error_names_template() {
        match compile("broken.tmpl", "{{.Title") {
            Err(Error::Parse { name, .. }) => assert_eq!("broken.tmpl", name),
            _ => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in &[
            (INDEX, "index"),
            (POST, "post"),
            (PAGE, "page"),
            ("extra.tmpl", "extra"),
            ("notes.txt", "{{"),
        ] {
            fs::write(dir.path().join(name), source).unwrap();
        }
        let templates = Templates::load(dir.path()).unwrap();
        assert!(templates.get("extra.tmpl").is_ok());
        assert!(templates.get("notes.txt").is_err());
    }

    #[test]
    fn test_load_missing_reserved_template() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INDEX), "index").unwrap();
        match Templates::load(dir.path()) {
            Err(Error::OpenTemplateFile { path, .. }) => {
                assert_eq!(dir.path().join(POST), path)
            }
            _ => panic!("expected OpenTemplateFile"),
        }
    }
}
