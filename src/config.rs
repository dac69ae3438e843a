//! Defines the [`Config`] for a build. A config comes from defaults, an
//! optional YAML project file, and command-line flags, in increasing order of
//! precedence. A project file looks like this:
//!
//! ```yaml
//! input: posts
//! output: public
//! templates: theme
//! ```
//!
//! Relative paths in a project file are resolved against the directory that
//! contains it.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The default directory of markdown sources.
pub const DEFAULT_INPUT_DIRECTORY: &str = "in";

/// The default directory of HTML output.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "out";

/// The default directory of `*.tmpl` files.
pub const DEFAULT_TEMPLATE_DIRECTORY: &str = "templates";

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct Project {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    templates: Option<PathBuf>,
}

/// The directories a build reads from and writes to.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The root of the markdown source tree.
    pub input_directory: PathBuf,

    /// The root of the HTML output tree.
    pub output_directory: PathBuf,

    /// The directory holding the templates.
    pub template_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_directory: PathBuf::from(DEFAULT_INPUT_DIRECTORY),
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            template_directory: PathBuf::from(DEFAULT_TEMPLATE_DIRECTORY),
        }
    }
}

impl Config {
    /// Loads a config from a YAML project file. Keys missing from the file
    /// keep their defaults.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = if contents.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|err| Error::Yaml {
                path: path.to_owned(),
                err,
            })?
        };

        let root = path.parent().unwrap_or_else(|| Path::new(""));
        let defaults = Config::default();
        Ok(Config {
            input_directory: root.join(project.input.unwrap_or(defaults.input_directory)),
            output_directory: root.join(project.output.unwrap_or(defaults.output_directory)),
            template_directory: root.join(project.templates.unwrap_or(defaults.template_directory)),
        })
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a project file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: io::Error },

    /// Returned when the project file isn't valid YAML or has unknown keys.
    Yaml { path: PathBuf, err: serde_yaml::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "opening project file '{}': {}", path.display(), err)
            }
            Error::Yaml { path, err } => {
                write!(f, "loading project file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Yaml { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(PathBuf::from("in"), config.input_directory);
        assert_eq!(PathBuf::from("out"), config.output_directory);
        assert_eq!(PathBuf::from("templates"), config.template_directory);
    }

    #[test]
    fn test_from_project_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("microblog.yaml");
        fs::write(&path, "input: posts\ntemplates: /srv/theme\n").unwrap();

        let config = Config::from_project_file(&path)?;
        assert_eq!(dir.path().join("posts"), config.input_directory);
        assert_eq!(dir.path().join("out"), config.output_directory);
        assert_eq!(PathBuf::from("/srv/theme"), config.template_directory);
        Ok(())
    }

    #[test]
    fn test_from_empty_project_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("microblog.yaml");
        fs::write(&path, "").unwrap();

        let config = Config::from_project_file(&path)?;
        assert_eq!(dir.path().join("in"), config.input_directory);
        Ok(())
    }

    #[test]
    fn test_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("microblog.yaml");
        fs::write(&path, "inptu: posts\n").unwrap();

        match Config::from_project_file(&path) {
            Err(Error::Yaml { .. }) => {}
            other => panic!("expected a YAML error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        match Config::from_project_file(Path::new("/nonexistent/microblog.yaml")) {
            Err(Error::Open { .. }) => {}
            other => panic!("expected an open error, got {:?}", other),
        }
    }
}
