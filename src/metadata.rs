//! Defines the [`Metadata`] record and the codec for the `meta` block format.
//! A metadata block is a sequence of `key: value` lines:
//!
//! ```text
//! title: Hello, world!
//! date: 2022-11-14
//! ```
//!
//! Recognized keys are `title`, `date` (formatted `YYYY-MM-DD`) and
//! `template`. Every malformed input yields [`InvalidMetadata`].

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The metadata of a post or page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    /// The title, from the metadata block or the first level-1 heading.
    pub title: String,

    /// The publication date. Documents with a date are posts, documents
    /// without one are pages.
    pub date: Option<NaiveDate>,

    /// The path of the output file relative to the output directory. This is
    /// assigned by the generator and never read from the metadata block.
    pub href: String,

    /// The name of a template which overrides the default post/page template.
    pub template: Option<String>,
}

impl Metadata {
    /// Returns `true` if the document is a post (i.e., it is dated).
    pub fn is_post(&self) -> bool {
        self.date.is_some()
    }

    /// Decodes the text of a metadata block. Empty or whitespace-only input
    /// yields the zero record.
    pub fn decode(input: &str) -> Result<Metadata> {
        let mut meta = Metadata::default();
        for line in input.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim_matches(' ').is_empty() {
                continue;
            }

            let (key, value) = line.split_once(':').ok_or(InvalidMetadata)?;
            let key = key.trim_start_matches(' ');
            let value = value.trim_start_matches(' ');
            if key.is_empty() || value.is_empty() {
                return Err(InvalidMetadata);
            }

            match key {
                "title" => meta.title = value.to_owned(),
                "date" => {
                    meta.date = Some(
                        NaiveDate::parse_from_str(value, DATE_FORMAT)
                            .map_err(|_| InvalidMetadata)?,
                    )
                }
                "template" => meta.template = Some(value.to_owned()),
                _ => return Err(InvalidMetadata),
            }
        }
        Ok(meta)
    }

    /// Encodes the record as metadata block text. Unset fields are omitted
    /// and there is no trailing newline.
    pub fn encode(&self) -> String {
        let mut lines = Vec::with_capacity(3);
        if !self.title.is_empty() {
            lines.push(format!("title: {}", self.title));
        }
        if let Some(date) = self.date {
            lines.push(format!("date: {}", date.format(DATE_FORMAT)));
        }
        if let Some(template) = &self.template {
            lines.push(format!("template: {}", template));
        }
        lines.join("\n")
    }

    /// The date as `YYYY-MM-DD`, or the empty string for pages.
    pub fn date_string(&self) -> String {
        match self.date {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => String::new(),
        }
    }
}

impl FromStr for Metadata {
    type Err = InvalidMetadata;

    fn from_str(s: &str) -> Result<Metadata> {
        Metadata::decode(s)
    }
}

impl fmt::Display for Metadata {
    /// Displays a [`Metadata`] in its encoded block form.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// The result of decoding a metadata block.
pub type Result<T> = std::result::Result<T, InvalidMetadata>;

/// Returned for any malformed metadata block: an unknown key, a missing key
/// or value, or an unparseable date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidMetadata;

impl fmt::Display for InvalidMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid metadata")
    }
}

impl std::error::Error for InvalidMetadata {}
