//! Walks the markdown event stream of a source document exactly once. Each
//! event is offered to three handlers in a fixed order:
//!
//! 1. [`TitleCapture`] records the flattened text of the first level-1
//!    heading without consuming any event.
//! 2. [`MetadataCapture`] consumes a leading fenced code block tagged `meta`
//!    and decodes its text with [`Metadata::decode`].
//! 3. Whatever is not consumed is rendered to HTML.

use crate::metadata::{InvalidMetadata, Metadata};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag};

/// The info string which marks a fenced code block as a metadata block.
const METADATA_INFO: &str = "meta";

/// The result of walking a document. The title candidates are kept apart so
/// that the caller can apply its precedence rule explicitly.
#[derive(Debug, Default, PartialEq)]
pub struct Document {
    /// The decoded metadata block, if the document starts with one.
    pub metadata: Option<Metadata>,

    /// The plain text of the first non-empty level-1 heading.
    pub heading: Option<String>,

    /// The rendered HTML body, without the metadata block.
    pub html: String,
}

/// The markdown extensions enabled for every document.
fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Walks `markdown` and returns its [`Document`]. Fails as soon as a metadata
/// block doesn't decode.
pub fn walk(markdown: &str) -> Result<Document, InvalidMetadata> {
    let mut title = TitleCapture::default();
    let mut metadata = MetadataCapture::default();
    let mut rendered: Vec<Event> = Vec::new();

    for (position, event) in Parser::new_ext(markdown, options()).enumerate() {
        title.on_event(&event);
        if metadata.on_event(position, &event)? {
            continue;
        }
        rendered.push(event);
    }

    let mut document = Document {
        metadata: metadata.decoded,
        heading: title.captured,
        html: String::new(),
    };
    html::push_html(&mut document.html, rendered.into_iter());
    Ok(document)
}

/// Fill-once capture of the first level-1 heading's plain text.
#[derive(Default)]
struct TitleCapture {
    /// The text collected so far while inside the heading.
    current: Option<String>,
    captured: Option<String>,
}

impl TitleCapture {
    fn on_event(&mut self, event: &Event) {
        if self.captured.is_some() {
            return;
        }
        match event {
            Event::Start(Tag::Heading(1)) if self.current.is_none() => {
                self.current = Some(String::new());
            }
            Event::Text(text) => {
                if let Some(current) = self.current.as_mut() {
                    current.push_str(text);
                }
            }
            Event::End(Tag::Heading(1)) => {
                // An empty heading leaves the slot open for the next one.
                self.captured = self.current.take().filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }
}

/// Consumes the metadata block. Only a fenced `meta` block which is the very
/// first event of the document qualifies.
#[derive(Default)]
struct MetadataCapture {
    /// The literal text of the block while it is being consumed.
    literal: Option<String>,
    decoded: Option<Metadata>,
}

impl MetadataCapture {
    /// Returns `true` if `event` belongs to the metadata block and must not be
    /// rendered.
    fn on_event(&mut self, position: usize, event: &Event) -> Result<bool, InvalidMetadata> {
        if let Some(literal) = self.literal.as_mut() {
            match event {
                Event::Text(text) => literal.push_str(text),
                Event::End(Tag::CodeBlock(_)) => {
                    self.decoded = Some(Metadata::decode(literal)?);
                    self.literal = None;
                }
                _ => {}
            }
            return Ok(true);
        }

        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if position == 0 && is_metadata_info(info) =>
            {
                self.literal = Some(String::new());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn is_metadata_info(info: &CowStr) -> bool {
    info.as_ref() == METADATA_INFO
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_walk_strips_metadata_block() {
        let doc = walk("```meta\ntitle: Hello\ndate: 2022-11-14\n```\n\nBody text.\n").unwrap();
        let meta = doc.metadata.unwrap();
        assert_eq!("Hello", meta.title);
        assert!(meta.is_post());
        assert_eq!(None, doc.heading);
        assert_eq!("<p>Body text.</p>\n", doc.html);
    }

    #[test]
    fn test_walk_captures_flattened_heading() {
        let doc = walk("# Hello *big* `code` [world](x.html)\n\n# Second\n").unwrap();
        assert_eq!(None, doc.metadata);
        assert_eq!(Some(String::from("Hello big  world")), doc.heading);
        assert!(doc.html.starts_with("<h1>Hello <em>big</em>"));
        assert!(doc.html.contains("<h1>Second</h1>"));
    }

    #[test]
    fn test_walk_ignores_lower_headings() {
        let doc = walk("## Sub\n\n# Main\n").unwrap();
        assert_eq!(Some(String::from("Main")), doc.heading);
    }

    #[test]
    fn test_walk_metadata_block_must_come_first() {
        let doc = walk("Intro.\n\n```meta\ntitle: Hello\n```\n").unwrap();
        assert_eq!(None, doc.metadata);
        assert!(doc.html.contains(r#"<code class="language-meta">title: Hello"#));
    }

    #[test]
    fn test_walk_other_fenced_blocks_render() {
        let doc = walk("```rust\nfn main() {}\n```\n").unwrap();
        assert_eq!(None, doc.metadata);
        assert!(doc.html.contains("fn main() {}"));
    }

    #[test]
    fn test_walk_invalid_metadata() {
        assert_eq!(Err(InvalidMetadata), walk("```meta\nauthor: me\n```\n"));
    }

    #[test]
    fn test_walk_empty_metadata_block() {
        let doc = walk("```meta\n```\n# Title\n").unwrap();
        assert_eq!(Some(Metadata::default()), doc.metadata);
        assert_eq!(Some(String::from("Title")), doc.heading);
        assert_eq!("<h1>Title</h1>\n", doc.html);
    }
}
