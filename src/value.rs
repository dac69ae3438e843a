//! Conversions of posts and metadata into template [`Value`]s. Keys are
//! capitalized so templates read `{{.Meta.Title}}`, `{{.Content}}` and, on
//! the homepage, `{{range .}}{{.Href}}{{end}}`.
//!
//! The template engine doesn't escape its output, so every metadata string is
//! HTML-escaped here. `Content` is already HTML and is left alone.

use crate::metadata::Metadata;
use gtmpl::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;

/// Wraps `s` in a [`Value::String`] with `<`, `>`, `&` and `"` escaped.
fn escaped(s: &str) -> Value {
    let mut out = String::with_capacity(s.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut out, s);
    Value::String(out)
}

impl From<&Metadata> for Value {
    fn from(meta: &Metadata) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), escaped(&meta.title));
        m.insert("Date".to_owned(), escaped(&meta.date_string()));
        m.insert("Href".to_owned(), escaped(&meta.href));
        m.insert(
            "Template".to_owned(),
            escaped(meta.template.as_deref().unwrap_or_default()),
        );
        m.insert("IsPost".to_owned(), Value::Bool(meta.is_post()));
        Value::Object(m)
    }
}

/// The data for a single page: `{Meta, Content}`. `content` is raw HTML and
/// is inserted as is.
pub fn page(meta: &Metadata, content: &str) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("Meta".to_owned(), meta.into());
    m.insert("Content".to_owned(), Value::String(content.to_owned()));
    Value::Object(m)
}

/// The data for a homepage listing: the bare list of metadata.
pub fn listing(metas: &[Metadata]) -> Value {
    Value::Array(metas.iter().map(Value::from).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
        match value {
            Value::Object(m) => &m[key],
            _ => panic!("expected an object"),
        }
    }

    fn is_string(value: &Value, wanted: &str) -> bool {
        matches!(value, Value::String(s) if s == wanted)
    }

    #[test]
    fn test_metadata_value() {
        let meta = Metadata {
            title: String::from("Hello"),
            date: NaiveDate::from_ymd_opt(2022, 1, 1),
            href: String::from("posts/hello.html"),
            template: None,
        };
        let value = Value::from(&meta);
        assert!(is_string(field(&value, "Title"), "Hello"));
        assert!(is_string(field(&value, "Date"), "2022-01-01"));
        assert!(is_string(field(&value, "Href"), "posts/hello.html"));
        assert!(is_string(field(&value, "Template"), ""));
        assert!(matches!(field(&value, "IsPost"), Value::Bool(true)));
    }

    #[test]
    fn test_metadata_value_is_escaped() {
        let meta = Metadata {
            title: String::from(r#"Tom & <b>"Jerry"</b>"#),
            href: String::from("a&b.html"),
            ..Metadata::default()
        };
        let value = Value::from(&meta);
        assert!(is_string(
            field(&value, "Title"),
            "Tom &amp; &lt;b&gt;&quot;Jerry&quot;&lt;/b&gt;"
        ));
        assert!(is_string(field(&value, "Href"), "a&amp;b.html"));

        let value = page(&meta, "<p>Tom &amp; Jerry</p>");
        assert!(is_string(field(&value, "Content"), "<p>Tom &amp; Jerry</p>"));
    }

    #[test]
    fn test_page_value() {
        let value = page(&Metadata::default(), "<p>hi</p>");
        assert!(is_string(field(&value, "Content"), "<p>hi</p>"));
        assert!(matches!(
            field(field(&value, "Meta"), "IsPost"),
            Value::Bool(false)
        ));
    }

    #[test]
    fn test_listing_value() {
        match listing(&[Metadata::default(), Metadata::default()]) {
            Value::Array(items) => assert_eq!(2, items.len()),
            _ => panic!("expected an array"),
        }
    }
}
