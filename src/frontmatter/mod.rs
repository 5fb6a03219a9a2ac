//! Frontmatter codec
//!
//! Cards and sources are plain markdown files with a small `---` delimited
//! metadata block on top. The block is a flat `key: value` map, not general
//! YAML; values coerce through a fixed rule order into a tagged [`Value`].
//! A missing or malformed block is never an error: the caller gets an empty
//! map and the untouched text, so one hand-mangled file cannot take a note
//! hostage.
//!
//! Coercion order per value token:
//! 1. `[a, b]` → list of trimmed, quote-stripped strings
//! 2. `"quoted"` / `'quoted'` → string, unquoted, no further coercion
//! 3. `true` / `false` → boolean
//! 4. `null` → the key is absent
//! 5. integer-looking token → number
//! 6. anything else → verbatim string
//!
//! Coercion deliberately stops at integers; fractional fields such as a
//! card's ease ride as strings here and are interpreted by [`Value::as_f32`]
//! at the record layer. `serialize` quotes any string that would re-coerce,
//! so parse∘serialize is the identity for string/bool/number/list maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Metadata = BTreeMap<String, Value>;

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(i64),
    Str(String),
    List(Vec<String>),
    Null,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; numeric strings are accepted so hand-edited
    /// frontmatter (`interval: "4"`) still loads.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float view; floats are stored as strings by the codec.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n as f32),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// List view, lenient: a bare string splits on commas the way the
    /// original hand-written `tags: a, b` files expect.
    pub fn to_string_list(&self) -> Vec<String> {
        match self {
            Value::List(items) => items.clone(),
            Value::Str(s) => s
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Split a note into its metadata map and body.
///
/// Returns `({}, text)` unchanged when there is no block or the block is
/// malformed (unterminated, or a line without `key: value` shape).
pub fn parse(text: &str) -> (Metadata, String) {
    let bail = || (Metadata::new(), text.to_string());

    // split_inclusive keeps line endings, so `consumed` stays an exact
    // byte offset into `text` whatever the ending style is
    let mut segments = text.split_inclusive('\n');
    let mut consumed = match segments.next() {
        Some(first) if first.trim_end() == "---" => first.len(),
        _ => return bail(),
    };

    let mut metadata = Metadata::new();
    let mut closed = false;

    for segment in segments {
        consumed += segment.len();
        let line = segment.trim_end_matches(['\n', '\r']);
        if line.trim_end() == "---" {
            closed = true;
            break;
        }

        if line.trim().is_empty() {
            continue;
        }
        let Some((key, raw)) = line.split_once(':') else {
            return bail();
        };
        let key = key.trim();
        if key.is_empty() {
            return bail();
        }
        if let Some(value) = coerce(raw.trim()) {
            metadata.insert(key.to_string(), value);
        }
    }

    if !closed {
        return bail();
    }

    let body = text[consumed..]
        .strip_prefix("\r\n")
        .or_else(|| text[consumed..].strip_prefix('\n'))
        .unwrap_or(&text[consumed..]);
    (metadata, body.to_string())
}

/// Render a metadata map and body back into note text. Exact inverse of
/// [`parse`] for the value shapes above; `Null` values serialize by
/// omission. Key order is map iteration order (sorted), which is fine:
/// frontmatter is not order-sensitive in this domain.
pub fn serialize(metadata: &Metadata, body: &str) -> String {
    let mut out = String::from("---\n");
    for (key, value) in metadata {
        match value {
            Value::Null => continue,
            _ => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&render(value));
                out.push('\n');
            }
        }
    }
    out.push_str("---\n");
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    out
}

/// Apply the ordered coercion rules. `None` means the key is absent
/// (`null` or an empty value).
fn coerce(raw: &str) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return Some(Value::List(split_list_items(inner)));
    }
    if is_quoted(raw) {
        return Some(Value::Str(strip_quotes(raw).to_string()));
    }
    match raw {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return None,
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n));
    }
    Some(Value::Str(raw.to_string()))
}

/// Split list contents on commas outside quoted segments, so a quoted
/// item may itself contain commas.
fn split_list_items(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in inner.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                ',' => {
                    items.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    items.push(current);

    items
        .iter()
        .map(|item| strip_quotes(item.trim()).to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn render(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Str(s) => render_str(s),
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(|i| render_item(i)).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Null => String::new(),
    }
}

/// Quote a string whenever a bare rendering would re-coerce to something
/// other than the same string.
fn render_str(s: &str) -> String {
    let reparses_differently = s.is_empty()
        || s == "true"
        || s == "false"
        || s == "null"
        || s.parse::<i64>().is_ok()
        || s.starts_with('[')
        || is_quoted(s)
        || s.trim() != s;
    if reparses_differently {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

fn render_item(item: &str) -> String {
    if item.contains(',') || is_quoted(item) || item.trim() != item {
        format!("\"{}\"", item)
    } else {
        item.to_string()
    }
}

fn is_quoted(s: &str) -> bool {
    (s.len() >= 2 && s.starts_with('"') && s.ends_with('"'))
        || (s.len() >= 2 && s.starts_with('\'') && s.ends_with('\''))
}

fn strip_quotes(s: &str) -> &str {
    if is_quoted(s) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(raw: &str) -> Option<Value> {
        let text = format!("---\nk: {}\n---\nbody", raw);
        let (meta, _) = parse(&text);
        meta.get("k").cloned()
    }

    #[test]
    fn coercion_table() {
        assert_eq!(
            parse_one("[a, b]"),
            Some(Value::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            parse_one("[\"x, y\", z]"),
            Some(Value::List(vec!["x, y".into(), "z".into()]))
        );
        assert_eq!(parse_one("\"42\""), Some(Value::Str("42".into())));
        assert_eq!(parse_one("'hi'"), Some(Value::Str("hi".into())));
        assert_eq!(parse_one("true"), Some(Value::Bool(true)));
        assert_eq!(parse_one("false"), Some(Value::Bool(false)));
        assert_eq!(parse_one("null"), None);
        assert_eq!(parse_one("42"), Some(Value::Number(42)));
        assert_eq!(parse_one("-7"), Some(Value::Number(-7)));
        assert_eq!(parse_one("2.5"), Some(Value::Str("2.5".into())));
        assert_eq!(parse_one("hello world"), Some(Value::Str("hello world".into())));
        assert_eq!(parse_one("2026-08-29"), Some(Value::Str("2026-08-29".into())));
    }

    #[test]
    fn missing_block_is_all_body() {
        let (meta, body) = parse("# Just a note\n\nNo metadata here.");
        assert!(meta.is_empty());
        assert_eq!(body, "# Just a note\n\nNo metadata here.");
    }

    #[test]
    fn unterminated_block_is_all_body() {
        let text = "---\ntype: card\nno closing delimiter";
        let (meta, body) = parse(text);
        assert!(meta.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn line_without_colon_is_malformed() {
        let text = "---\ntype card\n---\nbody";
        let (meta, body) = parse(text);
        assert!(meta.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn body_is_preserved() {
        let (meta, body) = parse("---\ntype: card\n---\n\n# Front\n\nBack text");
        assert_eq!(meta.get("type"), Some(&Value::Str("card".into())));
        assert_eq!(body, "# Front\n\nBack text");
    }

    #[test]
    fn empty_body_round_trips() {
        let mut meta = Metadata::new();
        meta.insert("type".into(), Value::Str("card".into()));
        let text = serialize(&meta, "");
        let (parsed, body) = parse(&text);
        assert_eq!(parsed, meta);
        assert_eq!(body, "");
    }

    #[test]
    fn round_trip_mixed_metadata() {
        let mut meta = Metadata::new();
        meta.insert("type".into(), Value::Str("card".into()));
        meta.insert("interval".into(), Value::Number(6));
        meta.insert("ease".into(), Value::Str("2.5".into()));
        meta.insert("pinned".into(), Value::Bool(true));
        meta.insert(
            "tags".into(),
            Value::List(vec!["rust".into(), "memory safety".into()]),
        );
        meta.insert("title".into(), Value::Str("42".into())); // must survive quoted
        let body = "# Question\n\nAnswer paragraph.\n";

        let (parsed_meta, parsed_body) = parse(&serialize(&meta, body));
        assert_eq!(parsed_meta, meta);
        assert_eq!(parsed_body, body);
    }

    #[test]
    fn list_items_with_commas_survive_round_trip() {
        let mut meta = Metadata::new();
        meta.insert(
            "tags".into(),
            Value::List(vec!["x, y".into(), "z".into()]),
        );
        let text = serialize(&meta, "");
        let (parsed, _) = parse(&text);
        assert_eq!(parsed, meta);

        // mixed quote styles, commas inside both
        assert_eq!(
            parse_one("['a, b', \"c, d\", e]"),
            Some(Value::List(vec!["a, b".into(), "c, d".into(), "e".into()]))
        );
    }

    #[test]
    fn null_serializes_by_omission() {
        let mut meta = Metadata::new();
        meta.insert("finished".into(), Value::Null);
        meta.insert("status".into(), Value::Str("reading".into()));
        let text = serialize(&meta, "");
        assert!(!text.contains("finished"));
        let (parsed, _) = parse(&text);
        assert!(!parsed.contains_key("finished"));
    }

    #[test]
    fn accessors_are_lenient() {
        assert_eq!(Value::Str("2.5".into()).as_f32(), Some(2.5));
        assert_eq!(Value::Number(3).as_f32(), Some(3.0));
        assert_eq!(Value::Str("17".into()).as_i64(), Some(17));
        assert_eq!(
            Value::Str("a, b".into()).to_string_list(),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
