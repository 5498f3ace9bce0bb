use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::wikitext::enums::QueryType;
use crate::wikitext::errors::{Result, WtError};

/// A parsed page: text runs and templates, in source order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Page {
    pub elements: Vec<Element>,
}

/// One top-level piece of a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Element {
    /// Page text outside any template. Never empty.
    WikitextRun(String),
    Template(Template),
}

/// A template invocation, `{{Title|field|...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub title: String,
    pub fields: Vec<Field>,
}

/// Template field: either `key=value` or a bare positional value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Field {
    KeyValue { key: String, value: Value },
    Positional { value: Value },
}

/// The content of a field; may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Value {
    pub parts: Vec<ValuePart>,
}

/// A part of a field's value.
///
/// Examples:
/// - TextToken("hello")
/// - NestedTemplate(Template { title: "T", fields: [...] })
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ValuePart {
    NestedTemplate(Template),
    /// Raw text between delimiters. Never empty.
    TextToken(String),
}

impl Page {
    pub fn new(elements: Vec<Element>) -> Self {
        Page { elements }
    }

    /// Top-level templates, in order. Nested templates are not included.
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.elements.iter().filter_map(Element::as_template)
    }

    /// First top-level template whose title matches `name` according to `mode`.
    pub fn find_template(&self, name: &str, mode: QueryType) -> Option<&Template> {
        self.templates().find(|t| mode.matches(&t.title, name))
    }

    /// Render back to wikitext. Whitespace inside templates is normalised, so
    /// this is not byte-identical to the parsed input.
    pub fn to_wikitext(&self) -> String {
        self.elements.iter().map(Element::to_wikitext).collect()
    }
}

impl Element {
    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Element::Template(t) => Some(t),
            Element::WikitextRun(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Element::WikitextRun(text) => Some(text),
            Element::Template(_) => None,
        }
    }

    pub fn to_wikitext(&self) -> String {
        match self {
            Element::WikitextRun(text) => text.clone(),
            Element::Template(t) => t.to_wikitext(),
        }
    }
}

impl Template {
    pub fn new<T: Into<String>>(title: T, fields: Vec<Field>) -> Self {
        Template {
            title: title.into(),
            fields,
        }
    }

    /// First key/value field whose key matches `name` according to `mode`.
    pub fn field(&self, name: &str, mode: QueryType) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.key().is_some_and(|k| mode.matches(k, name)))
    }

    /// Value of the first field keyed exactly `name` (case-insensitive).
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.field(name, QueryType::Exact).map(Field::value)
    }

    /// Like `named`, but a missing key is an error.
    pub fn get_named(&self, name: &str) -> Result<&Value> {
        self.named(name).ok_or_else(|| {
            WtError::not_found(format!(
                "Field '{}' not found in template '{}'",
                name, self.title
            ))
        })
    }

    /// Positional field by index (0-based), skipping key/value fields.
    pub fn positional(&self, idx: usize) -> Result<&Value> {
        let positional = self
            .fields
            .iter()
            .filter(|f| f.key().is_none())
            .map(Field::value)
            .collect_vec();
        positional
            .get(idx)
            .copied()
            .ok_or_else(|| WtError::index_oob(idx, positional.len()))
    }

    /// `(key, plain text)` for every key/value field, in order. This is what
    /// infobox extraction usually wants.
    pub fn named_values(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|f| match f {
                Field::KeyValue { key, value } => {
                    Some((key.clone(), value.to_plain().trim().to_string()))
                }
                Field::Positional { .. } => None,
            })
            .collect()
    }

    /// Brief plain representation: `Title: pos, key=value, ...`
    pub fn to_plain(&self) -> String {
        if self.fields.is_empty() {
            return self.title.clone();
        }
        let pieces = self.fields.iter().map(|f| match f {
            Field::KeyValue { key, value } => format!("{}={}", key, value.to_plain()),
            Field::Positional { value } => value.to_plain(),
        });
        format!("{}: {}", self.title, pieces.format(", "))
    }

    /// `{{Title|field|...}}`
    pub fn to_wikitext(&self) -> String {
        let mut s = String::from("{{");
        s.push_str(&self.title);
        for field in &self.fields {
            s.push('|');
            s.push_str(&field.to_wikitext());
        }
        s.push_str("}}");
        s
    }
}

impl Field {
    pub fn key_value<K: Into<String>>(key: K, value: Value) -> Self {
        Field::KeyValue {
            key: key.into(),
            value,
        }
    }

    pub fn positional(value: Value) -> Self {
        Field::Positional { value }
    }

    /// The key, for key/value fields.
    pub fn key(&self) -> Option<&str> {
        match self {
            Field::KeyValue { key, .. } => Some(key),
            Field::Positional { .. } => None,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Field::KeyValue { value, .. } | Field::Positional { value } => value,
        }
    }

    pub fn to_wikitext(&self) -> String {
        match self {
            Field::KeyValue { key, value } => format!("{}={}", key, value.to_wikitext()),
            Field::Positional { value } => value.to_wikitext(),
        }
    }
}

impl Value {
    pub fn new(parts: Vec<ValuePart>) -> Self {
        Value { parts }
    }

    /// Convenience for a value holding a single text token.
    pub fn text<T: Into<String>>(text: T) -> Self {
        Value::new(vec![ValuePart::TextToken(text.into())])
    }

    pub fn parts(&self) -> &[ValuePart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The first part that isn't whitespace-only text. Handles values like
    /// `difficulty= {{Num|4.67}}`, where the leading space is its own token.
    pub fn first_meaningful_part(&self) -> Option<&ValuePart> {
        self.parts.iter().find(|part| match part {
            ValuePart::TextToken(t) => !t.trim().is_empty(),
            ValuePart::NestedTemplate(_) => true,
        })
    }

    /// Concatenated `to_plain()` of every part.
    pub fn to_plain(&self) -> String {
        self.parts.iter().map(ValuePart::to_plain).collect()
    }

    pub fn to_wikitext(&self) -> String {
        self.parts.iter().map(ValuePart::to_wikitext).collect()
    }
}

impl ValuePart {
    pub fn as_template(&self) -> Option<&Template> {
        match self {
            ValuePart::NestedTemplate(t) => Some(t),
            ValuePart::TextToken(_) => None,
        }
    }

    /// Text as-is; nested templates via `Template::to_plain()`.
    pub fn to_plain(&self) -> String {
        match self {
            ValuePart::TextToken(s) => s.clone(),
            ValuePart::NestedTemplate(t) => t.to_plain(),
        }
    }

    pub fn to_wikitext(&self) -> String {
        match self {
            ValuePart::TextToken(s) => s.clone(),
            ValuePart::NestedTemplate(t) => t.to_wikitext(),
        }
    }
}
