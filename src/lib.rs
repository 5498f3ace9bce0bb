//! Parse MediaWiki template invocations (`{{Title|key=value|value}}`, nested
//! to any depth) into a `Page` tree for downstream inspection such as infobox
//! extraction.

pub mod wikitext;

pub use wikitext::{Page, ParseOptions, QueryType, WikiText, WtError, parse, parse_with};
