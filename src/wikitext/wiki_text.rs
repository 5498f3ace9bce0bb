//! Thin `WikiText` wrapper around the grammar.
//!
//! - `WikiText::new(input)` / `WikiText::from_file(path)` store the text only
//! - `get_parsed(&self)` parses on first use and caches the `Page`
//! - `into_parsed(self)` hands the `Page` over
//! - `page_name` getter/setter and `text()` accessor
//!
//! A failed parse is not cached; asking again re-parses and fails again.

use std::path::Path;
use std::sync::OnceLock;

use crate::wikitext::enums::QueryType;
use crate::wikitext::errors::Result;
use crate::wikitext::grammar::parse_with;
use crate::wikitext::parts::{Page, Template};
use crate::wikitext::trace::ParseOptions;

/// Wikitext plus its lazily parsed `Page`.
#[derive(Debug, Clone)]
pub struct WikiText {
    raw: String,
    page_name: Option<String>,
    options: ParseOptions,
    parsed: OnceLock<Page>,
}

impl WikiText {
    /// Wrap `input`. Nothing is parsed yet.
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self {
            raw: input.into(),
            page_name: None,
            options: ParseOptions::default(),
            parsed: OnceLock::new(),
        }
    }

    /// Read a page from disk. The file stem becomes the page name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut wt = Self::new(raw);
        wt.set_page_name(path.file_stem().map(|s| s.to_string_lossy().into_owned()));
        Ok(wt)
    }

    /// Use `options` for the (future) parse.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self.parsed = OnceLock::new();
        self
    }

    /// The parsed page, parsing on first call.
    pub fn get_parsed(&self) -> Result<&Page> {
        if let Some(page) = self.parsed.get() {
            return Ok(page);
        }
        let page = parse_with(&self.raw, &self.options)?;
        Ok(self.parsed.get_or_init(|| page))
    }

    /// Consume self and return the owned `Page`.
    pub fn into_parsed(self) -> Result<Page> {
        match self.parsed.into_inner() {
            Some(page) => Ok(page),
            None => parse_with(&self.raw, &self.options),
        }
    }

    /// First top-level template whose title matches `name` according to `mode`.
    pub fn get_template_by(&self, name: &str, mode: QueryType) -> Result<Option<&Template>> {
        Ok(self.get_parsed()?.find_template(name, mode))
    }

    pub fn page_name(&self) -> Option<&str> {
        self.page_name.as_deref()
    }

    /// Set the optional page name. Accepts `None` to clear it.
    pub fn set_page_name<S: Into<String>>(&mut self, page_name: Option<S>) {
        self.page_name = page_name.map(|s| s.into());
    }

    pub fn text(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_parse_and_cache() {
        let wt = WikiText::new("Plain text {{T|x=1}} trailing");
        let first = wt.get_parsed().expect("should parse") as *const Page;
        let second = wt.get_parsed().expect("cached") as *const Page;
        assert_eq!(first, second);
        assert_eq!(wt.get_parsed().unwrap().elements.len(), 3);
    }

    #[test]
    fn failures_are_reported_every_time() {
        let wt = WikiText::new("{{broken");
        assert!(wt.get_parsed().is_err());
        assert!(wt.get_parsed().is_err());
        assert!(wt.into_parsed().is_err());
    }

    #[test]
    fn template_lookup() {
        let wt = WikiText::new("{{Infobox tower|difficulty=5}}{{Navbox}}");
        let t = wt
            .get_template_by("infobox", QueryType::StartsWith)
            .unwrap()
            .expect("infobox present");
        assert_eq!(t.named("difficulty").unwrap().to_plain(), "5");
        assert!(wt.get_template_by("Missing", QueryType::Exact).unwrap().is_none());
    }

    #[test]
    fn options_apply_to_the_parse() {
        let opts = ParseOptions {
            max_depth: 1,
            ..ParseOptions::default()
        };
        let wt = WikiText::new("{{A|{{B}}}}").with_options(opts);
        assert!(wt.into_parsed().is_err());
    }

    #[test]
    fn page_name_setter_getter() {
        let mut wt = WikiText::new("dummy");
        assert!(wt.page_name().is_none());
        wt.set_page_name(Some("TestPage"));
        assert_eq!(wt.page_name(), Some("TestPage"));
        wt.set_page_name::<&str>(None);
        assert!(wt.page_name().is_none());
        assert_eq!(wt.text(), "dummy");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = WikiText::from_file("/definitely/not/here.wiki").unwrap_err();
        assert_eq!(err.kind(), "Io");
    }
}
