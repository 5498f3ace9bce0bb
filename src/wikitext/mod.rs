//! Wikitext module root
//!
//! Declares and re-exports the submodules that make up the template parser:
//! a scanning `cursor`, the backtracking `engine`, the `grammar` built on it,
//! and the `parts` data model it produces.
//!
//! ```rust,ignore
//! use wikitext_templates::wikitext::{parse, QueryType};
//!
//! let page = parse("{{Infobox|name=Tower|{{Num|5}}}}")?;
//! let infobox = page.find_template("infobox", QueryType::Exact).unwrap();
//! assert_eq!(infobox.named("name").unwrap().to_plain(), "Tower");
//! ```

pub mod cursor;
pub mod engine;
pub mod enums;
pub mod errors;
pub mod grammar;
pub mod parts;
pub mod trace;
pub mod wiki_text;

// Re-export commonly used types for ergonomic access.
pub use enums::QueryType;
pub use errors::{Result, WtError};
pub use grammar::{parse, parse_traced, parse_with};
pub use parts::{Element, Field, Page, Template, Value, ValuePart};
pub use trace::{LogSink, ParseOptions, ParseOptionsBuilder, TraceEvent, TraceSink};
pub use wiki_text::WikiText;
