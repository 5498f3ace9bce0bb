//! The template grammar, written as plain functions over `Engine`.
//!
//! ```text
//! page       := ( "{{" template "}}" | wikitext )+        to end of input
//! wikitext   := text before "{{"                           non-empty
//! template   := title "|"? ( field ( "|" field )* )?
//! title      := identifier+                                joined by " "
//! field      := key_value | positional
//! key_value  := title "=" value
//! positional := value
//! value      := ( "{{" template "}}" | token )*
//! token      := text before "}}" | "{{" | "|"            non-empty
//! ```
//!
//! Nesting recurses through `value`, so the Rust stack grows with template
//! depth. `ParseOptions::max_depth` caps it.

use itertools::Itertools;
use lazy_regex::regex;

use crate::wikitext::engine::{Engine, PResult};
use crate::wikitext::errors::Result;
use crate::wikitext::parts::{Element, Field, Page, Template, Value, ValuePart};
use crate::wikitext::trace::{ParseOptions, TraceSink};

/// Parse a whole page with default options.
pub fn parse(text: &str) -> Result<Page> {
    parse_with(text, &ParseOptions::default())
}

/// Parse a whole page. Rule tracing, if enabled, goes to the `log` facade.
pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Page> {
    run(Engine::new(text, options, None))
}

/// Parse a whole page, sending rule tracing (if enabled) to `sink`.
pub fn parse_traced(
    text: &str,
    options: &ParseOptions,
    sink: &mut dyn TraceSink,
) -> Result<Page> {
    run(Engine::new(text, options, Some(sink)))
}

fn run(mut engine: Engine<'_, '_>) -> Result<Page> {
    let parsed = page(&mut engine).and_then(|page| engine.expect_end().map(|()| page));
    match parsed {
        Ok(page) => {
            log::debug!("parsed page into {} element(s)", page.elements.len());
            Ok(page)
        }
        Err(failure) => Err(engine.into_error(Some(failure))),
    }
}

fn page(e: &mut Engine<'_, '_>) -> PResult<Page> {
    e.enter("page");
    let elements = e.sequence_of(|e| e.any_of::<Element>(&[&template_element, &wikitext_run]))?;
    if elements.is_empty() {
        return e.fail("wikitext or a template");
    }
    Ok(Page::new(elements))
}

fn template_element(e: &mut Engine<'_, '_>) -> PResult<Element> {
    braced_template(e).map(Element::Template)
}

fn wikitext_run(e: &mut Engine<'_, '_>) -> PResult<Element> {
    e.enter("wikitext_run");
    let text = e.substring_before(regex!(r"\{\{"));
    if text.is_empty() {
        return e.fail("wikitext");
    }
    Ok(Element::WikitextRun(text.to_owned()))
}

fn braced_template(e: &mut Engine<'_, '_>) -> PResult<Template> {
    e.scope_of("{{", template, "}}")
}

fn template(e: &mut Engine<'_, '_>) -> PResult<Template> {
    e.enter("template");
    let title = title(e)?;
    e.maybe(|e| e.expect_token("|"))?;
    let fields = e.list_of("|", field)?;
    Ok(Template::new(title, fields))
}

/// Identifier tokens separated by whitespace, joined with single spaces.
fn title(e: &mut Engine<'_, '_>) -> PResult<String> {
    e.enter("title");
    let words = e.sequence_of(|e| e.token(regex!(r"^[\p{L}/,.'():]+\w*"), "a title"))?;
    if words.is_empty() {
        return e.fail("a title");
    }
    Ok(words.iter().join(" "))
}

fn field(e: &mut Engine<'_, '_>) -> PResult<Field> {
    e.enter("field");
    e.any_of::<Field>(&[&key_value_field, &positional_field])
}

fn key_value_field(e: &mut Engine<'_, '_>) -> PResult<Field> {
    e.enter("key_value");
    let key = title(e)?;
    e.expect_token("=")?;
    Ok(Field::key_value(key, value(e)?))
}

fn positional_field(e: &mut Engine<'_, '_>) -> PResult<Field> {
    e.enter("positional");
    Ok(Field::positional(value(e)?))
}

fn value(e: &mut Engine<'_, '_>) -> PResult<Value> {
    e.enter("value");
    let parts = e.sequence_of(|e| e.any_of::<ValuePart>(&[&nested_template, &text_token]))?;
    Ok(Value::new(parts))
}

fn nested_template(e: &mut Engine<'_, '_>) -> PResult<ValuePart> {
    braced_template(e).map(ValuePart::NestedTemplate)
}

fn text_token(e: &mut Engine<'_, '_>) -> PResult<ValuePart> {
    e.enter("token");
    let text = e.substring_before(regex!(r"\}\}|\{\{|\|"));
    if text.is_empty() {
        return e.fail("text");
    }
    Ok(ValuePart::TextToken(text.to_owned()))
}
