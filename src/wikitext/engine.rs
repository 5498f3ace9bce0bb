//! Backtracking combinators over a `Cursor`.
//!
//! Every rule is a plain function `fn(&mut Engine) -> PResult<T>`. A rule
//! that does not match returns `Err(Failure)`; the combinators below are the
//! only places that catch a failure and roll the cursor back. Failures marked
//! `fatal` are never caught, they abort the whole parse.

use std::borrow::Cow;

use regex::Regex;

use crate::wikitext::cursor::{Cursor, Position};
use crate::wikitext::errors::WtError;
use crate::wikitext::trace::{LogSink, ParseOptions, TraceEvent, TraceSink};

/// A rule did not match at `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub position: Position,
    /// What the rule was looking for, e.g. `"}}"` or `a title`.
    pub expected: Cow<'static, str>,
    /// Set only when the nesting limit is hit.
    pub fatal: bool,
}

pub type PResult<T> = Result<T, Failure>;

/// One alternative handed to `Engine::any_of`.
pub type Alternative<'r, 'a, 's, T> = &'r dyn Fn(&mut Engine<'a, 's>) -> PResult<T>;

pub struct Engine<'a, 's> {
    cursor: Cursor<'a>,
    options: &'s ParseOptions,
    sink: Option<&'s mut dyn TraceSink>,
    /// Closing literal of the innermost open scope.
    scope_end: Option<&'static str>,
    depth: usize,
    furthest: Option<Failure>,
}

impl<'a, 's> Engine<'a, 's> {
    pub fn new(
        text: &'a str,
        options: &'s ParseOptions,
        sink: Option<&'s mut dyn TraceSink>,
    ) -> Self {
        Self {
            cursor: Cursor::new(text),
            options,
            sink,
            scope_end: None,
            depth: 0,
            furthest: None,
        }
    }

    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Rule-entry hook. Does nothing unless tracing is on.
    pub fn enter(&mut self, rule: &'static str) {
        if !self.options.trace {
            return;
        }
        let pos = self.cursor.position();
        let nearby = self.cursor.nearby(self.options.context_width);
        let event = TraceEvent {
            rule,
            line: pos.line,
            column: pos.column,
            nearby: &nearby,
        };
        match self.sink.as_mut() {
            Some(sink) => sink.on_rule(&event),
            None => LogSink.on_rule(&event),
        }
    }

    /// End of input, or (inside a scope) nothing but whitespace before the
    /// scope's closing literal.
    pub fn at_end(&self) -> bool {
        if self.cursor.at_end() {
            return true;
        }
        match self.scope_end {
            Some(close) => self.cursor.rest().trim_start().starts_with(close),
            None => false,
        }
    }

    /// Reject at the current position.
    pub fn fail<T>(&mut self, expected: impl Into<Cow<'static, str>>) -> PResult<T> {
        let failure = Failure {
            position: self.cursor.position(),
            expected: expected.into(),
            fatal: false,
        };
        self.record(&failure);
        Err(failure)
    }

    /// Succeed only when nothing but the scope's tail (or nothing at all) is left.
    pub fn expect_end(&mut self) -> PResult<()> {
        if self.at_end() {
            return Ok(());
        }
        self.fail("end of input")
    }

    fn abort<T>(&mut self, expected: impl Into<Cow<'static, str>>) -> PResult<T> {
        let failure = Failure {
            position: self.cursor.position(),
            expected: expected.into(),
            fatal: true,
        };
        self.record(&failure);
        Err(failure)
    }

    fn record(&mut self, failure: &Failure) {
        let further = self
            .furthest
            .as_ref()
            .is_none_or(|seen| failure.position.offset >= seen.position.offset);
        if further {
            self.furthest = Some(failure.clone());
        }
    }

    /// Consume exactly `literal`.
    pub fn expect(&mut self, literal: &'static str) -> PResult<&'a str> {
        if self.cursor.starts_with(literal) {
            Ok(self.cursor.advance(literal.len()))
        } else {
            self.fail(format!("{literal:?}"))
        }
    }

    /// Like `expect`, but whitespace before the literal is allowed.
    pub fn expect_token(&mut self, literal: &'static str) -> PResult<&'a str> {
        let mark = self.cursor.save();
        self.cursor.skip_whitespace();
        let found = self.expect(literal);
        if found.is_err() {
            self.cursor.restore(mark);
        }
        found
    }

    /// Skip whitespace, then match `pattern` right at the cursor.
    pub fn token(&mut self, pattern: &Regex, what: &'static str) -> PResult<&'a str> {
        let mark = self.cursor.save();
        self.cursor.skip_whitespace();
        match self.cursor.eat_regex(pattern) {
            Some(text) => Ok(text),
            None => {
                let failure = self.fail(what);
                self.cursor.restore(mark);
                failure
            }
        }
    }

    /// Everything up to (not including) the first match of `delimiter`, or to
    /// the end of input. Never fails; may be empty.
    pub fn substring_before(&mut self, delimiter: &Regex) -> &'a str {
        let len = self
            .cursor
            .distance_to(delimiter)
            .unwrap_or(self.cursor.rest().len());
        self.cursor.advance(len)
    }

    /// Run `rule`; a non-fatal failure becomes `None` with the cursor restored.
    pub fn maybe<T>(&mut self, rule: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<Option<T>> {
        let mark = self.cursor.save();
        match rule(self) {
            Ok(value) => Ok(Some(value)),
            Err(failure) if failure.fatal => Err(failure),
            Err(_) => {
                self.cursor.restore(mark);
                Ok(None)
            }
        }
    }

    /// First alternative that matches wins. When all fail, the last
    /// alternative's failure is returned.
    pub fn any_of<T>(&mut self, alternatives: &[Alternative<'_, 'a, 's, T>]) -> PResult<T> {
        let mark = self.cursor.save();
        let mut last = None;
        for alternative in alternatives {
            match alternative(self) {
                Ok(value) => return Ok(value),
                Err(failure) if failure.fatal => return Err(failure),
                Err(failure) => {
                    self.cursor.restore(mark);
                    last = Some(failure);
                }
            }
        }
        match last {
            Some(failure) => Err(failure),
            None => self.fail("an alternative"),
        }
    }

    /// Apply `rule` until it fails or the scope ends. Zero matches is fine.
    pub fn sequence_of<T>(&mut self, rule: impl Fn(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        let mut items = Vec::new();
        while !self.at_end() {
            let mark = self.cursor.save();
            match rule(self) {
                Ok(item) => {
                    items.push(item);
                    if self.cursor.offset() == mark.offset() {
                        break;
                    }
                }
                Err(failure) if failure.fatal => return Err(failure),
                Err(failure) => {
                    log::trace!(
                        "repetition stopped after {} item(s): expected {} at {}:{}",
                        items.len(),
                        failure.expected,
                        failure.position.line,
                        failure.position.column
                    );
                    self.cursor.restore(mark);
                    break;
                }
            }
        }
        Ok(items)
    }

    /// `rule`, then `separator rule` repeatedly. Stops when the separator is
    /// missing or the scope ends; a failing `rule` fails the whole list.
    pub fn list_of<T>(
        &mut self,
        separator: &'static str,
        rule: impl Fn(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        let mut items = Vec::new();
        while !self.at_end() {
            items.push(rule(self)?);
            if self.maybe(|e| e.expect_token(separator))?.is_none() {
                break;
            }
        }
        Ok(items)
    }

    /// `open`, `inner`, `close`. On any failure the cursor goes back to before
    /// `open`. While `inner` runs, `at_end` watches for `close`.
    pub fn scope_of<T>(
        &mut self,
        open: &'static str,
        inner: impl FnOnce(&mut Self) -> PResult<T>,
        close: &'static str,
    ) -> PResult<T> {
        let mark = self.cursor.save();
        let result = self.scoped(open, inner, close);
        if result.is_err() {
            self.cursor.restore(mark);
        }
        result
    }

    fn scoped<T>(
        &mut self,
        open: &'static str,
        inner: impl FnOnce(&mut Self) -> PResult<T>,
        close: &'static str,
    ) -> PResult<T> {
        self.expect(open)?;
        if self.depth >= self.options.max_depth {
            return self.abort(format!("nesting at most {} deep", self.options.max_depth));
        }

        let outer = self.scope_end.replace(close);
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        self.scope_end = outer;

        let value = result?;
        self.expect_token(close)?;
        Ok(value)
    }

    /// Turn the outcome of a failed parse into the error the caller sees.
    ///
    /// A fatal failure is reported as is; anything else reports the furthest
    /// point the parse reached.
    pub fn into_error(mut self, failure: Option<Failure>) -> WtError {
        if let Some(failure) = failure.as_ref().filter(|f| f.fatal) {
            return WtError::too_deep(
                self.options.max_depth,
                failure.position.line,
                failure.position.column,
            );
        }
        let failure = match self.furthest.take().or(failure) {
            Some(failure) => failure,
            None => Failure {
                position: self.cursor.position(),
                expected: Cow::Borrowed("end of input"),
                fatal: false,
            },
        };
        let context: String = self
            .cursor
            .peek_from(failure.position.offset)
            .chars()
            .take(self.options.context_width)
            .collect();
        WtError::parse_at(
            format!("expected {}", failure.expected),
            failure.position.line,
            failure.position.column,
            failure.position.offset,
            context,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_regex::regex;

    fn letters(e: &mut Engine<'_, '_>) -> PResult<String> {
        e.token(regex!(r"^[a-z]+"), "letters").map(str::to_owned)
    }

    fn digits(e: &mut Engine<'_, '_>) -> PResult<String> {
        e.token(regex!(r"^[0-9]+"), "digits").map(str::to_owned)
    }

    #[test]
    fn any_of_rolls_back_between_alternatives() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("ab12", &opts, None);
        let both = |e: &mut Engine<'_, '_>| -> PResult<String> {
            let a = letters(e)?;
            let b = letters(e)?;
            Ok(a + &b)
        };
        let got = e.any_of::<String>(&[&both, &letters]).unwrap();
        assert_eq!(got, "ab");
        assert_eq!(e.cursor().rest(), "12");
    }

    #[test]
    fn any_of_reports_the_last_failure() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("!!", &opts, None);
        let err = e.any_of::<String>(&[&letters, &digits]).unwrap_err();
        assert_eq!(err.expected, "digits");
        assert_eq!(e.position().offset, 0);
    }

    #[test]
    fn sequence_of_stops_cleanly() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("ab cd 12", &opts, None);
        let words = e.sequence_of(letters).unwrap();
        assert_eq!(words, vec!["ab", "cd"]);
        assert_eq!(e.cursor().rest(), " 12");

        let none = e.sequence_of(letters).unwrap();
        assert!(none.is_empty());
        assert_eq!(e.cursor().rest(), " 12");
    }

    #[test]
    fn maybe_swallows_failure() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("12", &opts, None);
        assert_eq!(e.maybe(letters).unwrap(), None);
        assert_eq!(e.maybe(digits).unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn sequence_of_stops_on_zero_width_success() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("abc", &opts, None);
        let items = e.sequence_of(|_| Ok(1)).unwrap();
        assert_eq!(items, vec![1]);
        assert_eq!(e.position().offset, 0);
    }

    #[test]
    fn list_of_fails_when_rule_fails_after_separator() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("a,1", &opts, None);
        let err = e.list_of(",", letters).unwrap_err();
        assert_eq!(err.expected, "letters");
        assert_eq!(err.position.offset, 2);
    }

    #[test]
    fn expect_end_only_at_end() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("ab", &opts, None);
        assert_eq!(e.expect_end().unwrap_err().expected, "end of input");
        letters(&mut e).unwrap();
        assert!(e.expect_end().is_ok());
    }

    #[test]
    fn list_of_needs_separators() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("a, b ,c d", &opts, None);
        let items = e.list_of(",", letters).unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(e.cursor().rest(), " d");
    }

    #[test]
    fn scope_of_restores_on_missing_close() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("(abc", &opts, None);
        let err = e.scope_of("(", letters, ")").unwrap_err();
        assert_eq!(err.expected, "\")\"");
        assert_eq!(err.position.offset, 4);
        assert_eq!(e.position().offset, 0);
    }

    #[test]
    fn scope_end_stops_repetition() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("(ab cd )rest", &opts, None);
        let words = e.scope_of("(", |e| e.sequence_of(letters), ")").unwrap();
        assert_eq!(words, vec!["ab", "cd"]);
        assert_eq!(e.cursor().rest(), "rest");
    }

    #[test]
    fn substring_before_supports_alternation() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("abc|def}}", &opts, None);
        assert_eq!(e.substring_before(regex!(r"\}\}|\|")), "abc");
        assert_eq!(e.substring_before(regex!(r"\}\}|\|")), "");
        e.expect("|").unwrap();
        assert_eq!(e.substring_before(regex!(r"\}\}|\|")), "def");
        assert_eq!(e.substring_before(regex!(r"xyz")), "}}");
        assert!(e.at_end());
    }

    #[test]
    fn expect_is_exact_but_expect_token_skips_space() {
        let opts = ParseOptions::default();
        let mut e = Engine::new("  =x", &opts, None);
        assert!(e.expect("=").is_err());
        assert_eq!(e.position().offset, 0);
        assert_eq!(e.expect_token("=").unwrap(), "=");
        assert_eq!(e.cursor().rest(), "x");
    }

    #[test]
    fn nesting_limit_is_fatal() {
        let opts = ParseOptions {
            max_depth: 1,
            ..ParseOptions::default()
        };
        let mut e = Engine::new("((a))", &opts, None);
        fn nest(e: &mut Engine<'_, '_>) -> PResult<String> {
            e.any_of::<String>(&[&|e: &mut Engine<'_, '_>| e.scope_of("(", nest, ")"), &letters])
        }
        let err = e.maybe(nest).unwrap_err();
        assert!(err.fatal);
        assert!(matches!(e.into_error(Some(err)), WtError::TooDeep { limit: 1, .. }));
    }

    #[derive(Default)]
    struct Recorder(Vec<(&'static str, usize, String)>);

    impl TraceSink for Recorder {
        fn on_rule(&mut self, event: &TraceEvent<'_>) {
            self.0
                .push((event.rule, event.column, event.nearby.to_owned()));
        }
    }

    #[test]
    fn trace_sink_sees_rule_entries() {
        let opts = ParseOptions {
            trace: true,
            ..ParseOptions::default()
        };
        let mut recorder = Recorder::default();
        let mut e = Engine::new("xy", &opts, Some(&mut recorder));
        e.enter("first");
        e.expect("x").unwrap();
        e.enter("second");
        drop(e);
        assert_eq!(
            recorder.0,
            vec![("first", 1, "xy".to_owned()), ("second", 2, "y".to_owned())]
        );
    }

    #[test]
    fn tracing_off_means_no_events() {
        let opts = ParseOptions::default();
        let mut recorder = Recorder::default();
        let mut e = Engine::new("xy", &opts, Some(&mut recorder));
        e.enter("first");
        drop(e);
        assert!(recorder.0.is_empty());
    }
}
