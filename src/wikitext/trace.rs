//! Parse options and the rule-entry diagnostics hook.
//!
//! Tracing is switched on per parse through `ParseOptions::trace`; nothing in
//! here is global. When on, every grammar rule entry produces a `TraceEvent`
//! for the active `TraceSink`. `LogSink` (the default) forwards events to
//! `log::trace!`, so `RUST_LOG=wikitext_templates=trace` shows them.

use derive_builder::Builder;

/// Knobs for a single parse call.
///
/// ```rust,ignore
/// let options = ParseOptionsBuilder::default().trace(true).max_depth(32).build()?;
/// let page = parse_with("{{T}}", &options)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct ParseOptions {
    /// Report every grammar rule entry to the trace sink.
    pub trace: bool,
    /// Deepest template nesting accepted before the parse aborts.
    pub max_depth: usize,
    /// How many characters of nearby input go into traces and errors.
    pub context_width: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trace: false,
            max_depth: 256,
            context_width: 24,
        }
    }
}

/// One rule entry, as seen by a `TraceSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent<'a> {
    pub rule: &'static str,
    pub line: usize,
    pub column: usize,
    pub nearby: &'a str,
}

/// Receiver for rule-entry events.
pub trait TraceSink {
    fn on_rule(&mut self, event: &TraceEvent<'_>);
}

impl<F> TraceSink for F
where
    F: FnMut(&TraceEvent<'_>),
{
    fn on_rule(&mut self, event: &TraceEvent<'_>) {
        self(event)
    }
}

/// Sends events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn on_rule(&mut self, event: &TraceEvent<'_>) {
        log::trace!(
            "{} at {}:{} near {:?}",
            event.rule,
            event.line,
            event.column,
            event.nearby
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_falls_back_to_defaults() {
        let opts = ParseOptionsBuilder::default().trace(true).build().unwrap();
        assert!(opts.trace);
        assert_eq!(opts.max_depth, ParseOptions::default().max_depth);
        assert_eq!(opts.context_width, 24);
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |e: &TraceEvent<'_>| seen.push(e.rule);
            sink.on_rule(&TraceEvent {
                rule: "page",
                line: 1,
                column: 1,
                nearby: "",
            });
        }
        assert_eq!(seen, vec!["page"]);
    }
}
