//! Error types for the wikitext module.
//!
//! Engine-level rejections (`engine::Failure`) are ordinary values that the
//! combinators recover from. Only what escapes the whole parse, plus the
//! lookup helpers' misses and I/O trouble, becomes a `WtError`.
//!
//! Exported items:
//! - `WtError` - main error enum.
//! - `Result<T>` - convenient alias `std::result::Result<T, WtError>`.

use std::error::Error;
use std::fmt;

/// The canonical result type used across the wikitext module.
pub type Result<T> = std::result::Result<T, WtError>;

/// Wikitext error.
///
/// - `Parse` - the input could not be matched as a page. Carries the
///    furthest position the parser reached and a snippet of the input there.
/// - `TooDeep` - templates were nested past `ParseOptions::max_depth`.
/// - `NotFound` - requested template/field was not present.
/// - `IndexOutOfBounds` - asked for the Nth positional field but there were
///    fewer; contains both the requested index and the available length.
/// - `Io` - wrapper for underlying I/O errors (reading a page from disk).
#[derive(Debug)]
pub enum WtError {
    Parse {
        msg: String,
        line: usize,
        column: usize,
        /// Byte offset in the source.
        offset: usize,
        /// Input text starting at the failure position.
        context: String,
    },
    TooDeep {
        limit: usize,
        line: usize,
        column: usize,
    },
    NotFound {
        msg: String,
    },
    IndexOutOfBounds {
        idx: usize,
        len: usize,
    },
    Io {
        msg: String,
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
}

impl WtError {
    /// Construct a parse error at a known position.
    pub fn parse_at<S: Into<String>>(
        msg: S,
        line: usize,
        column: usize,
        offset: usize,
        context: impl Into<String>,
    ) -> Self {
        WtError::Parse {
            msg: msg.into(),
            line,
            column,
            offset,
            context: context.into(),
        }
    }

    pub fn too_deep(limit: usize, line: usize, column: usize) -> Self {
        WtError::TooDeep {
            limit,
            line,
            column,
        }
    }

    /// Construct a not-found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        WtError::NotFound { msg: msg.into() }
    }

    /// Construct an index-out-of-bounds error.
    pub fn index_oob(idx: usize, len: usize) -> Self {
        WtError::IndexOutOfBounds { idx, len }
    }

    /// Wrap a std::io::Error or other error as an Io variant.
    pub fn io_err<E: Error + Send + Sync + 'static>(msg: impl Into<String>, e: E) -> Self {
        WtError::Io {
            msg: msg.into(),
            source: Some(Box::new(e)),
        }
    }

    /// Returns a short description of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WtError::Parse { .. } => "Parse",
            WtError::TooDeep { .. } => "TooDeep",
            WtError::NotFound { .. } => "NotFound",
            WtError::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            WtError::Io { .. } => "Io",
        }
    }

    /// `(line, column)` for errors tied to a place in the input.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            WtError::Parse { line, column, .. } | WtError::TooDeep { line, column, .. } => {
                Some((*line, *column))
            }
            _ => None,
        }
    }
}

impl fmt::Display for WtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WtError::Parse {
                msg,
                line,
                column,
                context,
                ..
            } => {
                if context.is_empty() {
                    write!(f, "Parse error at {}:{}: {} (at end of input)", line, column, msg)
                } else {
                    write!(f, "Parse error at {}:{}: {} near {:?}", line, column, msg, context)
                }
            }
            WtError::TooDeep {
                limit,
                line,
                column,
            } => write!(
                f,
                "Templates nested deeper than {} at {}:{}",
                limit, line, column
            ),
            WtError::NotFound { msg } => write!(f, "Not found: {}", msg),
            WtError::IndexOutOfBounds { idx, len } => {
                write!(f, "Index out of bounds: requested {}, length {}", idx, len)
            }
            WtError::Io { msg, source } => {
                if let Some(s) = source {
                    write!(f, "IO error: {} (cause: {})", msg, s)
                } else {
                    write!(f, "IO error: {}", msg)
                }
            }
        }
    }
}

impl Error for WtError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WtError::Io { source, .. } => source.as_ref().map(|b| b.as_ref() as &dyn Error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WtError {
    fn from(e: std::io::Error) -> Self {
        WtError::io_err("I/O error", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error_with_position() {
        let e = WtError::parse_at("expected \"}}\"", 3, 7, 42, "|x=1");
        let s = format!("{}", e);
        assert!(s.contains("3:7"));
        assert!(s.contains("expected \"}}\""));
        assert!(s.contains("|x=1"));
        assert_eq!(e.location(), Some((3, 7)));
    }

    #[test]
    fn display_parse_error_at_end() {
        let e = WtError::parse_at("expected \"}}\"", 1, 4, 3, "");
        assert!(format!("{}", e).contains("end of input"));
    }

    #[test]
    fn display_not_found() {
        let e = WtError::not_found("field 'name' missing");
        let s = format!("{}", e);
        assert!(s.contains("field 'name' missing"));
        assert_eq!(e.kind(), "NotFound");
        assert_eq!(e.location(), None);
    }

    #[test]
    fn io_conversion_has_source() {
        let io_err = std::io::Error::other("oh no");
        let e: WtError = io_err.into();
        let s = format!("{}", e);
        assert!(s.contains("I/O error"));
        assert!(s.contains("oh no"));
        assert!(e.source().is_some());
    }
}
