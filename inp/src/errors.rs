//! This module defines the errors that can come out of reading a mesh input
//! deck. All of them are fatal to the whole parse -- there is no partial
//! success and no retry, callers get either a finished mesh or one of these.

use std::error::Error;
use std::fmt::Display;
use std::io;

/// The errors that can abort a parse.
#[derive(Debug, derive_more::From)]
#[non_exhaustive]
pub enum ParseError {
  /// The underlying reader failed on us.
  Io(io::Error),
  /// A structural violation in the deck, like a data row before any keyword,
  /// an unterminated quoted string, or an end-of-stream mid-continuation.
  #[from(ignore)]
  MalformedContent {
    /// The physical line the violation was found on, when there is one.
    line: Option<usize>,
    /// The offending text, or a description of the violation.
    context: String
  },
  /// A node block whose coordinate arity disagrees with the first one.
  #[from(ignore)]
  DimensionMismatch {
    /// The arity fixed by the first node block.
    expected: usize,
    /// The arity found in the offending row.
    found: usize,
    /// The physical line the offending row was on.
    line: usize
  },
  /// The deck contains structure we explicitly refuse to handle.
  #[from(ignore)]
  UnsupportedStructure {
    /// A description of what we found.
    what: String
  },
  /// Another error, wrapped with the name of the deck it came from.
  #[from(ignore)]
  InFile {
    /// The file name.
    name: String,
    /// The underlying error.
    inner: Box<ParseError>
  }
}

/// A coarse, context-free tag for the category of a parse error, so callers
/// and tests can match on what happened without destructuring.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorKind {
  /// Input/output failure.
  Io,
  /// Structural violation.
  MalformedContent,
  /// Coordinate arity disagreement between node blocks.
  DimensionMismatch,
  /// Deck structure we refuse to handle.
  UnsupportedStructure
}

impl ParseError {
  /// Convenience constructor for content errors tied to a physical line.
  pub(crate) fn malformed(line: usize, context: String) -> Self {
    return Self::MalformedContent { line: Some(line), context };
  }

  /// Returns the category of this error, looking through file wrappers.
  pub fn kind(&self) -> ErrorKind {
    return match self {
      Self::Io(_) => ErrorKind::Io,
      Self::MalformedContent { .. } => ErrorKind::MalformedContent,
      Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
      Self::UnsupportedStructure { .. } => ErrorKind::UnsupportedStructure,
      Self::InFile { inner, .. } => inner.kind()
    };
  }

  /// Wraps this error with the name of the deck it came from.
  pub fn in_file(self, name: &str) -> Self {
    return Self::InFile { name: name.to_string(), inner: Box::new(self) };
  }
}

impl Display for ParseError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Io(e) => write!(f, "input/output error: {}", e),
      Self::MalformedContent { line: Some(n), context } => {
        write!(f, "malformed content on line {}: {}", n, context)
      },
      Self::MalformedContent { line: None, context } => {
        write!(f, "malformed content: {}", context)
      },
      Self::DimensionMismatch { expected, found, line } => write!(
        f,
        "node row on line {} has {} coordinates, earlier blocks had {}",
        line,
        found,
        expected
      ),
      Self::UnsupportedStructure { what } => {
        write!(f, "unsupported structure: {}", what)
      },
      Self::InFile { name, inner } => write!(f, "in {}: {}", name, inner)
    };
  }
}

impl Error for ParseError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Io(e) => Some(e),
      Self::InFile { inner, .. } => Some(inner.as_ref()),
      _ => None
    };
  }
}
