//! This module implements the logical-line layer: reading physical lines off
//! any buffered reader while skipping comments, joining continuations, and
//! enforcing the quote rules. Both the generic block parser and the mesh
//! scanner sit on top of this one reader, so there is exactly one place in
//! the crate that knows what a line even is.

use std::io::BufRead;

use crate::errors::ParseError;

/// The marker character that begins a keyword line.
pub const KEYWORD_MARKER: char = '*';

/// The marker that begins a comment line -- a doubled keyword marker.
pub const COMMENT_MARKER: &str = "**";

/// The field separator. A trailing one is a continuation cue.
pub const SEPARATOR: char = ',';

/// The quote delimiter. Quoted text never spans physical lines.
pub const QUOTE: char = '"';

/// Checks if a line is a keyword line (and not a comment).
pub fn is_keyword_line(line: &str) -> bool {
  return line.starts_with(KEYWORD_MARKER) && !line.starts_with(COMMENT_MARKER);
}

/// Produces logical lines from a buffered reader: comments are dropped
/// anywhere (even between continuation fragments), fragments ending in a
/// separator are joined, and physical line numbers are kept for errors.
pub struct LogicalLines<R: BufRead> {
  /// The underlying reader.
  reader: R,
  /// The number of the last physical line read, starting at 1.
  line_number: usize
}

impl<R: BufRead> LogicalLines<R> {
  /// Wraps a reader.
  pub fn new(reader: R) -> Self {
    return Self { reader, line_number: 0 };
  }

  /// Returns the number of the last physical line read.
  pub fn line_number(&self) -> usize {
    return self.line_number;
  }

  /// Reads one stripped physical line, skipping comment lines. Returns
  /// `Ok(None)` at end of stream. Fails if a line holds an odd number of
  /// quote characters, since a quoted string must open and close on the
  /// same physical line.
  fn next_raw(&mut self) -> Result<Option<String>, ParseError> {
    loop {
      let mut raw = String::new();
      if self.reader.read_line(&mut raw)? == 0 {
        return Ok(None);
      }
      self.line_number += 1;
      let line = raw.trim();
      if line.starts_with(COMMENT_MARKER) {
        continue;
      }
      if line.chars().filter(|c| *c == QUOTE).count() % 2 != 0 {
        return Err(ParseError::malformed(
          self.line_number,
          format!("unterminated quoted string: {}", line)
        ));
      }
      return Ok(Some(line.to_string()));
    }
  }

  /// Reads the next logical line: one stripped physical line, extended with
  /// further fragments for as long as it ends with the separator. Returns
  /// `Ok(None)` at end of stream; fails if the stream ends while a
  /// continuation is still pending.
  pub fn next_logical(&mut self) -> Result<Option<String>, ParseError> {
    let mut line = match self.next_raw()? {
      Some(l) => l,
      None => return Ok(None)
    };
    while line.ends_with(SEPARATOR) {
      match self.next_raw()? {
        Some(fragment) => line.push_str(&fragment),
        None => {
          return Err(ParseError::malformed(
            self.line_number,
            format!("end of stream while expecting a continuation of: {}", line)
          ));
        }
      }
    }
    return Ok(Some(line));
  }
}
