//! This module implements the generic keyword-block layer: a deck as an
//! ordered sequence of blocks, each with a name, parameters, and typed data
//! rows. This layer knows nothing about meshes -- it's the format, not the
//! meaning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::fields::{split_fields, Field};
use crate::lines::{is_keyword_line, LogicalLines, KEYWORD_MARKER};

/// One parameter off a keyword line: `KEY=VALUE`, or a bare `KEY` flag.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
  /// The parameter name, upper-cased by the splitter.
  pub name: String,
  /// The coerced value, or nothing for a bare flag.
  pub value: Option<Field>
}

/// One keyword block: a name, its parameters in file order, and the data
/// rows that followed it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeywordBlock {
  /// The keyword, upper-cased, with the marker stripped.
  pub keyword: String,
  /// The parameters, in file order.
  pub parameters: Vec<Parameter>,
  /// The data rows, each a sequence of coerced scalars.
  pub data: Vec<Vec<Field>>
}

impl KeywordBlock {
  /// Parses a keyword line into a block with no data rows yet. The line must
  /// already be a logical line, i.e. joined and comment-free.
  pub fn from_header(line: &str) -> Self {
    let mut parts = split_fields(line).into_iter();
    let first = parts.next().unwrap_or_default();
    let keyword = first.trim_start_matches(KEYWORD_MARKER).to_string();
    let parameters = parts
      .map(|p| match p.split_once('=') {
        Some((k, v)) => Parameter {
          name: k.to_string(),
          value: Some(Field::coerce(v))
        },
        None => Parameter { name: p, value: None }
      })
      .collect();
    return Self { keyword, parameters, data: Vec::new() };
  }

  /// Looks up a parameter by its upper-case name.
  pub fn parameter(&self, name: &str) -> Option<&Parameter> {
    return self.parameters.iter().find(|p| p.name == name);
  }

  /// Returns the value of a parameter rendered back to a string, if the
  /// parameter is present and carries one.
  pub fn parameter_text(&self, name: &str) -> Option<String> {
    return self
      .parameter(name)
      .and_then(|p| p.value.as_ref())
      .map(|v| v.to_string());
  }

  /// Checks if a bare flag parameter is present.
  pub fn has_flag(&self, name: &str) -> bool {
    return self.parameter(name).is_some_and(|p| p.value.is_none());
  }
}

/// Parses a whole deck into its sequence of keyword blocks. Blank lines are
/// skipped; a data row before the first keyword is an error.
pub fn parse_blocks<R: BufRead>(
  reader: R
) -> Result<Vec<KeywordBlock>, ParseError> {
  let mut lines = LogicalLines::new(reader);
  let mut blocks: Vec<KeywordBlock> = Vec::new();
  while let Some(line) = lines.next_logical()? {
    if line.is_empty() {
      continue;
    }
    if is_keyword_line(&line) {
      let block = KeywordBlock::from_header(&line);
      debug!(
        "Line {}: keyword block \"{}\" ({} parameters).",
        lines.line_number(),
        block.keyword,
        block.parameters.len()
      );
      blocks.push(block);
    } else {
      let row: Vec<Field> =
        split_fields(&line).iter().map(|s| Field::coerce(s)).collect();
      match blocks.last_mut() {
        Some(block) => block.data.push(row),
        None => {
          return Err(ParseError::malformed(
            lines.line_number(),
            format!("data row before any keyword: {}", line)
          ));
        }
      }
    }
  }
  return Ok(blocks);
}

/// Utility function -- opens and parses a file, stamping errors with its
/// name. The handle only lives for the duration of the parse.
pub fn parse_blocks_file<S: AsRef<Path>>(
  p: S
) -> Result<Vec<KeywordBlock>, ParseError> {
  let name = deck_name(p.as_ref());
  let file =
    File::open(p.as_ref()).map_err(|e| ParseError::from(e).in_file(&name))?;
  return parse_blocks(BufReader::new(file)).map_err(|e| e.in_file(&name));
}

/// Returns a human-readable name for a deck path: the file name if there is
/// one, the whole path otherwise.
pub(crate) fn deck_name(p: &Path) -> String {
  return p
    .file_name()
    .and_then(|s| s.to_str())
    .map(String::from)
    .unwrap_or_else(|| p.display().to_string());
}
