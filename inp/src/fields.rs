//! This module implements the typed scalar fields that decks are made of,
//! plus the comma-splitting and best-effort coercion rules for them.
//!
//! Everything outside double quotes is case-folded to upper case and has its
//! whitespace dropped, so the rest of the crate can match on exact strings.
//! Quoted text is sacred: kept verbatim, commas and all.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::lines::{QUOTE, SEPARATOR};

/// One scalar value out of a deck, coerced with the integer-first rule.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
pub enum Field {
  /// An integral number. Tried first so "3" never becomes 3.0.
  Integer(isize),
  /// A floating-point number.
  Real(f64),
  /// Anything else; quoted text lands here with the quotes stripped.
  Text(String)
}

impl Field {
  /// Coerces a raw field string. Integer parse first, float parse second,
  /// then quote-stripping, and finally the string taken as-is.
  pub fn coerce(s: &str) -> Self {
    if let Ok(i) = s.parse::<isize>() {
      return Self::Integer(i);
    }
    if let Ok(x) = s.parse::<f64>() {
      return Self::Real(x);
    }
    if s.len() >= 2 && s.starts_with(QUOTE) && s.ends_with(QUOTE) {
      return Self::Text(s[1..s.len() - 1].to_string());
    }
    return Self::Text(s.to_string());
  }

  /// Returns the integral value, if there is one.
  pub fn as_integer(&self) -> Option<isize> {
    return match self {
      Self::Integer(i) => Some(*i),
      _ => None
    };
  }

  /// Returns this field as an ID, i.e. a non-negative integer.
  pub fn as_id(&self) -> Option<usize> {
    return match self.as_integer() {
      Some(i) if i >= 0 => Some(i as usize),
      _ => None
    };
  }

  /// Returns the numeric value, widening integers. Text yields nothing.
  pub fn as_real(&self) -> Option<f64> {
    return match self {
      Self::Integer(i) => Some(*i as f64),
      Self::Real(x) => Some(*x),
      Self::Text(_) => None
    };
  }
}

impl Display for Field {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Integer(i) => write!(f, "{}", i),
      Self::Real(x) => write!(f, "{}", x),
      Self::Text(s) => write!(f, "{}", s)
    };
  }
}

/// Splits a logical line on commas, treating quote-delimited runs as atomic.
/// Outside quotes, whitespace is dropped and characters are upper-cased;
/// inside quotes everything is copied verbatim, delimiters included, so
/// [`Field::coerce`] can recognise and unwrap the quoted run later.
pub fn split_fields(line: &str) -> Vec<String> {
  let mut fields: Vec<String> = Vec::new();
  let mut current = String::new();
  let mut in_quotes = false;
  for c in line.chars() {
    if c == QUOTE {
      in_quotes = !in_quotes;
      current.push(c);
    } else if c == SEPARATOR && !in_quotes {
      fields.push(std::mem::take(&mut current));
    } else if in_quotes {
      current.push(c);
    } else if !c.is_whitespace() {
      current.extend(c.to_uppercase());
    }
  }
  fields.push(current);
  return fields;
}
