//! This module implements the list of keyword headers the mesh scanner gives
//! meaning to. Classification is by exact match on the upper-cased keyword
//! name the block layer produces, so "NODE" matches a node block but the
//! likes of "NODEPRINT" fall through to the ignored-keyword path.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Generates the KeywordKind enum and its lookup tables.
macro_rules! gen_keywords {
  (
    $(
      {
        $desc:literal,
        $kname:ident,
        $names:expr
      },
    )*
  ) => {
    /// The header keywords that carry mesh data or structure.
    #[derive(
      Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd,
      Ord
    )]
    #[non_exhaustive]
    pub enum KeywordKind {
      $(
        #[doc = $desc]
        $kname,
      )*
    }

    impl KeywordKind {
      /// Returns all recognised keyword kinds.
      pub const fn all() -> &'static [Self] {
        return &[ $(Self::$kname,)* ];
      }

      /// Returns the upper-case keyword names that select this kind.
      pub fn names(&self) -> &'static [&'static str] {
        return match self {
          $(Self::$kname => &$names,)*
        };
      }

      /// Returns a short description of the keyword's role.
      pub const fn desc(&self) -> &'static str {
        return match self {
          $(Self::$kname => $desc,)*
        };
      }

      /// Classifies an upper-cased, marker-stripped keyword name. Returns
      /// None for keywords the scanner passes over.
      pub fn detect(keyword: &str) -> Option<Self> {
        return Self::all()
          .iter()
          .copied()
          .find(|k| k.names().iter().any(|n| *n == keyword));
      }
    }
  }
}

gen_keywords!(
  // node coordinates
  {
    "Node coordinate block",
    Node,
    ["NODE"]
  },
  // element connectivity
  {
    "Element connectivity block",
    Element,
    ["ELEMENT"]
  },
  // element sets
  {
    "Element set block",
    ElementSet,
    ["ELSET"]
  },
  // node sets
  {
    "Node set block",
    NodeSet,
    ["NSET"]
  },
  // part marker
  {
    "Part definition marker",
    Part,
    ["PART"]
  },
  // instance marker
  {
    "Part instance marker",
    Instance,
    ["INSTANCE"]
  },
);

impl Display for KeywordKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.desc());
  }
}
