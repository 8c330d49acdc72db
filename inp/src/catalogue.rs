//! This module implements a catalogue of well-known element type tags and
//! what we know about them, so parsed topology can be sanity-checked and
//! tools can describe element types to humans. Decks are free to use tags
//! that aren't in here -- the type tag in a mesh is just a string, and an
//! unknown tag is taken on faith.

use std::fmt::Display;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Broad topological families of elements.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ElementFamily {
  /// Line topology: trusses, beams.
  Line,
  /// Surface topology: shells, membranes, plane stress/strain.
  Surface,
  /// Solid topology: continuum elements.
  Solid
}

/// Generates the KnownElement enum and its lookup tables.
macro_rules! gen_element_types {
  (
    $(($vn:ident, $nm:literal, $verts:literal, $fam:ident, $desc:literal),)*
  ) => {
    /// Element type tags we know the shape of.
    #[derive(
      Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq
    )]
    #[allow(missing_docs)]
    #[non_exhaustive]
    pub enum KnownElement {
      $($vn,)*
    }

    impl KnownElement {
      /// Returns the all-caps tag for the element type.
      pub const fn name(&self) -> &'static str {
        return match self {
          $(Self::$vn => $nm,)*
        };
      }

      /// Returns the number of vertices one element of this type has.
      pub const fn vertex_count(&self) -> usize {
        return match self {
          $(Self::$vn => $verts,)*
        };
      }

      /// Returns the topological family of the element type.
      pub const fn family(&self) -> ElementFamily {
        return match self {
          $(Self::$vn => ElementFamily::$fam,)*
        };
      }

      /// Returns a short human-readable description.
      pub const fn desc(&self) -> &'static str {
        return match self {
          $(Self::$vn => $desc,)*
        };
      }

      /// Returns a static slice with all known element types.
      pub const fn all() -> &'static [Self] {
        return &[
          $(Self::$vn,)*
        ];
      }
    }

    impl FromStr for KnownElement {
      type Err = ();

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
          $(
            $nm => Ok(Self::$vn),
          )*
          _ => Err(())
        };
      }
    }
  };
}

gen_element_types!(
  // trusses and beams
  (T2d2, "T2D2", 2, Line, "2-node planar truss"),
  (T3d2, "T3D2", 2, Line, "2-node truss"),
  (B21, "B21", 2, Line, "2-node planar beam"),
  (B31, "B31", 2, Line, "2-node beam"),
  (B32, "B32", 3, Line, "3-node quadratic beam"),
  // plane stress/strain
  (Cps3, "CPS3", 3, Surface, "3-node plane stress triangle"),
  (Cps4, "CPS4", 4, Surface, "4-node plane stress quadrilateral"),
  (Cpe3, "CPE3", 3, Surface, "3-node plane strain triangle"),
  (Cpe4, "CPE4", 4, Surface, "4-node plane strain quadrilateral"),
  // shells
  (S3, "S3", 3, Surface, "3-node shell"),
  (Stri3, "STRI3", 3, Surface, "3-node small-strain shell"),
  (S4, "S4", 4, Surface, "4-node shell"),
  (S4r, "S4R", 4, Surface, "4-node reduced-integration shell"),
  (S8r, "S8R", 8, Surface, "8-node reduced-integration shell"),
  // solids
  (C3d4, "C3D4", 4, Solid, "4-node tetrahedron"),
  (C3d6, "C3D6", 6, Solid, "6-node wedge"),
  (C3d8, "C3D8", 8, Solid, "8-node hexahedron"),
  (C3d8r, "C3D8R", 8, Solid, "8-node reduced-integration hexahedron"),
  (C3d10, "C3D10", 10, Solid, "10-node quadratic tetrahedron"),
  (C3d15, "C3D15", 15, Solid, "15-node quadratic wedge"),
  (C3d20, "C3D20", 20, Solid, "20-node quadratic hexahedron"),
  (C3d20r, "C3D20R", 20, Solid, "20-node reduced-integration hexahedron"),
);

impl PartialOrd for KnownElement {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for KnownElement {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    return self.name().cmp(other.name());
  }
}

impl Display for KnownElement {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}
