//! This module implements the raw mesh aggregate a parse produces: node
//! coordinates, per-type element topology, and named sets. Everything in
//! here is built once at assembly time and never mutated afterwards --
//! downstream mesh construction takes it from there.

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// A mapping from set name to its ordered member IDs. Used for both node
/// sets and element sets.
pub type SetMap = BTreeMap<String, Vec<usize>>;

/// The nodes of a mesh: IDs in file order and a matrix of coordinates with
/// one column per node.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawNodes {
  /// The node numbers, in file order.
  pub numbers: Vec<usize>,
  /// The coordinates: dimension rows, one column per node, so column `j`
  /// belongs to node `numbers[j]`.
  pub coordinates: DMatrix<f64>
}

impl RawNodes {
  /// Returns the coordinate dimensionality.
  pub fn dimension(&self) -> usize {
    return self.coordinates.nrows();
  }

  /// Returns the number of nodes.
  pub fn count(&self) -> usize {
    return self.numbers.len();
  }
}

/// The elements of one type: IDs in file order and a topology matrix with
/// one column per element.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawElements {
  /// The element numbers, in file order.
  pub numbers: Vec<usize>,
  /// The topology: vertex-count rows, one column per element, so column `j`
  /// holds the vertex node IDs of element `numbers[j]`.
  pub topology: DMatrix<usize>
}

impl RawElements {
  /// Returns the number of vertices per element.
  pub fn vertex_count(&self) -> usize {
    return self.topology.nrows();
  }

  /// Returns the number of elements.
  pub fn count(&self) -> usize {
    return self.numbers.len();
  }
}

/// The finished product of a parse: everything the deck said about the mesh.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawMesh {
  /// The elements, grouped by their type tag.
  pub elements: BTreeMap<String, RawElements>,
  /// The nodes.
  pub nodes: RawNodes,
  /// The named node sets.
  pub nodesets: SetMap,
  /// The named element sets.
  pub elementsets: SetMap
}

impl RawMesh {
  /// Returns the total element count across all types.
  pub fn element_count(&self) -> usize {
    return self.elements.values().map(RawElements::count).sum();
  }
}
