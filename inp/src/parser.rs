//! This module implements the mesh scanner: a one-pass, header-dispatching
//! walk over a deck's logical lines that fills typed accumulators and, at
//! the end, reshapes them into the finished mesh. It shares the logical-line
//! and header-splitting machinery with the generic block layer, so comment,
//! continuation and quoting behaviour is identical on both paths.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};
use nalgebra::DMatrix;

use crate::blocks::{deck_name, KeywordBlock};
use crate::catalogue::KnownElement;
use crate::errors::ParseError;
use crate::fields::{split_fields, Field};
use crate::headers::KeywordKind;
use crate::lines::{is_keyword_line, LogicalLines};
use crate::mesh::{RawElements, RawMesh, RawNodes, SetMap};

/// Accumulates node IDs and flattened coordinates during the scan.
#[derive(Clone, Debug, Default)]
struct NodeAccumulator {
  /// The node numbers, in file order.
  numbers: Vec<usize>,
  /// The flattened coordinates, node by node.
  coordinates: Vec<f64>,
  /// The coordinate arity, fixed by the first node row seen.
  dimension: Option<usize>
}

/// Accumulates element IDs and flattened connectivity for one element type.
#[derive(Clone, Debug, Default)]
struct ElementAccumulator {
  /// The element numbers, in file order.
  numbers: Vec<usize>,
  /// The flattened vertex node IDs, element by element.
  connectivity: Vec<usize>
}

/// This is the mesh scanner -- single-pass, single-thread, owning all its
/// accumulators until assembly hands them over to the finished mesh.
pub struct MeshScanner<R: BufRead> {
  /// The logical-line source.
  lines: LogicalLines<R>,
  /// One-line pushback: the keyword line that ended the last data run.
  pending: Option<String>,
  /// The node accumulator.
  nodes: NodeAccumulator,
  /// The per-type element accumulators.
  elements: BTreeMap<String, ElementAccumulator>,
  /// The named node sets.
  nodesets: SetMap,
  /// The named element sets.
  elementsets: SetMap,
  /// How many part definitions we've seen.
  parts: usize,
  /// How many part instances we've seen.
  instances: usize
}

impl<R: BufRead> MeshScanner<R> {
  /// Instantiates a new scanner over a buffered reader.
  pub fn new(reader: R) -> Self {
    return Self {
      lines: LogicalLines::new(reader),
      pending: None,
      nodes: NodeAccumulator::default(),
      elements: BTreeMap::new(),
      nodesets: SetMap::new(),
      elementsets: SetMap::new(),
      parts: 0,
      instances: 0
    };
  }

  /// Parses a whole deck from a buffered reader.
  pub fn parse_bufread(reader: R) -> Result<RawMesh, ParseError> {
    let mut scanner = Self::new(reader);
    scanner.scan()?;
    return scanner.assemble();
  }

  /// Returns the next logical line, honouring the pushback slot.
  fn next_line(&mut self) -> Result<Option<String>, ParseError> {
    if let Some(line) = self.pending.take() {
      return Ok(Some(line));
    }
    return self.lines.next_logical();
  }

  /// Collects the data rows that follow a header, up to (and not including)
  /// the next keyword line, which goes into the pushback slot. Each row
  /// comes back as coerced fields plus its physical line number.
  fn data_rows(&mut self) -> Result<Vec<(usize, Vec<Field>)>, ParseError> {
    let mut rows = Vec::new();
    while let Some(line) = self.next_line()? {
      if line.is_empty() {
        continue;
      }
      if is_keyword_line(&line) {
        self.pending = Some(line);
        break;
      }
      rows.push((
        self.lines.line_number(),
        split_fields(&line).iter().map(|s| Field::coerce(s)).collect()
      ));
    }
    return Ok(rows);
  }

  /// Discards everything up to the next keyword line, which goes into the
  /// pushback slot.
  fn skip_data(&mut self) -> Result<(), ParseError> {
    while let Some(line) = self.next_line()? {
      if is_keyword_line(&line) {
        self.pending = Some(line);
        break;
      }
    }
    return Ok(());
  }

  /// The main header dispatch loop.
  fn scan(&mut self) -> Result<(), ParseError> {
    while let Some(line) = self.next_line()? {
      if line.is_empty() {
        continue;
      }
      let at = self.lines.line_number();
      if !is_keyword_line(&line) {
        return Err(ParseError::malformed(
          at,
          format!("data row without an active keyword: {}", line)
        ));
      }
      let header = KeywordBlock::from_header(&line);
      let kind = KeywordKind::detect(&header.keyword);
      match kind {
        Some(k) => debug!("Line {}: {}.", at, k),
        None => {
          debug!("Line {}: ignoring keyword \"{}\".", at, header.keyword)
        }
      }
      match kind {
        Some(KeywordKind::Node) => self.scan_nodes()?,
        Some(KeywordKind::Element) => self.scan_elements(&header)?,
        Some(KeywordKind::ElementSet) => {
          self.scan_set(&header, KeywordKind::ElementSet)?
        },
        Some(KeywordKind::NodeSet) => {
          self.scan_set(&header, KeywordKind::NodeSet)?
        },
        Some(KeywordKind::Part) => self.parts += 1,
        Some(KeywordKind::Instance) => {
          self.instances += 1;
          self.skip_data()?;
        },
        None => self.skip_data()?
      }
    }
    return Ok(());
  }

  /// Consumes a node block's data rows: node ID first, coordinates after.
  /// The first row ever seen fixes the dimensionality for the whole deck.
  fn scan_nodes(&mut self) -> Result<(), ParseError> {
    for (line_no, row) in self.data_rows()? {
      let mut fields = row.iter();
      let id = fields.next().and_then(Field::as_id).ok_or_else(|| {
        ParseError::malformed(
          line_no,
          "a node row must start with an integer node ID".to_string()
        )
      })?;
      let mut coordinates: Vec<f64> = Vec::with_capacity(row.len() - 1);
      for field in fields {
        match field.as_real() {
          Some(x) => coordinates.push(x),
          None => {
            return Err(ParseError::malformed(
              line_no,
              format!("non-numeric coordinate for node {}: {}", id, field)
            ));
          }
        }
      }
      match self.nodes.dimension {
        None => self.nodes.dimension = Some(coordinates.len()),
        Some(d) if d != coordinates.len() => {
          return Err(ParseError::DimensionMismatch {
            expected: d,
            found: coordinates.len(),
            line: line_no
          });
        },
        Some(_) => {}
      }
      self.nodes.numbers.push(id);
      self.nodes.coordinates.extend(coordinates);
    }
    return Ok(());
  }

  /// Consumes an element block's data rows: element ID first, vertex node
  /// IDs after. Blocks of the same type concatenate; an inline set
  /// parameter registers the block's IDs as an element set.
  fn scan_elements(&mut self, header: &KeywordBlock) -> Result<(), ParseError> {
    let at = self.lines.line_number();
    let etype = header.parameter_text("TYPE").ok_or_else(|| {
      ParseError::malformed(
        at,
        "an element block must carry a TYPE parameter".to_string()
      )
    })?;
    let elset = header.parameter_text("ELSET");
    let rows = self.data_rows()?;
    let mut block_ids: Vec<usize> = Vec::with_capacity(rows.len());
    let accumulator = self.elements.entry(etype).or_default();
    for (line_no, row) in rows {
      let mut fields = row.iter();
      let id = fields.next().and_then(Field::as_id).ok_or_else(|| {
        ParseError::malformed(
          line_no,
          "an element row must start with an integer element ID".to_string()
        )
      })?;
      for field in fields {
        match field.as_id() {
          Some(vertex) => accumulator.connectivity.push(vertex),
          None => {
            return Err(ParseError::malformed(
              line_no,
              format!("non-integer vertex ID in element {}: {}", id, field)
            ));
          }
        }
      }
      accumulator.numbers.push(id);
      block_ids.push(id);
    }
    if let Some(name) = elset {
      debug!(
        "Element block registers set \"{}\" with {} members.",
        name,
        block_ids.len()
      );
      self.elementsets.entry(name).or_default().extend(block_ids);
    }
    return Ok(());
  }

  /// Consumes a set block, explicit or generated, into the right mapping.
  fn scan_set(
    &mut self,
    header: &KeywordBlock,
    kind: KeywordKind
  ) -> Result<(), ParseError> {
    let at = self.lines.line_number();
    let pname = match kind {
      KeywordKind::NodeSet => "NSET",
      _ => "ELSET"
    };
    let name = header.parameter_text(pname).ok_or_else(|| {
      ParseError::malformed(
        at,
        format!("a {} block must carry a {} parameter", header.keyword, pname)
      )
    })?;
    let members: Vec<usize> = if header.has_flag("GENERATE") {
      self.generate_members(&name)?
    } else {
      let mut members = Vec::new();
      for (_, row) in self.data_rows()? {
        members.extend(row.iter().filter_map(Field::as_id));
      }
      members
    };
    debug!("Set \"{}\" gets {} members.", name, members.len());
    let target = match kind {
      KeywordKind::NodeSet => &mut self.nodesets,
      _ => &mut self.elementsets
    };
    target.entry(name).or_default().extend(members);
    return Ok(());
  }

  /// Consumes the single range line after a generate-flagged set header and
  /// materialises the progression, first through last inclusive.
  fn generate_members(&mut self, name: &str) -> Result<Vec<usize>, ParseError> {
    loop {
      let line = match self.next_line()? {
        Some(l) => l,
        None => {
          return Err(ParseError::malformed(
            self.lines.line_number(),
            format!("end of stream before the range of generated set {}", name)
          ));
        }
      };
      if line.is_empty() {
        continue;
      }
      let at = self.lines.line_number();
      if is_keyword_line(&line) {
        return Err(ParseError::malformed(
          at,
          format!("expected a range for generated set {}, got: {}", name, line)
        ));
      }
      let fields: Vec<Field> =
        split_fields(&line).iter().map(|s| Field::coerce(s)).collect();
      let triple = fields
        .iter()
        .map(Field::as_id)
        .collect::<Option<Vec<usize>>>()
        .and_then(|v| v.into_iter().collect_tuple::<(_, _, _)>());
      let (start, stop, step) = match triple {
        Some(t) => t,
        None => {
          return Err(ParseError::malformed(
            at,
            format!(
              "the range of a generated set must be three non-negative \
               integers (first, last, step): {}",
              line
            )
          ));
        }
      };
      if step == 0 {
        return Err(ParseError::malformed(
          at,
          format!("generated set {} has a zero step", name)
        ));
      }
      return Ok((start..=stop).step_by(step).collect());
    }
  }

  /// Finishes up: enforces the single-part, single-instance rule and
  /// reshapes the flat accumulators into the finished mesh.
  fn assemble(self) -> Result<RawMesh, ParseError> {
    if self.parts > 1 {
      return Err(ParseError::UnsupportedStructure {
        what: format!(
          "{} part definitions; decks with more than one part are rejected",
          self.parts
        )
      });
    }
    if self.instances > 1 {
      return Err(ParseError::UnsupportedStructure {
        what: format!(
          "{} part instances; decks with more than one instance are rejected",
          self.instances
        )
      });
    }
    let dimension = self.nodes.dimension.unwrap_or(0);
    let node_count = self.nodes.numbers.len();
    debug!("Assembling {} nodes, dimension {}.", node_count, dimension);
    let nodes = RawNodes {
      numbers: self.nodes.numbers,
      coordinates: DMatrix::from_vec(
        dimension,
        node_count,
        self.nodes.coordinates
      )
    };
    let mut elements: BTreeMap<String, RawElements> = BTreeMap::new();
    for (tag, accumulator) in self.elements {
      let count = accumulator.numbers.len();
      let flat = accumulator.connectivity.len();
      let vertex_count = if count == 0 {
        0
      } else {
        if flat % count != 0 {
          return Err(ParseError::MalformedContent {
            line: None,
            context: format!(
              "element type {} has {} vertex IDs spread over {} elements; \
               vertex counts within a type must be consistent",
              tag, flat, count
            )
          });
        }
        flat / count
      };
      match tag.parse::<KnownElement>() {
        Ok(known) if known.vertex_count() != vertex_count => warn!(
          "Element type {} parsed with {} vertices per element, expected {}.",
          tag,
          vertex_count,
          known.vertex_count()
        ),
        Ok(_) => {},
        Err(()) => debug!(
          "Unknown element type tag \"{}\", {} vertices per element.",
          tag,
          vertex_count
        )
      }
      debug!("Assembling {} elements of type {}.", count, tag);
      elements.insert(tag, RawElements {
        numbers: accumulator.numbers,
        topology: DMatrix::from_vec(vertex_count, count, accumulator.connectivity)
      });
    }
    return Ok(RawMesh {
      elements,
      nodes,
      nodesets: self.nodesets,
      elementsets: self.elementsets
    });
  }
}

impl MeshScanner<BufReader<File>> {
  /// Utility method -- opens a file, parses it, and closes it. Errors come
  /// back stamped with the file name; the handle never outlives the call.
  pub fn parse_file<S: AsRef<Path>>(p: S) -> Result<RawMesh, ParseError> {
    let name = deck_name(p.as_ref());
    let file =
      File::open(p.as_ref()).map_err(|e| ParseError::from(e).in_file(&name))?;
    return Self::parse_bufread(BufReader::new(file))
      .map_err(|e| e.in_file(&name));
  }
}
