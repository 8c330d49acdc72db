use nalgebra::DMatrix;

use crate::fields::{split_fields, Field};
use crate::lines::{is_keyword_line, LogicalLines};
use crate::prelude::*;

fn scan(deck: &str) -> Result<RawMesh, ParseError> {
  return MeshScanner::parse_bufread(deck.as_bytes());
}

fn blocks(deck: &str) -> Result<Vec<KeywordBlock>, ParseError> {
  return parse_blocks(deck.as_bytes());
}

fn kind_of(deck: &str) -> ErrorKind {
  return scan(deck).expect_err("deck should not parse").kind();
}

#[test]
fn integer_fields_stay_integral() {
  let int = |s: &str, v: isize| {
    assert_eq!(Field::coerce(s), Field::Integer(v));
  };
  int("0", 0);
  int("1", 1);
  int("-12", -12);
  int("+7", 7);
  int("1000000", 1000000);
  // and only actual non-integers become reals
  let real = |s: &str, v: f64| {
    assert_eq!(Field::coerce(s), Field::Real(v));
  };
  real("1.5", 1.5);
  real(".5", 0.5);
  real("-2.0E-3", -0.002);
  real("1E3", 1000.0);
}

#[test]
fn coercion_unwraps_quotes_last() {
  assert_eq!(
    Field::coerce("\"Mixed Case, kept\""),
    Field::Text("Mixed Case, kept".to_string())
  );
  // quoted numbers stay text
  assert_eq!(Field::coerce("\"42\""), Field::Text("42".to_string()));
  // bare words come through unchanged
  assert_eq!(Field::coerce("C3D8"), Field::Text("C3D8".to_string()));
}

#[test]
fn quoted_fields_are_atomic() {
  let fields = split_fields("1, \"Mixed Case, Not Split\" , c3d4");
  assert_eq!(fields.len(), 3);
  assert_eq!(fields[0], "1");
  assert_eq!(fields[1], "\"Mixed Case, Not Split\"");
  assert_eq!(fields[2], "C3D4");
  assert_eq!(
    Field::coerce(&fields[1]),
    Field::Text("Mixed Case, Not Split".to_string())
  );
}

#[test]
fn keyword_lines_are_single_starred() {
  assert!(is_keyword_line("*NODE"));
  assert!(!is_keyword_line("** a comment"));
  assert!(!is_keyword_line("1, 2, 3"));
}

#[test]
fn continuations_join() {
  let logical = |src: &str| {
    let mut lines = LogicalLines::new(src.as_bytes());
    let mut out = Vec::new();
    while let Some(l) = lines.next_logical().unwrap() {
      out.push(l);
    }
    return out;
  };
  assert_eq!(logical("1,2,3,\n4,5\n"), logical("1,2,3,4,5\n"));
  // three fragments, comment wedged in the middle
  assert_eq!(logical("1,\n** nope\n2,\n3\n"), vec!["1,2,3".to_string()]);
}

#[test]
fn unterminated_quotes_are_fatal() {
  let mut lines = LogicalLines::new(&b"1, \"split\n string\"\n"[..]);
  let err = lines.next_logical().expect_err("odd quotes should fail");
  assert_eq!(err.kind(), ErrorKind::MalformedContent);
}

#[test]
fn eof_mid_continuation_is_fatal() {
  let mut lines = LogicalLines::new(&b"1, 2, 3,\n"[..]);
  let err = lines.next_logical().expect_err("dangling comma should fail");
  assert_eq!(err.kind(), ErrorKind::MalformedContent);
}

#[test]
fn comments_are_transparent() {
  let plain = concat!(
    "*NODE\n",
    "1, 0.0, 1.0\n",
    "2, 1.0, 1.0\n",
    "*ELEMENT, TYPE=T3, ELSET=TOP\n",
    "1, 1, 2, 1\n"
  );
  let commented = concat!(
    "** deck header\n",
    "*NODE\n",
    "** mid-block comment\n",
    "1, 0.0, 1.0\n",
    "2, 1.0, 1.0\n",
    "*ELEMENT,\n",
    "** between continuation fragments\n",
    "TYPE=T3, ELSET=TOP\n",
    "1, 1, 2, 1\n",
    "** trailing comment\n"
  );
  assert_eq!(scan(plain).unwrap(), scan(commented).unwrap());
  assert_eq!(blocks(plain).unwrap(), blocks(commented).unwrap());
}

#[test]
fn block_layer_reads_params_and_rows() {
  let parsed = blocks(concat!(
    "*ELEMENT, TYPE=C3D4, ELSET=\"Lower Half\", SOMEFLAG\n",
    "1, 4, 3, 2, 1\n",
    "2, 5, 6, 7, 8\n"
  ))
  .unwrap();
  assert_eq!(parsed.len(), 1);
  let block = &parsed[0];
  assert_eq!(block.keyword, "ELEMENT");
  assert_eq!(
    block.parameter_text("TYPE"),
    Some("C3D4".to_string())
  );
  // quoted values keep their case and spacing
  assert_eq!(
    block.parameter_text("ELSET"),
    Some("Lower Half".to_string())
  );
  assert!(block.has_flag("SOMEFLAG"));
  assert!(block.parameter("NOTTHERE").is_none());
  assert_eq!(block.data.len(), 2);
  assert_eq!(block.data[0][0], Field::Integer(1));
  assert_eq!(block.data[1][4], Field::Integer(8));
}

#[test]
fn data_before_keyword_is_fatal() {
  let deck = "1, 0.0, 0.0\n*NODE\n";
  assert_eq!(kind_of(deck), ErrorKind::MalformedContent);
  let err = blocks(deck).expect_err("data before keyword should fail");
  assert_eq!(err.kind(), ErrorKind::MalformedContent);
}

#[test]
fn end_to_end_minimal_mesh() {
  let mesh = scan(concat!(
    "*NODE\n",
    "1, 0.0, 0.0\n",
    "2, 1.0, 0.0\n",
    "*ELEMENT, TYPE=T3\n",
    "1, 1, 2, 1\n"
  ))
  .unwrap();
  assert_eq!(mesh.nodes.numbers, vec![1, 2]);
  assert_eq!(mesh.nodes.dimension(), 2);
  assert_eq!(
    mesh.nodes.coordinates,
    DMatrix::from_vec(2, 2, vec![0.0, 0.0, 1.0, 0.0])
  );
  let t3 = mesh.elements.get("T3").expect("missing element type");
  assert_eq!(t3.numbers, vec![1]);
  assert_eq!(t3.topology, DMatrix::from_vec(3, 1, vec![1_usize, 2, 1]));
  assert!(mesh.nodesets.is_empty());
  assert!(mesh.elementsets.is_empty());
}

#[test]
fn element_rows_join_across_lines() {
  let mesh = scan(concat!(
    "*NODE\n",
    "1, 0.0, 0.0, 0.0\n",
    "*ELEMENT, TYPE=C3D10\n",
    "7, 1, 1, 1, 1, 1, 1,\n",
    "** a comment inside the element row\n",
    "1, 1, 1, 1\n"
  ))
  .unwrap();
  let tets = mesh.elements.get("C3D10").unwrap();
  assert_eq!(tets.numbers, vec![7]);
  assert_eq!(tets.vertex_count(), 10);
  assert_eq!(tets.count(), 1);
}

#[test]
fn same_type_blocks_concatenate() {
  let mesh = scan(concat!(
    "*NODE\n",
    "1, 0.0, 0.0\n",
    "*ELEMENT, TYPE=T3\n",
    "1, 1, 1, 1\n",
    "*ELEMENT, TYPE=T3\n",
    "2, 1, 1, 1\n"
  ))
  .unwrap();
  let t3 = mesh.elements.get("T3").unwrap();
  assert_eq!(t3.numbers, vec![1, 2]);
  assert_eq!(t3.count(), 2);
  assert_eq!(t3.vertex_count(), 3);
}

#[test]
fn inconsistent_vertex_counts_are_fatal() {
  let deck = concat!(
    "*ELEMENT, TYPE=T3\n",
    "1, 1, 2, 3\n",
    "2, 1, 2\n"
  );
  assert_eq!(kind_of(deck), ErrorKind::MalformedContent);
}

#[test]
fn generated_sets_expand() {
  let mesh = scan(concat!(
    "*Nset, nset=MYSET, generate\n",
    "1, 10, 2\n"
  ))
  .unwrap();
  assert_eq!(mesh.nodesets["MYSET"], vec![1, 3, 5, 7, 9]);
  let mesh = scan(concat!(
    "*ELSET, ELSET=EVERYTHING, GENERATE\n",
    "1, 3, 1\n"
  ))
  .unwrap();
  assert_eq!(mesh.elementsets["EVERYTHING"], vec![1, 2, 3]);
}

#[test]
fn generated_set_ranges_are_validated() {
  // two numbers are not a range
  let deck = "*NSET, NSET=N, GENERATE\n1, 10\n";
  assert_eq!(kind_of(deck), ErrorKind::MalformedContent);
  // neither are four
  let deck = "*NSET, NSET=N, GENERATE\n1, 10, 2, 4\n";
  assert_eq!(kind_of(deck), ErrorKind::MalformedContent);
  // a zero step would spin forever
  let deck = "*NSET, NSET=N, GENERATE\n1, 10, 0\n";
  assert_eq!(kind_of(deck), ErrorKind::MalformedContent);
  // a header where the range should be
  let deck = "*NSET, NSET=N, GENERATE\n*NODE\n";
  assert_eq!(kind_of(deck), ErrorKind::MalformedContent);
}

#[test]
fn explicit_sets_accumulate() {
  let mesh = scan(concat!(
    "*NSET, NSET=WALL\n",
    "1, 2, 3,\n",
    "4\n",
    "*NSET, NSET=WALL\n",
    "9, 10\n"
  ))
  .unwrap();
  assert_eq!(mesh.nodesets["WALL"], vec![1, 2, 3, 4, 9, 10]);
}

#[test]
fn set_headers_need_their_name() {
  assert_eq!(kind_of("*NSET\n1, 2\n"), ErrorKind::MalformedContent);
  assert_eq!(kind_of("*ELSET\n1, 2\n"), ErrorKind::MalformedContent);
  assert_eq!(
    kind_of("*ELEMENT\n1, 1, 2\n"),
    ErrorKind::MalformedContent
  );
}

#[test]
fn inline_elset_registration() {
  let mesh = scan(concat!(
    "*ELEMENT, TYPE=T3, ELSET=SKIN\n",
    "4, 1, 2, 3\n",
    "9, 3, 2, 1\n"
  ))
  .unwrap();
  assert_eq!(mesh.elementsets["SKIN"], vec![4, 9]);
  assert_eq!(mesh.elements["T3"].numbers, vec![4, 9]);
}

#[test]
fn dimension_mismatch_is_fatal() {
  let deck = concat!(
    "*NODE\n",
    "1, 0.0, 0.0, 0.0\n",
    "*NODE\n",
    "2, 1.0, 1.0\n"
  );
  let err = scan(deck).expect_err("arity change should fail");
  assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
  match err {
    ParseError::DimensionMismatch { expected, found, .. } => {
      assert_eq!(expected, 3);
      assert_eq!(found, 2);
    },
    other => panic!("wrong error: {}", other)
  }
}

#[test]
fn multiple_parts_are_rejected() {
  let deck = concat!(
    "*PART, NAME=A\n",
    "*PART, NAME=B\n"
  );
  assert_eq!(kind_of(deck), ErrorKind::UnsupportedStructure);
}

#[test]
fn multiple_instances_are_rejected() {
  let deck = concat!(
    "*INSTANCE, NAME=A, PART=P\n",
    "*END INSTANCE\n",
    "*INSTANCE, NAME=B, PART=P\n",
    "*END INSTANCE\n"
  );
  assert_eq!(kind_of(deck), ErrorKind::UnsupportedStructure);
}

#[test]
fn one_part_one_instance_is_tolerated() {
  let mesh = scan(concat!(
    "*PART, NAME=P\n",
    "*NODE\n",
    "1, 0.0, 0.0\n",
    "*INSTANCE, NAME=I, PART=P\n",
    "0.0, 0.0, 5.0\n",
    "*END INSTANCE\n"
  ))
  .unwrap();
  // the instance's translation row was discarded, not taken as data
  assert_eq!(mesh.nodes.numbers, vec![1]);
}

#[test]
fn unrecognized_keywords_are_skipped() {
  let mesh = scan(concat!(
    "*HEADING\n",
    "Some free text, with commas, even\n",
    "*NODE OUTPUT\n",
    "1, 123.0, 456.0\n",
    "*NODE\n",
    "1, 0.0, 0.0\n"
  ))
  .unwrap();
  assert_eq!(mesh.nodes.numbers, vec![1]);
  assert_eq!(
    mesh.nodes.coordinates,
    DMatrix::from_vec(2, 1, vec![0.0, 0.0])
  );
}

#[test]
fn errors_carry_the_file_name() {
  let err = MeshScanner::parse_file("no/such/deck.inp")
    .expect_err("missing file should fail");
  assert_eq!(err.kind(), ErrorKind::Io);
  assert!(err.to_string().contains("deck.inp"));
  // the block layer stamps names the same way
  let err = parse_blocks_file("no/such/deck.inp")
    .expect_err("missing file should fail");
  assert_eq!(err.kind(), ErrorKind::Io);
  assert!(err.to_string().contains("deck.inp"));
}

#[test]
fn errors_carry_line_numbers() {
  let deck = "*NODE\n1, 0.0, 0.0\n1, oops, 0.0\n";
  let err = scan(deck).expect_err("bad coordinate should fail");
  assert!(err.to_string().contains("line 3"));
}

#[test]
fn catalogue_knows_shapes() {
  let verts = |tag: &str, n: usize| {
    let known: KnownElement = tag.parse().expect("tag should be known");
    assert_eq!(known.vertex_count(), n);
    assert_eq!(known.name(), tag);
  };
  verts("C3D4", 4);
  verts("C3D10", 10);
  verts("C3D20R", 20);
  verts("S4R", 4);
  verts("T2D2", 2);
  assert!("MADEUP99".parse::<KnownElement>().is_err());
  assert_eq!(KnownElement::C3d8.family(), ElementFamily::Solid);
  assert_eq!(KnownElement::S3.family(), ElementFamily::Surface);
  assert_eq!(KnownElement::B31.family(), ElementFamily::Line);
}

#[test]
fn header_detection_is_exact() {
  assert_eq!(KeywordKind::detect("NODE"), Some(KeywordKind::Node));
  assert_eq!(KeywordKind::detect("ELEMENT"), Some(KeywordKind::Element));
  assert_eq!(KeywordKind::detect("ELSET"), Some(KeywordKind::ElementSet));
  assert_eq!(KeywordKind::detect("NSET"), Some(KeywordKind::NodeSet));
  // near-misses fall through to the ignored path
  assert_eq!(KeywordKind::detect("NODEPRINT"), None);
  assert_eq!(KeywordKind::detect("NODEOUTPUT"), None);
  assert_eq!(KeywordKind::detect("ELEMENTOUTPUT"), None);
}
