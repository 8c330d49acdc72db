//! Prints information on a mesh input deck: node and element counts, element
//! types, and the sets it defines. Can also dump the parsed mesh as JSON.

#![allow(clippy::needless_return)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use inp::prelude::*;
use log::{error, info, LevelFilter};

/// The arguments passed to the tool.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
  /// Dump the parsed mesh as JSON instead of printing a report.
  #[arg(short, long)]
  json: bool,
  /// Output extra/debug info while parsing.
  #[arg(short, long)]
  verbose: bool,
  /// File path (set to "-" to read from standard input).
  file: PathBuf
}

/// Indentation unit for the report.
const INDENT: &str = "  ";

fn main() {
  // init cli stuff
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  // parse the deck
  let result = if args.file.as_os_str().eq_ignore_ascii_case("-") {
    MeshScanner::parse_bufread(BufReader::new(io::stdin()))
  } else if args.file.is_file() {
    if let Some(bn) = args.file.file_name().and_then(|s| s.to_str()) {
      info!("Parsing {}...", bn);
    }
    MeshScanner::parse_file(&args.file)
  } else {
    error!("Provided path either does not exist or is not a file!");
    std::process::exit(1);
  };
  let mesh = match result {
    Ok(mesh) => mesh,
    Err(e) => {
      error!("{}", e);
      std::process::exit(2);
    }
  };
  info!("Done parsing.");
  // JSON dump mode
  if args.json {
    match serde_json::to_string_pretty(&mesh) {
      Ok(s) => println!("{}", s),
      Err(e) => {
        error!("Could not serialise the mesh: {}", e);
        std::process::exit(3);
      }
    }
    return;
  }
  // print node info
  info!(
    "{} nodes, dimension {}.",
    mesh.nodes.count(),
    mesh.nodes.dimension()
  );
  // print element info
  if mesh.elements.is_empty() {
    info!("No elements.");
  } else {
    info!(
      "{} elements across {} types:",
      mesh.element_count(),
      mesh.elements.len()
    );
    for (tag, elems) in mesh.elements.iter() {
      let desc = tag
        .parse::<KnownElement>()
        .map_or("unknown element type", |k| k.desc());
      info!(
        "{}- {}: {} elements, {} vertices each ({})",
        INDENT,
        tag,
        elems.count(),
        elems.vertex_count(),
        desc
      );
    }
  }
  // print set info
  let print_sets = |name: &str, sets: &SetMap| {
    if sets.is_empty() {
      info!("No {} sets.", name);
    } else {
      info!("Found {} {} set(s):", sets.len(), name);
      for (sname, members) in sets.iter() {
        info!("{}- {}: {} members", INDENT, sname, members.len());
      }
    }
  };
  print_sets("node", &mesh.nodesets);
  print_sets("element", &mesh.elementsets);
}
