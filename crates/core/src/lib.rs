//! mta_docstring_man_core - Core library for the developer manual generator
//!
//! This crate walks a Python source tree with Tree-sitter, collects the
//! docstrings of packages, modules, top-level functions, classes and their
//! methods, and renders them as one hierarchically numbered Markdown
//! document closed by a statistics block.
//!
//! # Features
//!
//! - **Deterministic traversal**: directories and files are visited in
//!   case-insensitive order, so unchanged trees render identically.
//! - **Hierarchical numbering**: `package.module.item.method`, restarting at
//!   each package and module boundary.
//! - **Per-file isolation**: a file with a missing docstring is rendered as
//!   a read failure marker without affecting the rest of the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use mta_docstring_man_core::{format_report, DocBuilder, DocConfig, ReportFormat};
//!
//! let mut builder = DocBuilder::new(DocConfig::default()).unwrap();
//! let tally = builder.build().unwrap();
//!
//! println!("{}", format_report(&tally, ReportFormat::Summary).unwrap());
//! ```

pub mod config;
pub mod engine;
pub mod models;
pub mod output;
pub mod parsers;

// Re-exports for convenience
pub use config::{ConfigError, DocConfig, DEFAULT_OUTPUT, DEFAULT_PACKAGE_MARKER};
pub use engine::{walk_tree, BuildError, DirListing, DocBuilder};
pub use models::{
    ClassEntry, DocEntry, DocTally, FileKind, FileSection, Language, MissingDocstring, ModuleDoc,
    ModuleOutline, Numbering, OutlineUnit, UnitKind,
};
pub use output::{escape_name, format_report, DocWriter, FormatError, ReportFormat};
pub use parsers::{create_parser, DocParser, ParserError};
