//! Manual builder
//!
//! Walks the root, documents every source file in traversal order and
//! closes the manual with the run tally.

use crate::config::{is_skipped, ConfigError, DocConfig};
use crate::engine::walker::{source_language, walk_tree, DirListing, FileEntry};
use crate::models::{DocTally, FileKind, FileSection, Language, ModuleOutline, Numbering};
use crate::output::{format_timestamp, DocWriter};
use crate::parsers::{create_parser, normalize_newlines, DocParser, ParserError};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Builder errors
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Parser error: {0}")]
    ParserError(#[from] ParserError),

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    SourceError {
        path: PathBuf,
        #[source]
        source: ParserError,
    },

    #[error("Failed to create {path}: {source}")]
    CreateError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Numbering and totals owned by one run
#[derive(Debug, Default)]
struct Traversal {
    numbering: Numbering,
    tally: DocTally,
}

/// Builds the developer manual for a source tree
pub struct DocBuilder {
    config: DocConfig,
    parser: Box<dyn DocParser>,
}

impl DocBuilder {
    /// Create a new builder with the given configuration
    pub fn new(config: DocConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let parser = create_parser(&Language::Python)?;
        Ok(Self { config, parser })
    }

    /// Write the manual to the configured output path, replacing any
    /// previous one
    pub fn build(&mut self) -> Result<DocTally, BuildError> {
        let output = self.config.output.clone();
        let file = File::create(&output).map_err(|source| BuildError::CreateError {
            path: output.clone(),
            source,
        })?;

        let tally = self.build_into(BufWriter::new(file))?;
        info!(path = %output.display(), "manual written");
        Ok(tally)
    }

    /// Write the manual to `sink` and return the run tally
    #[instrument(skip(self, sink), fields(root = %self.config.root.display()))]
    pub fn build_into<W: Write>(&mut self, sink: W) -> Result<DocTally, BuildError> {
        let mut writer = DocWriter::new(sink, self.parser.language());
        let mut traversal = Traversal::default();
        let skips = self.config.canonical_skip_paths();

        writer.write_header()?;

        for listing in walk_tree(&self.config.root, self.config.follow_symlinks) {
            for file in &listing.files {
                if source_language(&file.name) != Some(self.parser.language()) {
                    continue;
                }
                if is_skipped(&file.path, &skips) {
                    debug!(path = %file.path.display(), "skipping own source");
                    continue;
                }
                self.document_file(&mut writer, &mut traversal, &listing, file)?;
            }
        }

        let tally = traversal.tally;
        writer.write_summary(&tally, &format_timestamp(&chrono::Local::now()))?;
        writer.flush()?;

        info!(
            packages = tally.packages,
            modules = tally.modules,
            failures = tally.failures,
            "documentation complete"
        );
        Ok(tally)
    }

    /// Document one source file.
    ///
    /// Read and parse errors abort the run. A missing docstring replaces
    /// the file's units with the read failure marker.
    fn document_file<W: Write>(
        &mut self,
        writer: &mut DocWriter<W>,
        traversal: &mut Traversal,
        listing: &DirListing,
        file: &FileEntry,
    ) -> Result<(), BuildError> {
        let outline = self.parse_file(&file.path)?;
        let kind = FileKind::classify(&file.name, &self.config.package_marker);

        traversal.numbering.enter(kind);
        traversal.tally.add_file(kind);
        match kind {
            FileKind::Package => {
                writer.write_package_heading(&traversal.numbering, &listing.display)?
            }
            FileKind::Module => {
                writer.write_module_heading(&traversal.numbering, &listing.display_file(file))?
            }
        }

        match FileSection::from_outline(outline, kind) {
            FileSection::Documented(doc) => {
                debug!(
                    path = %file.path.display(),
                    functions = doc.functions.len(),
                    classes = doc.classes.len(),
                    "documented"
                );
                writer.write_module_doc(&mut traversal.numbering, &doc)?;
                traversal.tally.add_documented(&doc);
            }
            FileSection::ReadFailure(missing) => {
                warn!(path = %file.path.display(), %missing, "read failure");
                writer.write_read_failure()?;
                traversal.tally.add_failure();
            }
        }

        Ok(())
    }

    fn parse_file(&mut self, path: &Path) -> Result<ModuleOutline, BuildError> {
        let source = fs::read_to_string(path).map_err(|source| BuildError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        self.parser
            .parse_module(&normalize_newlines(&source))
            .map_err(|source| BuildError::SourceError {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn build(root: &Path) -> Result<(DocTally, String), BuildError> {
        let config = DocConfig::new(root.to_path_buf());
        let mut builder = DocBuilder::new(config)?;
        let mut sink = Vec::new();
        let tally = builder.build_into(&mut sink)?;
        Ok((tally, String::from_utf8(sink).unwrap()))
    }

    /// Document without its final timestamp line
    fn without_timestamp(document: &str) -> &str {
        let cut = document
            .find("- Generation date and time")
            .expect("summary present");
        &document[..cut]
    }

    const MODULE: &str = r#""""Shapes module."""


def area(shape):
    """
    Compute the area.

        Returns a float.
    """
    return shape.area()


class Circle:
    """A circle."""

    def __init__(self, radius):
        """Store the radius."""
        self.radius = radius
"#;

    #[test]
    fn test_package_and_module_end_to_end() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "__init__.py", "'''Package docs.'''\n");
        write(dir.path(), "shapes.py", MODULE);

        let (tally, document) = build(dir.path()).unwrap();

        assert_eq!(
            tally,
            DocTally {
                packages: 1,
                modules: 1,
                subroutines: 1,
                classes: 1,
                methods: 1,
                failures: 0,
            }
        );

        let expected = "# __Developer manual__\n\
            ```python\n\
            This document was automatically generated based on the \"docstrings\" of project.\n\
            It is your duty as a developer to keep the the \"docstrings\" of project up to date.\n\
            ```\n\
            ***\n## __1. PACKAGE: ./__\n\
            ```python\nPackage docs.\n```\n\
            ## *1.1. MODULE: ./shapes.py*\n\
            ```python\nShapes module.\n```\n\
            ### 1.1.1. SUBROUTINE: area\n\
            ```python\nCompute the area.\n\n    Returns a float.\n```\n\
            ### 1.1.2. CLASS: Circle\n\
            ```python\nA circle.\n```\n\
            #### 1.1.2.1. METHOD (Circle): \\_\\_init\\_\\_\n\
            ```python\nStore the radius.\n```\n\
            ***\n## __Data about the document__\n\
            ```bash\n\
            - Total of packages          :    1\n\
            - Total of modules           :    1\n\
            - Total of subroutines       :    1\n\
            - Total of classes           :    1\n\
            - Total of methods           :    1\n\
            - Total of read failures     :    0\n";

        assert_eq!(without_timestamp(&document), expected);
        assert!(document.ends_with("\n```"));
    }

    #[test]
    fn test_numbering_across_directories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.py", "'''Entry.'''\n");
        write(dir.path(), "Beta/__init__.py", "'''Beta.'''\n");
        write(dir.path(), "Beta/one.py", "'''One.'''\n\ndef f():\n    '''F.'''\n");
        write(dir.path(), "alpha/__init__.py", "'''Alpha.'''\n");
        write(dir.path(), "alpha/Two.py", "'''Two.'''\n\ndef g():\n    '''G.'''\n");
        write(dir.path(), "alpha/three.py", "'''Three.'''\n");

        let (tally, document) = build(dir.path()).unwrap();

        let headings: Vec<&str> = document
            .lines()
            .filter(|line| line.starts_with("## ") || line.starts_with("### "))
            .collect();
        assert_eq!(
            headings,
            vec![
                "## *0.1. MODULE: ./main.py*",
                "## __1. PACKAGE: ./alpha/__",
                "## *1.1. MODULE: ./alpha/three.py*",
                "## *1.2. MODULE: ./alpha/Two.py*",
                "### 1.2.1. SUBROUTINE: g",
                "## __2. PACKAGE: ./Beta/__",
                "## *2.1. MODULE: ./Beta/one.py*",
                "### 2.1.1. SUBROUTINE: f",
                "## __Data about the document__",
            ]
        );
        assert_eq!(tally.packages, 2);
        assert_eq!(tally.modules, 4);
        assert_eq!(tally.subroutines, 2);
    }

    #[test]
    fn test_read_failure_is_atomic() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "broken_docs.py",
            "'''Module.'''\n\ndef documented():\n    '''Fine.'''\n\nclass Thing:\n    '''Thing.'''\n\n    def bare(self):\n        pass\n",
        );
        write(dir.path(), "zeta.py", "'''Zeta.'''\n\ndef z():\n    '''Z.'''\n");

        let (tally, document) = build(dir.path()).unwrap();

        assert_eq!(tally.failures, 1);
        assert_eq!(tally.modules, 2);
        assert_eq!(tally.subroutines, 1);
        assert_eq!(tally.classes, 0);
        assert_eq!(tally.methods, 0);

        assert_eq!(document.matches("READ FAILURE").count(), 3);
        assert!(!document.contains("SUBROUTINE: documented"));
        assert!(!document.contains("CLASS: Thing"));
        assert!(document.contains(
            "## *0.1. MODULE: ./broken_docs.py*\n```python\n\nREAD FAILURE\n\nREAD FAILURE\n\nREAD FAILURE\n\n```\n## *0.2. MODULE: ./zeta.py*\n"
        ));
        assert!(document.contains("### 0.2.1. SUBROUTINE: z\n"));
    }

    #[test]
    fn test_missing_module_docstring_fails_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "__init__.py", "");

        let (tally, document) = build(dir.path()).unwrap();

        assert_eq!(tally.packages, 1);
        assert_eq!(tally.failures, 1);
        assert!(document.contains("## __1. PACKAGE: ./__\n```python\n\nREAD FAILURE\n"));
    }

    #[test]
    fn test_module_without_units() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "constants.py", "'''Constants only.'''\nLIMIT = 3\n");

        let (tally, document) = build(dir.path()).unwrap();

        assert_eq!(tally.modules, 1);
        assert_eq!(tally.subroutines + tally.classes + tally.methods, 0);
        assert!(document.contains(
            "## *0.1. MODULE: ./constants.py*\n```python\nConstants only.\n```\n***\n"
        ));
    }

    #[test]
    fn test_syntax_error_aborts_run() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.py", "'''Good.'''\n");
        write(dir.path(), "zz_bad.py", "def broken(:\n    pass\n");

        let err = build(dir.path()).unwrap_err();
        match err {
            BuildError::SourceError { path, source } => {
                assert!(path.ends_with("zz_bad.py"));
                assert!(matches!(source, ParserError::Syntax { line: 1, .. }));
            }
            other => panic!("expected source error, got {:?}", other),
        }
    }

    #[test]
    fn test_python2_source_aborts_run() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "legacy.py", "'''Legacy.'''\n\ndef greet():\n    '''Greet.'''\n    print \"x\"\n");

        let err = build(dir.path()).unwrap_err();
        match err {
            BuildError::SourceError { path, source } => {
                assert!(path.ends_with("legacy.py"));
                assert!(matches!(source, ParserError::Syntax { line: 5, .. }));
            }
            other => panic!("expected source error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_source_aborts_run() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.py", "'''Good.'''\n");
        fs::write(dir.path().join("latin.py"), b"'''caf\xe9'''\n\xff\xfe").unwrap();

        let err = build(dir.path()).unwrap_err();
        match err {
            BuildError::ReadError { path, source } => {
                assert!(path.ends_with("latin.py"));
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn test_only_source_files_are_documented() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.txt", "not python");
        write(dir.path(), "setup.cfg", "[metadata]\n");
        write(dir.path(), "SCRIPT.PY", "'''Loud.'''\n");

        let (tally, document) = build(dir.path()).unwrap();

        assert_eq!(tally.modules, 1);
        assert!(document.contains("## *0.1. MODULE: ./SCRIPT.PY*\n"));
    }

    #[test]
    fn test_skip_path_is_not_documented() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "generator.py", "no docstring here = \n");
        write(dir.path(), "kept.py", "'''Kept.'''\n");

        let config =
            DocConfig::new(dir.path().to_path_buf()).with_skip_path(dir.path().join("generator.py"));
        let mut builder = DocBuilder::new(config).unwrap();
        let mut sink = Vec::new();
        let tally = builder.build_into(&mut sink).unwrap();

        assert_eq!(tally.modules, 1);
        assert!(!String::from_utf8(sink).unwrap().contains("generator"));
    }

    #[test]
    fn test_runs_are_identical_except_timestamp() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "__init__.py", "'''Package.'''\n");
        write(dir.path(), "shapes.py", MODULE);
        write(dir.path(), "sub/__init__.py", "'''Sub.'''\n");
        write(dir.path(), "sub/raw.py", "def f():\n    pass\n");

        let (_, first) = build(dir.path()).unwrap();
        let (_, second) = build(dir.path()).unwrap();

        assert_eq!(without_timestamp(&first), without_timestamp(&second));
    }

    #[test]
    fn test_build_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let output = out_dir.path().join("docstring_man.md");
        write(dir.path(), "app.py", "'''App.'''\n");
        fs::write(&output, "stale content that must disappear").unwrap();

        let config = DocConfig::new(dir.path().to_path_buf()).with_output(output.clone());
        let mut builder = DocBuilder::new(config).unwrap();
        let tally = builder.build().unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(tally.modules, 1);
        assert!(written.starts_with("# __Developer manual__\n"));
        assert!(!written.contains("stale content"));
        assert!(written.contains("## *0.1. MODULE: ./app.py*"));
    }

    #[test]
    fn test_windows_line_endings() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "crlf.py", "'''\r\nFirst.\r\n    Second.\r\n'''\r\n");

        let (tally, document) = build(dir.path()).unwrap();

        assert_eq!(tally.failures, 0);
        assert!(document.contains("```python\nFirst.\n    Second.\n```\n"));
    }
}
