//! Data models for the developer manual
//!
//! This module defines the documentable units extracted from source files,
//! the numbering state used while rendering them, and the aggregate tally
//! reported at the end of a run.

use serde::{Deserialize, Serialize};

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Python,
}

impl Language {
    /// Determine language from file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" => Some(Language::Python),
            _ => None,
        }
    }

    /// Info string used on fenced code blocks
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
        }
    }
}

/// Kinds of documentable units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Package,
    Module,
    Function,
    Class,
    Method,
}

impl UnitKind {
    /// Label used in rendered headings
    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Package => "PACKAGE",
            UnitKind::Module => "MODULE",
            UnitKind::Function => "SUBROUTINE",
            UnitKind::Class => "CLASS",
            UnitKind::Method => "METHOD",
        }
    }
}

/// Classification of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// The package initializer of its directory
    Package,
    /// Any other source file
    Module,
}

impl FileKind {
    /// Classify a file by exact filename match against the package marker
    pub fn classify(file_name: &str, package_marker: &str) -> Self {
        if file_name == package_marker {
            FileKind::Package
        } else {
            FileKind::Module
        }
    }

    pub fn unit_kind(&self) -> UnitKind {
        match self {
            FileKind::Package => UnitKind::Package,
            FileKind::Module => UnitKind::Module,
        }
    }
}

/// A function, class or method as found in the syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineUnit {
    /// Kind of unit (function, class or method)
    pub kind: UnitKind,

    /// Name as written in the source
    pub name: String,

    /// Cleaned docstring, if the body starts with one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,

    /// Definition line (1-indexed)
    pub line: usize,

    /// Methods defined directly in a class body
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<OutlineUnit>,
}

impl OutlineUnit {
    pub fn new(kind: UnitKind, name: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            docstring: None,
            line,
            methods: Vec::new(),
        }
    }

    /// Attach a docstring (builder pattern)
    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring;
        self
    }
}

/// Structural outline of one source file, docstrings possibly absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOutline {
    /// Module-level docstring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,

    /// Top-level functions in source order
    pub functions: Vec<OutlineUnit>,

    /// Top-level classes in source order
    pub classes: Vec<OutlineUnit>,
}

/// A unit whose docstring could not be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDocstring {
    pub kind: UnitKind,

    /// Unit name; `None` for the file itself
    pub name: Option<String>,

    /// Definition line (1-indexed), `None` for the file itself
    pub line: Option<usize>,
}

impl std::fmt::Display for MissingDocstring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.name, self.line) {
            (Some(name), Some(line)) => write!(
                f,
                "missing docstring on {} '{}' (line {})",
                self.kind.label().to_lowercase(),
                name,
                line
            ),
            _ => write!(f, "missing {} docstring", self.kind.label().to_lowercase()),
        }
    }
}

/// A function or method with its docstring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub name: String,
    pub docstring: String,
}

/// A class with its docstring and documented methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    pub docstring: String,
    pub methods: Vec<DocEntry>,
}

/// A fully documented source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDoc {
    pub docstring: String,
    pub functions: Vec<DocEntry>,
    pub classes: Vec<ClassEntry>,
}

impl ModuleDoc {
    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }
}

impl ModuleOutline {
    /// Require a docstring on every unit.
    ///
    /// Units are checked in render order (file, functions, then each class
    /// followed by its methods) and the first one without a docstring is
    /// reported. Nothing from the file is documented in that case.
    pub fn into_documented(self, file_kind: FileKind) -> Result<ModuleDoc, MissingDocstring> {
        let docstring = self.docstring.ok_or(MissingDocstring {
            kind: file_kind.unit_kind(),
            name: None,
            line: None,
        })?;

        let functions = self
            .functions
            .into_iter()
            .map(into_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let classes = self
            .classes
            .into_iter()
            .map(|class| -> Result<ClassEntry, MissingDocstring> {
                let OutlineUnit {
                    kind,
                    name,
                    docstring,
                    line,
                    methods,
                } = class;

                let docstring = docstring.ok_or_else(|| MissingDocstring {
                    kind,
                    name: Some(name.clone()),
                    line: Some(line),
                })?;
                let methods = methods
                    .into_iter()
                    .map(into_entry)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(ClassEntry {
                    name,
                    docstring,
                    methods,
                })
            })
            .collect::<Result<Vec<_>, MissingDocstring>>()?;

        Ok(ModuleDoc {
            docstring,
            functions,
            classes,
        })
    }
}

fn into_entry(unit: OutlineUnit) -> Result<DocEntry, MissingDocstring> {
    match unit.docstring {
        Some(docstring) => Ok(DocEntry {
            name: unit.name,
            docstring,
        }),
        None => Err(MissingDocstring {
            kind: unit.kind,
            name: Some(unit.name),
            line: Some(unit.line),
        }),
    }
}

/// Rendered content of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSection {
    /// Every unit carried a docstring
    Documented(ModuleDoc),
    /// Extraction failed; the file is replaced by the failure marker
    ReadFailure(MissingDocstring),
}

impl FileSection {
    pub fn from_outline(outline: ModuleOutline, file_kind: FileKind) -> Self {
        match outline.into_documented(file_kind) {
            Ok(doc) => FileSection::Documented(doc),
            Err(missing) => FileSection::ReadFailure(missing),
        }
    }
}

/// Hierarchical numbering state for a traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Numbering {
    pub package: usize,
    pub module: usize,
    pub item: usize,
}

impl Numbering {
    /// A new package restarts module and item numbering
    pub fn enter_package(&mut self) {
        self.package += 1;
        self.module = 0;
        self.item = 0;
    }

    /// A new module restarts item numbering
    pub fn enter_module(&mut self) {
        self.module += 1;
        self.item = 0;
    }

    pub fn enter(&mut self, kind: FileKind) {
        match kind {
            FileKind::Package => self.enter_package(),
            FileKind::Module => self.enter_module(),
        }
    }

    /// Advance the item counter and return the new item number
    pub fn next_item(&mut self) -> usize {
        self.item += 1;
        self.item
    }

    /// Dotted `<package>.<module>` prefix
    pub fn module_prefix(&self) -> String {
        format!("{}.{}", self.package, self.module)
    }

    /// Dotted `<package>.<module>.<item>` prefix
    pub fn item_prefix(&self) -> String {
        format!("{}.{}.{}", self.package, self.module, self.item)
    }
}

/// Aggregate totals for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTally {
    pub packages: usize,
    pub modules: usize,
    pub subroutines: usize,
    pub classes: usize,
    pub methods: usize,
    pub failures: usize,
}

impl DocTally {
    pub fn add_file(&mut self, kind: FileKind) {
        match kind {
            FileKind::Package => self.packages += 1,
            FileKind::Module => self.modules += 1,
        }
    }

    /// Commit the unit counts of a successfully documented file
    pub fn add_documented(&mut self, doc: &ModuleDoc) {
        self.subroutines += doc.functions.len();
        self.classes += doc.classes.len();
        self.methods += doc.method_count();
    }

    pub fn add_failure(&mut self) {
        self.failures += 1;
    }

    /// Rows of the summary block as (label, value)
    pub fn rows(&self) -> [(&'static str, usize); 6] {
        [
            ("Total of packages", self.packages),
            ("Total of modules", self.modules),
            ("Total of subroutines", self.subroutines),
            ("Total of classes", self.classes),
            ("Total of methods", self.methods),
            ("Total of read failures", self.failures),
        ]
    }
}
