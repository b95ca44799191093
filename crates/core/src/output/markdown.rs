//! Markdown rendering of the developer manual
//!
//! `DocWriter` appends sections to any `Write` sink in traversal order.
//! Nothing is buffered beyond what the sink itself buffers, so a run that
//! aborts leaves the sections written so far.

use crate::models::{ClassEntry, DocEntry, DocTally, Language, ModuleDoc, Numbering, UnitKind};
use std::io::{self, Write};

const TITLE: &str = "# __Developer manual__\n";

const INTRO: &str = "This document was automatically generated based on the \"docstrings\" of project.\n\
                     It is your duty as a developer to keep the the \"docstrings\" of project up to date.";

const FAILURE_LINE: &str = "\nREAD FAILURE\n";

/// Width the summary labels are padded to
const LABEL_WIDTH: usize = 29;

/// Escape `__` so Markdown does not read it as emphasis
pub fn escape_name(name: &str) -> String {
    name.replace("__", r"\_\_")
}

/// Fenced code block tagged with the source language
pub fn code_block(language: Language, text: &str) -> String {
    format!("```{}\n{}\n```\n", language.fence_tag(), text)
}

/// Timestamp line value: local time with UTC offset, minute precision
pub fn format_timestamp<Tz: chrono::TimeZone>(time: &chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%dT%H:%M%:z").to_string()
}

/// Incremental writer for the manual
pub struct DocWriter<W: Write> {
    sink: W,
    language: Language,
}

impl<W: Write> DocWriter<W> {
    pub fn new(sink: W, language: Language) -> Self {
        Self { sink, language }
    }

    fn block(&mut self, text: &str) -> io::Result<()> {
        let block = code_block(self.language, text);
        self.sink.write_all(block.as_bytes())
    }

    /// Title and introductory note
    pub fn write_header(&mut self) -> io::Result<()> {
        self.sink.write_all(TITLE.as_bytes())?;
        self.block(INTRO)
    }

    /// Heading of a package initializer, labelled with its directory
    pub fn write_package_heading(&mut self, numbering: &Numbering, directory: &str) -> io::Result<()> {
        writeln!(
            self.sink,
            "***\n## __{}. {}: {}/__",
            numbering.package,
            UnitKind::Package.label(),
            directory
        )
    }

    /// Heading of a plain module, labelled with its file path
    pub fn write_module_heading(&mut self, numbering: &Numbering, file: &str) -> io::Result<()> {
        writeln!(
            self.sink,
            "## *{}. {}: {}*",
            numbering.module_prefix(),
            UnitKind::Module.label(),
            escape_name(file)
        )
    }

    /// Docstring of the file and every unit, numbered from `numbering`
    pub fn write_module_doc(&mut self, numbering: &mut Numbering, doc: &ModuleDoc) -> io::Result<()> {
        self.block(&doc.docstring)?;

        for function in &doc.functions {
            numbering.next_item();
            self.write_function(numbering, function)?;
        }
        for class in &doc.classes {
            numbering.next_item();
            self.write_class(numbering, class)?;
        }

        Ok(())
    }

    fn write_function(&mut self, numbering: &Numbering, function: &DocEntry) -> io::Result<()> {
        writeln!(
            self.sink,
            "### {}. {}: {}",
            numbering.item_prefix(),
            UnitKind::Function.label(),
            escape_name(&function.name)
        )?;
        self.block(&function.docstring)
    }

    fn write_class(&mut self, numbering: &Numbering, class: &ClassEntry) -> io::Result<()> {
        let class_name = escape_name(&class.name);
        writeln!(
            self.sink,
            "### {}. {}: {}",
            numbering.item_prefix(),
            UnitKind::Class.label(),
            class_name
        )?;
        self.block(&class.docstring)?;

        for (index, method) in class.methods.iter().enumerate() {
            writeln!(
                self.sink,
                "#### {}.{}. {} ({}): {}",
                numbering.item_prefix(),
                index + 1,
                UnitKind::Method.label(),
                class_name,
                escape_name(&method.name)
            )?;
            self.block(&method.docstring)?;
        }

        Ok(())
    }

    /// Marker standing in for a file whose units could not be read
    pub fn write_read_failure(&mut self) -> io::Result<()> {
        self.block(&FAILURE_LINE.repeat(3))
    }

    /// Closing statistics block
    pub fn write_summary(&mut self, tally: &DocTally, timestamp: &str) -> io::Result<()> {
        self.sink.write_all(b"***\n## __Data about the document__\n")?;
        self.sink.write_all(b"```bash\n")?;
        for (label, value) in tally.rows() {
            let label = format!("- {}", label);
            writeln!(self.sink, "{:<width$}: {:4}", label, value, width = LABEL_WIDTH)?;
        }
        write!(
            self.sink,
            "{:<width$}: {}",
            "- Generation date and time",
            timestamp,
            width = LABEL_WIDTH
        )?;
        self.sink.write_all(b"\n```")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
