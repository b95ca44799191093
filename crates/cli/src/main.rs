//! mta-docstring-man CLI
//!
//! Writes `docstring_man.md` in the current directory from the docstrings
//! of every Python package and module below it.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use mta_docstring_man_core::{format_report, DocBuilder, DocConfig, ReportFormat};
use std::time::Duration;

/// Developer manual generator for Python source trees
#[derive(Parser)]
#[command(name = "mta-docstring-man")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render the docstrings of the current Python source tree into docstring_man.md")]
#[command(long_about = r#"
mta-docstring-man: Developer Manual Generator

Walks the current directory, reads the docstrings of every package
(__init__.py), module, top-level function, class and method, and writes
them as one numbered Markdown document to ./docstring_man.md, overwriting
any previous version.

A file whose units lack a docstring is rendered as a READ FAILURE block.
A file that cannot be read or parsed stops the run.

Examples:
  mta-docstring-man                  # Write ./docstring_man.md
  mta-docstring-man --report json    # Also print the totals as JSON
  RUST_LOG=debug mta-docstring-man   # Log every documented file
"#)]
pub struct Args {
    /// Print the run totals to stdout after writing the manual
    #[arg(long, value_enum)]
    pub report: Option<ReportFormatArg>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Report format argument
#[derive(ValueEnum, Clone, Debug)]
pub enum ReportFormatArg {
    Summary,
    Json,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Summary => ReportFormat::Summary,
            ReportFormatArg::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);
    run(&args)
}

fn init_tracing(args: &Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match args.verbose {
        0 => "warn",
        1 => "mta_docstring_man_core=debug,mta_docstring_man=debug",
        _ => "mta_docstring_man_core=trace,mta_docstring_man=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = DocConfig::default();
    let output = config.output.clone();

    // Show progress spinner
    let spinner = if args.verbose > 0 && atty::is(atty::Stream::Stderr) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Invalid spinner template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Documenting project...");
        Some(pb)
    } else {
        None
    };

    let mut builder = DocBuilder::new(config).context("Failed to create builder")?;
    let tally = builder
        .build()
        .with_context(|| format!("Failed to generate {}", output.display()))?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Documented {} packages and {} modules into {}",
            tally.packages,
            tally.modules,
            output.display()
        ));
    }

    if let Some(format) = &args.report {
        let report = format_report(&tally, format.clone().into())?;
        println!("{}", report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_zero_arguments() {
        let args = Args::try_parse_from(["mta-docstring-man"]).unwrap();
        assert!(args.report.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_report_and_verbosity() {
        let args = Args::try_parse_from(["mta-docstring-man", "--report", "json", "-vv"]).unwrap();
        assert!(matches!(args.report, Some(ReportFormatArg::Json)));
        assert_eq!(args.verbose, 2);
        assert!(Args::try_parse_from(["mta-docstring-man", "some/path"]).is_err());
    }
}
