//! xlsplit CLI - split a sheet into one workbook per column value

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use xlsplit::prelude::*;

#[derive(Parser)]
#[command(name = "xlsplit")]
#[command(
    author,
    version,
    about = "Split an XLSX sheet into one workbook per distinct column value"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input workbook (xlsx)
        input: PathBuf,
    },

    /// List the header columns of a sheet
    Columns {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Sheet name
        #[arg(short, long)]
        sheet: String,
    },

    /// Write one workbook per distinct value of a column
    Split {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Sheet name
        #[arg(short, long)]
        sheet: String,

        /// Split column: header text, or 0-based index
        #[arg(short, long)]
        column: String,

        /// Directory under which the `<column>/` output directory is created
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Delete files already written if a later file fails
        #[arg(long)]
        remove_on_error: bool,

        /// Do not print progress
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Columns { input, sheet } => list_columns(&input, &sheet),
        Commands::Split {
            input,
            sheet,
            column,
            output_dir,
            remove_on_error,
            quiet,
        } => {
            let policy = if remove_on_error {
                FailurePolicy::RemoveWritten
            } else {
                FailurePolicy::KeepWritten
            };
            let options = SplitOptions::default()
                .output_root(output_dir)
                .on_failure(policy);
            split(&input, &sheet, &column, options, quiet)
        }
    }
}

fn open(input: &Path) -> Result<Splitter<std::io::BufReader<std::fs::File>>> {
    Splitter::open_file(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn list_sheets(input: &Path) -> Result<()> {
    let splitter = open(input)?;
    for (i, name) in splitter.sheets().iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}

fn list_columns(input: &Path, sheet: &str) -> Result<()> {
    let mut splitter = open(input)?;
    let columns = splitter
        .columns(sheet)
        .with_context(|| format!("Failed to read columns of sheet '{}'", sheet))?;

    for (i, name) in columns.iter().enumerate() {
        println!("{}: {}", i, name);
    }
    Ok(())
}

/// Resolve a column argument against the header; header text wins over an index
fn resolve_column(columns: &[String], arg: &str) -> Result<usize> {
    if let Some(index) = columns.iter().position(|c| c == arg) {
        return Ok(index);
    }
    match arg.parse::<usize>() {
        Ok(index) => Ok(index),
        Err(_) => bail!(
            "No column named '{}' (available: {})",
            arg,
            columns.join(", ")
        ),
    }
}

fn split(
    input: &Path,
    sheet: &str,
    column: &str,
    options: SplitOptions,
    quiet: bool,
) -> Result<()> {
    let mut splitter = open(input)?.with_options(options);
    if !quiet {
        splitter.register_observer("stderr", |status| eprintln!("{}", status));
    }

    let columns = splitter
        .columns(sheet)
        .with_context(|| format!("Failed to read columns of sheet '{}'", sheet))?;
    let index = resolve_column(&columns, column)?;

    let started = Instant::now();
    let report = splitter
        .split_by_column(sheet, index)
        .with_context(|| format!("Failed to split sheet '{}'", sheet))?;

    println!(
        "Finished splitting sheet \"{}\" based on column \"{}\" (took {:.2}s)",
        report.sheet,
        report.column,
        started.elapsed().as_secs_f64()
    );
    for group in &report.groups {
        println!("{}", group.path.display());
    }
    Ok(())
}
