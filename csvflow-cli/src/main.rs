//! Command-line entry point for the csvflow pipeline
//!
//! Loads a delimited file from the data directory, parses the operation
//! description into a typed pipeline, runs it against the table and prints
//! each step's output. Unknown operation names are reported and skipped; any
//! other malformed step aborts the run with a non-zero exit.

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use csvflow_core::csv::{read_table, resolve_encoding, CsvReadOptions, CsvWriteOptions};
use csvflow_core::pipeline::{parse_pipeline, Runner, RunnerOptions, StepOutput};

#[derive(Parser, Debug)]
#[command(
    name = "csvflow",
    about = "Apply an ordered pipeline of transformations to a delimited text file",
    version
)]
struct Cli {
    /// Source file, resolved relative to the data directory
    #[arg(short, long)]
    input: PathBuf,

    /// Column separator used in the source file
    #[arg(short, long, default_value = ",")]
    separator: char,

    /// Text encoding of the source file
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// Number of rows for head/tail views (non-positive falls back to 5)
    #[arg(short, long, default_value_t = 5)]
    rows: i64,

    /// Ordered pipeline description, e.g. "update;filter age > 10;head"
    #[arg(
        short,
        long,
        default_value = "update;replace_missing;remove_empty;head"
    )]
    operations: String,

    /// Delimiter separating operations in the pipeline description
    #[arg(short = 'd', long, default_value_t = ';')]
    op_delimiter: char,

    /// Directory that input and save paths are resolved against
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    ensure!(
        cli.separator.is_ascii(),
        "separator must be a single ASCII character"
    );
    let delimiter = cli.separator as u8;
    let encoding = resolve_encoding(&cli.encoding)?;
    let rows = if cli.rows > 0 { cli.rows as usize } else { 5 };

    let input = cli.data_dir.join(&cli.input);
    let table = read_table(&input, &CsvReadOptions { delimiter, encoding })
        .with_context(|| format!("failed to load {}", input.display()))?;

    let ops = parse_pipeline(&cli.operations, cli.op_delimiter)
        .context("malformed operations string")?;

    let mut runner = Runner::new(
        table,
        RunnerOptions {
            rows,
            data_dir: cli.data_dir,
            write_options: CsvWriteOptions { delimiter },
        },
    );

    for op in &ops {
        if let Some(output) = runner.apply(op)? {
            print_output(&output, rows);
        }
    }

    Ok(())
}

/// Print one step's output the way the tool reports it
fn print_output(output: &StepOutput, rows: usize) {
    match output {
        StepOutput::Rows { op, rendered, .. } => {
            println!("Printing {} data with {} rows.", op, rows);
            print!("{}", rendered);
        }
        StepOutput::Aggregate {
            column,
            stat,
            value,
        } => {
            println!(
                "Aggregation result for column '{}' with operation '{}': {}",
                column, stat, value
            );
        }
        StepOutput::Saved(path) => {
            println!("Data saved to {}", path.display());
        }
    }
}

/// Route diagnostics to stderr, honoring `RUST_LOG` when set
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
