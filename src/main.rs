use clap::{Parser, Subcommand};
use po_sheet::layout::LayoutKind;
use po_sheet::{error, parser, reader, strip, writer, OutputFormat};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "po-sheet")]
#[command(version, about = "Parse purchase-order input sheets into normalized orders")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Print detailed progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse the input sheet into orders
    Parse {
        /// Excel file to parse (.xls or .xlsx)
        input: PathBuf,

        /// Column layout of the input sheet
        #[arg(short, long, value_enum, default_value_t = LayoutKind::Template)]
        layout: LayoutKind,

        /// Sheet name (default depends on the layout)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Recalculate formulas before reading values (xlsx only)
        #[arg(long)]
        recalculate: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the input sheet and write the rest of the workbook to a new file
    Strip {
        /// Excel file to read
        input: PathBuf,

        /// Where to write the stripped workbook (.xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// Sheet to remove
        #[arg(short, long, default_value = "Input")]
        sheet: String,

        /// Re-read the written file and report its formatting
        #[arg(long)]
        verify: bool,

        /// Compare formatting of the kept sheets before and after
        #[arg(long)]
        compare: bool,
    },

    /// Report which of the given sheets exist and their extent
    Sheets {
        /// Excel file to inspect
        input: PathBuf,

        /// Sheet names to look for (default: 갑지, 을지)
        names: Vec<String>,
    },
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();

    match run(args.command) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Run a command, returning the process exit code.
fn run(command: Command) -> error::Result<i32> {
    match command {
        Command::Parse {
            input,
            layout,
            sheet,
            format,
            recalculate,
            pretty,
            output,
        } => {
            let config = parser::ParseConfig {
                layout,
                sheet,
                recalculate,
            };
            let out = writer::OutputConfig { format, pretty };

            match format {
                OutputFormat::Json => {
                    // A failed parse still emits its report before exiting
                    let report = parser::parse_file(&input, &config);
                    with_output(output.as_deref(), |w| writer::write_report(&report, w, &out))?;
                    Ok(report.exit_code)
                }
                _ => {
                    // Delimited output has no envelope; fail before creating the file
                    let loaded = match parser::load_items(&input, &config) {
                        Err(e) if format.delimiter().is_some() => return Err(e),
                        loaded => loaded,
                    };
                    with_output(output.as_deref(), |w| writer::write_items_outcome(loaded, w, &out))
                }
            }
        }
        Command::Strip {
            input,
            output,
            sheet,
            verify,
            compare,
        } => {
            let options = strip::StripOptions { verify, compare };
            let report = match strip::strip_input_sheet(&input, &output, &sheet, options) {
                Ok(report) => report,
                Err(e) => {
                    print_json(&strip::StripReport::failure(&e))?;
                    return Err(e);
                }
            };
            print_json(&report)?;
            Ok(0)
        }
        Command::Sheets { input, names } => {
            let workbook = reader::open_workbook(&input)?;
            let summaries = if names.is_empty() {
                reader::sheet_summaries(&workbook, reader::EMAIL_SHEETS)
            } else {
                reader::sheet_summaries(&workbook, &names)
            };
            print_json(&summaries)?;
            Ok(0)
        }
    }
}

fn with_output<T, F>(output: Option<&Path>, write: F) -> error::Result<T>
where
    F: FnOnce(&mut dyn Write) -> error::Result<T>,
{
    match output {
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write(&mut handle)
        }
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            tracing::debug!(output = %path.display(), "writing output");
            let mut file = std::fs::File::create(path)?;
            write(&mut file)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> error::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
