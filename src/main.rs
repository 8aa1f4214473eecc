use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use worksheet_pdf::{ExportOptions, PageNumberStyle, RecordKind, convert_json_to_pdf};

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    /// Single ABC worksheet
    Worksheet,
    /// Alternative thought worksheet
    Narrative,
    /// Baseline questionnaire (index event, PCL-5, impact statement)
    Questionnaire,
    /// Stuck point with all of its worksheets
    Aggregate,
}

impl From<Kind> for RecordKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Worksheet => RecordKind::Worksheet,
            Kind::Narrative => RecordKind::Narrative,
            Kind::Questionnaire => RecordKind::Questionnaire,
            Kind::Aggregate => RecordKind::Aggregate,
        }
    }
}

#[derive(Parser)]
#[command(name = "worksheet-pdf")]
#[command(version)]
#[command(about = "Render worksheet records (JSON) to print-ready PDF", long_about = None)]
struct Cli {
    /// Record type of the input file
    #[arg(value_enum)]
    kind: Kind,

    /// Input JSON record
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PDF (defaults to the input path with a .pdf extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// PNG or JPEG drawn at the top-left of every page
    #[arg(long, value_name = "FILE")]
    brand_mark: Option<PathBuf>,

    /// Name shown in the masthead
    #[arg(long, value_name = "TEXT")]
    brand_name: Option<String>,

    /// Date printed in the footer (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    printed_on: Option<NaiveDate>,

    /// Number pages as "Page N of T"
    #[arg(long)]
    page_of_total: bool,

    /// Write uncompressed content streams
    #[arg(long)]
    no_compress: bool,

    /// TrueType font embedded instead of Helvetica
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// TrueType font for bold text
    #[arg(long, value_name = "FILE")]
    bold_font: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut options = ExportOptions {
        compress: !cli.no_compress,
        regular_font: cli.font,
        bold_font: cli.bold_font,
        ..Default::default()
    };
    if let Some(name) = cli.brand_name {
        options.brand_name = name;
    }
    if let Some(date) = cli.printed_on {
        options.printed_on = date;
    }
    if cli.page_of_total {
        options.page_numbers = PageNumberStyle::OfTotal;
    }
    if let Some(path) = &cli.brand_mark {
        match std::fs::read(path) {
            Ok(bytes) => options.brand_mark = Some(bytes),
            Err(e) => log::warn!("Brand mark {} unreadable ({e}); continuing without it", path.display()),
        }
    }

    let output = cli.output.unwrap_or_else(|| cli.input.with_extension("pdf"));
    match convert_json_to_pdf(cli.kind.into(), &cli.input, &output, &options) {
        Ok(()) => {
            println!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
