//! `revcast` command line interface.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use revcast::config::AppConfig;
use revcast::detection::ColumnSuggestion;
use revcast::io::write_demo_csv;
use revcast::report::{build_report, write_csv, write_pdf, ReportInput};
use revcast::session::{PipelineSnapshot, Session};
use revcast::transform::preview;
use revcast::utils::format::{format_currency, format_date, format_growth, MONTH_DATE};

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "revcast", version, about = "Forecast monthly figures from a spreadsheet")]
struct Cli {
    /// Configuration file (defaults to ./revcast.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Suggest the date and value columns of a file.
    Detect {
        file: PathBuf,
    },
    /// Forecast a file or the demo data set.
    Forecast(ForecastArgs),
    /// Write the demo data set as CSV.
    Demo {
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,
    },
}

#[derive(Debug, Args)]
struct ForecastArgs {
    /// CSV or workbook to read.
    #[arg(required_unless_present = "demo", conflicts_with = "demo")]
    file: Option<PathBuf>,

    /// Use the bundled demo data set.
    #[arg(long)]
    demo: bool,

    /// Date column (detected when omitted).
    #[arg(long, value_name = "COLUMN")]
    date_column: Option<String>,

    /// Value column (detected when omitted).
    #[arg(long, value_name = "COLUMN")]
    value_column: Option<String>,

    /// Months to forecast.
    #[arg(long, value_name = "N")]
    horizon: Option<usize>,

    /// Write history and forecast as CSV.
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Write the PDF report.
    #[arg(long, value_name = "PATH")]
    pdf: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::discover(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Detect { file } => detect(config, &file),
        Command::Forecast(args) => run_forecast(config, args),
        Command::Demo { output } => {
            let file = File::create(&output)
                .with_context(|| format!("cannot create {}", output.display()))?;
            write_demo_csv(BufWriter::new(file))?;
            println!("Demo data written to {}", output.display());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "revcast=debug" } else { "revcast=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn detect(config: AppConfig, file: &Path) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let loaded = session
        .load_file(file)
        .with_context(|| format!("cannot load {}", file.display()))?;

    println!(
        "{} rows, {} columns",
        loaded.table.row_count(),
        loaded.table.column_count()
    );
    print_suggestion(&loaded.suggestion);
    Ok(())
}

fn print_suggestion(suggestion: &ColumnSuggestion) {
    let or_none = |c: &Option<String>| c.clone().unwrap_or_else(|| "-".to_string());
    println!("Date column:  {}", or_none(&suggestion.date));
    println!("Value column: {}", or_none(&suggestion.value));
    println!("Date candidates:  {}", suggestion.date_candidates.join(", "));
    println!("Value candidates: {}", suggestion.value_candidates.join(", "));
}

fn run_forecast(config: AppConfig, args: ForecastArgs) -> anyhow::Result<()> {
    let horizon = args.horizon.unwrap_or(config.forecast.default_horizon);
    let report_settings = config.report.clone();
    let mut session = Session::new(config);

    let suggestion = match &args.file {
        Some(path) => {
            session
                .load_file(path)
                .with_context(|| format!("cannot load {}", path.display()))?
                .suggestion
                .clone()
        }
        None => session.load_demo().suggestion.clone(),
    };

    let Some(date_column) = args.date_column.or(suggestion.date) else {
        bail!("no date column detected; pass --date-column");
    };
    let Some(value_column) = args.value_column.or(suggestion.value) else {
        bail!("no numeric value column detected; pass --value-column");
    };

    let snapshot = session
        .generate(&date_column, &value_column, horizon)
        .context("forecast failed")?;
    print_snapshot(&snapshot, &report_settings.currency);

    if let Some(path) = &args.csv {
        let file =
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        write_csv(BufWriter::new(file), &snapshot.series, &snapshot.forecast)?;
        println!("CSV written to {}", path.display());
    }
    if let Some(path) = &args.pdf {
        let doc = build_report(
            ReportInput {
                history: &snapshot.series,
                forecast: &snapshot.forecast,
                metrics: &snapshot.metrics,
                generated_at: chrono::Local::now().naive_local(),
            },
            &report_settings,
        );
        write_pdf(&doc, &report_settings, path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!("PDF written to {}", path.display());
    }
    Ok(())
}

fn print_snapshot(snapshot: &PipelineSnapshot, currency: &str) {
    let variant = snapshot.forecast.variant();
    println!(
        "{} observations of '{}' by '{}'",
        snapshot.series.len(),
        snapshot.value_column,
        snapshot.date_column
    );
    println!("Model: {} ({})", variant, variant.description());

    println!();
    println!("Preview:");
    for row in preview(&snapshot.series, PREVIEW_ROWS, currency) {
        println!("  {:<12} {:>16}", row.date, row.value);
    }

    let m = &snapshot.metrics;
    println!();
    println!("Historical avg:   {}", format_currency(currency, m.historical_avg, 0));
    println!("Forecast avg:     {}", format_currency(currency, m.forecast_avg, 0));
    println!("Projected growth: {}", format_growth(m.growth_rate));
    println!(
        "{}-month total:   {}",
        m.forecast_periods,
        format_currency(currency, m.projected_total, 0)
    );

    println!();
    println!("Forecast:");
    for (date, value) in snapshot.forecast.points() {
        println!(
            "  {:<10} {:>18}",
            format_date(date, MONTH_DATE),
            format_currency(currency, value, 2)
        );
    }
}
