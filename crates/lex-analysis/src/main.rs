//! CLI entry point for dataset classification and statistical analysis.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use lex_analysis::narrative::{DatasetSummary, NarrativeProvider, TemplateNarrator};
use lex_analysis::{AnalysisConfig, AnalysisReport, AnalysisResult, FailurePolicy, StatisticalAnalyzer};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[cfg(feature = "ai")]
use lex_analysis::narrative::OpenRouterNarrator;

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Dataset classification and statistical analysis",
    long_about = "Classifies a CSV dataset, assesses its quality and runs the analysis that fits its shape.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  OPENROUTER_API_KEY    API key for OpenRouter (optional, used by --narrative)\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  lex-analysis -i sales.csv -q \"How are sales trending?\"\n\n  \
                  # Full report as JSON\n  \
                  lex-analysis -i sales.csv --json | jq .stationarity\n\n  \
                  # Keep going past columns that cannot be analyzed\n  \
                  lex-analysis -i sales.csv --skip-failed-columns"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Question the analysis should answer
    #[arg(short, long, default_value = "Summarize this dataset")]
    query: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(long)]
    quiet: bool,

    /// Output the report as JSON instead of a human-readable summary
    ///
    /// Disables all progress logs; only the JSON report is written to stdout.
    #[arg(long)]
    json: bool,

    /// Skip columns whose analysis fails instead of aborting
    #[arg(long)]
    skip_failed_columns: bool,

    /// Append a narrative summary of the findings
    #[arg(long)]
    narrative: bool,

    /// Use the offline template narrative even when an API key is set
    #[arg(long, default_value = "false")]
    no_ai: bool,

    /// Upper bound on the seasonal decomposition period
    #[arg(long, default_value = "7")]
    max_seasonal_period: usize,

    /// Rolling window for change-point detection
    #[arg(long, default_value = "5")]
    change_point_window: usize,

    /// Rolling standard deviations that mark a change point
    #[arg(long, default_value = "2.0")]
    change_point_threshold: f64,

    /// p-value below which a series is reported stationary
    #[arg(long, default_value = "0.05")]
    significance_level: f64,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging stays off so stdout only carries JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    if !std::path::Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let data = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let policy = if args.skip_failed_columns {
        FailurePolicy::SkipFailedColumns
    } else {
        FailurePolicy::AbortOnError
    };

    let config = AnalysisConfig::builder()
        .max_seasonal_period(args.max_seasonal_period)
        .change_point_window(args.change_point_window)
        .change_point_threshold(args.change_point_threshold)
        .significance_level(args.significance_level)
        .failure_policy(policy)
        .build()?;

    let analyzer = StatisticalAnalyzer::new(config);
    debug!("Analysis config: {:?}", analyzer.config());
    let report = analyzer.analyze(&data, &args.query)?;

    for skipped in &report.skipped_columns {
        warn!("Skipped column '{}' [{}]: {}", skipped.column, skipped.code, skipped.message);
    }

    let narrative = if args.narrative {
        let summary = DatasetSummary::from_report(&data, &report);
        let provider = build_narrator(&args)?;
        debug!("Generating narrative with {}", provider.name());
        Some(provider.generate_narrative(&summary, &args.query)?)
    } else {
        None
    };

    if args.json {
        let mut value = serde_json::to_value(&report)?;
        if let (Some(text), Some(object)) = (&narrative, value.as_object_mut()) {
            object.insert("narrative".to_string(), serde_json::Value::String(text.clone()));
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_human_readable_summary(&args, &report);
        if let Some(text) = narrative {
            println!("NARRATIVE");
            println!("{}", "-".repeat(40));
            println!("{text}");
        }
    }

    Ok(())
}

#[cfg(feature = "ai")]
fn build_narrator(args: &Args) -> Result<Box<dyn NarrativeProvider>> {
    if args.no_ai {
        return Ok(Box::new(TemplateNarrator::new()));
    }

    match std::env::var("OPENROUTER_API_KEY") {
        Ok(api_key) if !api_key.trim().is_empty() => {
            info!("Using OpenRouter for the narrative");
            Ok(Box::new(OpenRouterNarrator::new(api_key)?))
        }
        _ => {
            info!("OPENROUTER_API_KEY not set, using the template narrative");
            Ok(Box::new(TemplateNarrator::new()))
        }
    }
}

#[cfg(not(feature = "ai"))]
fn build_narrator(_args: &Args) -> Result<Box<dyn NarrativeProvider>> {
    Ok(Box::new(TemplateNarrator::new()))
}

/// Print the report for a terminal.
///
/// Uses `println!` for user-facing output so it shows regardless of log level.
fn print_human_readable_summary(args: &Args, report: &AnalysisReport) {
    let classification = &report.classification;
    let quality = &report.data_quality;

    println!("\n{}", "=".repeat(80));
    println!("ANALYSIS: {}", args.query.trim());
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", quality.row_count);
    println!("  Columns: {}", quality.column_count);
    match classification.confidence {
        Some(confidence) => println!("  Shape: {} ({confidence:.2}% confidence)", classification.shape),
        None => println!("  Shape: {}", classification.shape),
    }
    println!("  Datetime: {:?}", classification.datetime_columns);
    println!("  Numeric: {:?}", classification.numeric_columns);
    println!("  Categorical: {:?}", classification.categorical_columns);
    println!();

    println!("DATA QUALITY");
    println!("{}", "-".repeat(40));
    println!("  Completeness: {:.1}%", quality.completeness_score);
    println!("  Duplicate rows: {}", quality.duplicate_row_count);
    for (column, pct) in &quality.completeness.missing_percentage {
        if *pct > 0.0 {
            println!("  {:<20} {:>6.1}% missing", truncate_str(column, 19), pct);
        }
    }
    println!();

    match &report.result {
        AnalysisResult::TimeSeries(ts) => {
            println!("TIME SERIES (axis: {})", ts.date_column);
            println!("{}", "-".repeat(40));
            println!(
                "{:<20} {:<12} {:>10} {:>10} {:>12} {:>8}",
                "Column", "Trend", "Strength", "Mean", "Stationary", "Changes"
            );
            println!("{}", "-".repeat(76));
            for (column, trend) in &ts.trends {
                let stationary = ts
                    .stationarity
                    .get(column)
                    .map(|s| if s.is_stationary { "yes" } else { "no" })
                    .unwrap_or("-");
                let changes = ts
                    .change_points
                    .get(column)
                    .map(|c| c.significant_changes.len())
                    .unwrap_or(0);
                println!(
                    "{:<20} {:<12} {:>10.3} {:>10.2} {:>12} {:>8}",
                    truncate_str(column, 19),
                    format!("{:?}", trend.trend).to_lowercase(),
                    trend.trend_strength,
                    trend.mean,
                    stationary,
                    changes
                );
            }
        }
        AnalysisResult::Numerical(num) => {
            println!("NUMERICAL STATISTICS");
            println!("{}", "-".repeat(40));
            println!(
                "{:<20} {:>12} {:>12} {:>12} {:>8}",
                "Column", "Mean", "Median", "Std", "Skew"
            );
            println!("{}", "-".repeat(68));
            for (column, s) in &num.statistics {
                println!(
                    "{:<20} {:>12.3} {:>12.3} {:>12.3} {:>8.3}",
                    truncate_str(column, 19),
                    s.mean,
                    s.median,
                    s.std,
                    s.skew
                );
            }
            if let Some(matrix) = &num.correlations {
                println!("\n  Correlated columns: {}", matrix.columns.join(", "));
            }
        }
        AnalysisResult::Categorical(cat) => {
            println!("CATEGORY FREQUENCIES");
            println!("{}", "-".repeat(40));
            for (column, table) in &cat.frequencies {
                println!("  {column}");
                for (value, count) in table.iter().take(10) {
                    println!("    {:<24} {count}", truncate_str(value, 23));
                }
                if table.len() > 10 {
                    println!("    ... {} more", table.len() - 10);
                }
            }
        }
    }
    println!();
}

/// Truncate a string for table output.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Load a CSV file, retrying with pre-cleaned content when the parser rejects it.
fn load_csv(path: &str) -> Result<DataFrame> {
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    let content = std::fs::read_to_string(path)?;
    let cleaned: String = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .into_reader_with_file_handle(std::io::Cursor::new(cleaned))
        .finish()
        .map_err(|e| e.into())
}
