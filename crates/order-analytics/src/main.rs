//! CLI entry point for the order analytics pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use order_analytics::{
    AnalyticsConfig, CleaningSummary, DataCleaner, OrderAnalyzer, OrderReport,
    load_csv_with_options, merge_by_key, write_csv,
};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Pipeline mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Apply the configured cleaning steps and write the cleaned CSV
    Clean,
    /// Clean, enrich and report sales metrics
    Analyze,
    /// Append a key column from a second, already cleaned export
    Merge,
}

#[derive(Parser, Debug)]
#[command(
    author = "Order Analytics Team",
    version,
    about = "Order data cleaning and sales analytics pipeline",
    long_about = "Cleans vendor order exports and reports sales metrics.\n\n\
                  MODES:\n  \
                  clean     Apply configured cleaning steps and write the result\n  \
                  analyze   Clean, enrich and print the sales report (default)\n  \
                  merge     Append a key column from a second cleaned export\n\n\
                  EXAMPLES:\n  \
                  # Analyze an order export\n  \
                  order-analytics -i orders.csv\n\n  \
                  # Clean with keyword filtering and a stray header row\n  \
                  order-analytics -m clean -i orders.csv --filter-keywords ml --trim-first 1\n\n  \
                  # Preview the canonical step order without touching data\n  \
                  order-analytics -i orders.csv --filter-keywords ml --dry-run\n\n  \
                  # Merge cleaned exports on a key column\n  \
                  order-analytics -m merge -i income.csv --merge-with orders.csv --merge-key \"Order ID\""
)]
struct Args {
    /// Pipeline mode
    #[arg(short, long, value_enum, default_value = "analyze")]
    mode: Mode,

    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Second CSV file providing the merge key column (merge mode)
    ///
    /// Expected to be cleaned to the same row count as the input
    #[arg(long)]
    merge_with: Option<String>,

    /// Output CSV path for cleaned or merged data
    ///
    /// If not specified, uses "./outputs/<input_stem>_<mode>.csv"
    #[arg(short, long)]
    output: Option<String>,

    /// Path to a JSON configuration file
    ///
    /// Command-line flags override values loaded from the file
    #[arg(short, long)]
    config: Option<String>,

    /// Columns to delete, comma-separated
    #[arg(long, value_delimiter = ',')]
    delete_columns: Vec<String>,

    /// Keywords for row filtering, comma-separated
    ///
    /// Rows where any cell contains any keyword (case-insensitive) are dropped
    #[arg(long, value_delimiter = ',')]
    filter_keywords: Vec<String>,

    /// Columns whose cells are replaced by their first digit run, comma-separated
    #[arg(long, value_delimiter = ',')]
    extract_integers: Vec<String>,

    /// Number of leading rows to remove
    #[arg(long, default_value = "0")]
    trim_first: usize,

    /// Number of trailing rows to remove
    #[arg(long, default_value = "0")]
    trim_last: usize,

    /// Column projected from the merge source (merge mode)
    #[arg(long)]
    merge_key: Option<String>,

    /// Drop the first data row after the header when loading
    ///
    /// Some vendor exports repeat the header as the first data row
    #[arg(long)]
    skip_first_data_row: bool,

    /// Preview the pipeline without processing
    ///
    /// Shows the dataset shape and the cleaning steps in canonical order
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON.
    /// Useful for piping to other tools: `... --json | jq .top_state`
    #[arg(long)]
    json: bool,

    /// Write the full report as JSON to the outputs directory (analyze mode)
    ///
    /// The report will be saved as <input_stem>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // If JSON output is requested, don't initialize any logging
    // This ensures stdout only contains the JSON payload
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
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging (disabled if --json is set)
    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    // Validate input file exists
    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;

    info!("Loading dataset from: {}", args.input);
    let data = load_csv_with_options(&args.input, config.skip_first_data_row)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    if args.dry_run {
        return run_dry_run(&args, &config, &data);
    }

    match args.mode {
        Mode::Clean => run_clean(&args, &config, &data),
        Mode::Analyze => run_analyze(&args, &config, &data),
        Mode::Merge => run_merge(&args, &config, &data),
    }
}

/// Merge file-based configuration with command-line overrides.
fn build_config(args: &Args) -> Result<AnalyticsConfig> {
    let mut config = match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path);
            AnalyticsConfig::from_json_file(path)?
        }
        None => AnalyticsConfig::default(),
    };

    if !args.delete_columns.is_empty() {
        config.columns_to_delete = args.delete_columns.clone();
    }
    if !args.filter_keywords.is_empty() {
        config.keywords_to_filter = args.filter_keywords.clone();
    }
    if !args.extract_integers.is_empty() {
        config.columns_to_extract_integers = args.extract_integers.clone();
    }
    if args.trim_first > 0 {
        config.first_rows_to_trim = args.trim_first;
    }
    if args.trim_last > 0 {
        config.last_rows_to_trim = args.trim_last;
    }
    if let Some(key) = &args.merge_key {
        config.merge_key_column = Some(key.clone());
    }
    if args.skip_first_data_row {
        config.skip_first_data_row = true;
    }

    config.validate()?;
    Ok(config)
}

/// Run clean mode: apply the configured steps and write the result.
fn run_clean(args: &Args, config: &AnalyticsConfig, data: &DataFrame) -> Result<()> {
    let steps = config.cleaning_steps();
    let (mut cleaned, summary) = DataCleaner.apply_with_summary(data, &steps)?;

    let output_path = resolve_output_path(args, "cleaned");
    write_csv(&mut cleaned, &output_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_cleaning_summary(&summary, &args.input, &output_path);
    }
    Ok(())
}

/// Run analyze mode: clean, enrich, and report.
fn run_analyze(args: &Args, config: &AnalyticsConfig, data: &DataFrame) -> Result<()> {
    let steps = config.cleaning_steps();
    let (cleaned, summary) = DataCleaner.apply_with_summary(data, &steps)?;
    let report = OrderAnalyzer.build_report(&cleaned, config)?;

    if args.emit_report {
        let report_path = format!("./outputs/{}_report.json", extract_file_stem(&args.input));
        std::fs::create_dir_all("./outputs")?;
        std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
        info!("Report written to {}", report_path);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &summary, args);
    }
    Ok(())
}

/// Run merge mode: append the key column from the merge source.
///
/// Both files are loaded as-is; clean them first with clean mode so their
/// rows line up.
fn run_merge(args: &Args, config: &AnalyticsConfig, data: &DataFrame) -> Result<()> {
    let source_path = args
        .merge_with
        .as_ref()
        .ok_or_else(|| anyhow!("Merge mode requires --merge-with <PATH>"))?;
    if !Path::new(source_path).exists() {
        return Err(anyhow!("Merge source file not found: {}", source_path));
    }
    let key_column = config.merge_key_column.as_ref().ok_or_else(|| {
        anyhow!("Merge mode requires --merge-key or merge_key_column in the config file")
    })?;

    let key_source = load_csv_with_options(source_path, config.skip_first_data_row)?;
    let mut merged = merge_by_key(data, &key_source, key_column)?;

    let output_path = resolve_output_path(args, "merged");
    write_csv(&mut merged, &output_path)?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "output": output_path,
                "rows": merged.height(),
                "columns": merged.width(),
            })
        );
    } else {
        println!(
            "Merged '{}' from {} into {} -> {} ({} rows x {} columns)",
            key_column,
            source_path,
            args.input,
            output_path,
            merged.height(),
            merged.width()
        );
    }
    Ok(())
}

/// Run dry-run mode - show what would happen without processing.
///
/// Note: This function uses `println!` intentionally for user-facing CLI
/// output. Unlike logging (`info!`, `debug!`), this output should always be
/// visible regardless of log level settings since it's the primary purpose
/// of --dry-run.
fn run_dry_run(args: &Args, config: &AnalyticsConfig, data: &DataFrame) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of pipeline actions");
    println!("{}\n", "=".repeat(80));

    // 1. Dataset Overview
    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    // 2. Column listing
    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!("{:<28} {:<12}", "Column", "Type");
    println!("{}", "-".repeat(40));
    for column in data.get_columns() {
        println!(
            "{:<28} {:<12}",
            truncate_str(column.name().as_str(), 27),
            format!("{:?}", column.dtype())
        );
    }
    println!();

    // 3. Cleaning steps in canonical order
    println!("CLEANING STEPS (canonical order)");
    println!("{}", "-".repeat(40));
    let steps = config.cleaning_steps();
    if steps.is_empty() {
        println!("  (none configured)");
    } else {
        for (idx, step) in steps.iter().enumerate() {
            println!("  {}. {}", idx + 1, step.describe());
        }
    }
    println!();

    // 4. Mode-specific actions
    match args.mode {
        Mode::Clean => {
            println!(
                "Would write the cleaned dataset to {}",
                resolve_output_path(args, "cleaned")
            );
        }
        Mode::Analyze => {
            println!("Would enrich orders and compute:");
            println!("  - SKU denylist exclusion ({})", config.sku_denylist.join(", "));
            println!("  - repeat customers and purchase frequency");
            println!("  - monthly purchase trend");
            println!("  - totals by variation {:?}", config.allowed_variations);
            println!("  - totals by state and top state");
        }
        Mode::Merge => {
            println!(
                "Would append '{}' from {}",
                config.merge_key_column.as_deref().unwrap_or("<unset>"),
                args.merge_with.as_deref().unwrap_or("<missing --merge-with>")
            );
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN complete - no data was modified");
    println!("{}", "=".repeat(80));
    Ok(())
}

/// Print a human-readable cleaning summary.
fn print_cleaning_summary(summary: &CleaningSummary, input: &str, output: &str) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        input, summary.rows_before, summary.columns_before
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output, summary.rows_after, summary.columns_after
    );
    println!();
    println!(
        "Rows: {} -> {} ({} removed)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed()
    );
    println!(
        "Columns: {} -> {} ({} removed)",
        summary.columns_before,
        summary.columns_after,
        summary.columns_removed()
    );
    println!();

    if !summary.steps_applied.is_empty() {
        println!("Steps Applied:");
        for step in &summary.steps_applied {
            println!("  - {}", step);
        }
        println!();
    }
}

/// Print a human-readable report.
///
/// This is the default output when `--json` is not specified.
fn print_report(report: &OrderReport, summary: &CleaningSummary, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("ORDER ANALYTICS");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input: {} ({} rows x {} columns)",
        args.input, summary.rows_before, summary.columns_before
    );
    println!(
        "Cleaned: {} rows ({} removed)",
        summary.rows_after,
        summary.rows_removed()
    );
    println!();

    let s = &report.summary;
    println!("Summary:");
    println!("  Total Orders: {}", s.total_orders);
    println!("  Total Items Sold: {}", s.total_items_sold);
    println!("  Unique Customers: {}", s.unique_customers);
    println!("  Repeat Customers: {}", s.repeat_customers);
    println!();

    if !report.repeat_customers.is_empty() {
        println!("Repeat Customers:");
        let mut repeat: Vec<(&String, &usize)> = report.repeat_customers.iter().collect();
        repeat.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (buyer, count) in repeat.iter().take(10) {
            println!("  {:<24} {:>3} orders", truncate_str(buyer, 23), count);
        }
        if report.repeat_customers.len() > 10 {
            println!("  ... and {} more", report.repeat_customers.len() - 10);
        }
        println!();
    }

    if !report.monthly_trend.is_empty() {
        println!("Monthly Purchase Trend:");
        for month in &report.monthly_trend {
            println!("  {:<10} {:>5}", month.month, month.orders);
        }
        println!();
    }

    if !report.totals_by_variation.is_empty() {
        println!("Totals by Variation:");
        println!(
            "  {:<12} {:>12} {:>14}",
            "Variation", "Total Items", "Total Orders"
        );
        for totals in &report.totals_by_variation {
            println!(
                "  {:<12} {:>12} {:>14.1}",
                totals.variation, totals.total_items, totals.total_orders
            );
        }
        println!();
    }

    if !report.totals_by_state.is_empty() {
        println!("Sales by State:");
        for totals in report.totals_by_state.iter().take(10) {
            println!(
                "  {:<24} {:>8}",
                truncate_str(&totals.state, 23),
                totals.total_items
            );
        }
        if report.totals_by_state.len() > 10 {
            println!(
                "  ... and {} more states",
                report.totals_by_state.len() - 10
            );
        }
        println!();
    }

    println!("Top State: {}", report.top_state);
    println!();
    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the report as JSON");
    println!("{}", "=".repeat(80));
}

/// Resolve the output path for cleaned or merged data.
fn resolve_output_path(args: &Args, suffix: &str) -> String {
    match &args.output {
        Some(path) => path.clone(),
        None => format!("./outputs/{}_{}.csv", extract_file_stem(&args.input), suffix),
    }
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to a maximum length, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
