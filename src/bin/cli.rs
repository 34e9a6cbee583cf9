//! CDX Filter CLI
//!
//! Local execution entry point for filtering saved CDX results.

use std::io;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use cdx_filter::{
    error::{AppError, Result},
    models::{Config, CriteriaSource, ScanPlan},
    pipeline::{self, criteria},
    utils::url::UrlPolicy,
};

/// cdx-filter - search saved CDX results and build Wayback Machine links
#[derive(Parser, Debug)]
#[command(
    name = "cdx-filter",
    version,
    about = "Filter CDX capture index results into Wayback Machine links"
)]
#[command(group(
    ArgGroup::new("criteria")
        .required(true)
        .args(["scan", "textfile", "json", "field"]),
))]
struct Cli {
    /// JSON file retrieved from the CDX server
    #[arg(short, long, value_name = "JSON_FILE")]
    infile: PathBuf,

    /// Comma-separated strings to scan URLs for (e.g. .exe,.JPG,/cgi-bin/)
    #[arg(short, long, value_name = "STRINGS")]
    scan: Option<String>,

    /// Plain text file with one search string per line
    #[arg(short, long, value_name = "TEXTFILE")]
    textfile: Option<PathBuf>,

    /// JSON object of category names to comma-separated search strings
    #[arg(short, long, value_name = "IN_FILE")]
    json: Option<PathBuf>,

    /// Match records whose KEY field equals VALUE (e.g. mimetype text/html)
    #[arg(short, long, num_args = 2, value_names = ["KEY", "VALUE"])]
    field: Option<Vec<String>>,

    /// Comma-separated strings; URLs containing any of them are skipped
    #[arg(short, long, value_name = "STRINGS")]
    exclude: Option<String>,

    /// Compare strings case-sensitively
    #[arg(short, long)]
    case_sensitive: bool,

    /// Do not echo matches to the console
    #[arg(short, long)]
    quiet: bool,

    /// Write a plain text list of links
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    make_list: Option<PathBuf>,

    /// Write an HTML page of links that open in a new window
    #[arg(short = 'n', long, value_name = "OUTPUT_FILE")]
    make_html: Option<PathBuf>,

    /// Write matched records as a JSON array (can be filtered again)
    #[arg(short = 'k', long, value_name = "OUT_FILE")]
    json_out: Option<PathBuf>,

    /// Write records matched by --field as a JSON array
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    outfile: Option<PathBuf>,

    /// Link style: "simple" or "path-rewrite"
    #[arg(long, value_name = "POLICY")]
    url_policy: Option<UrlPolicy>,

    /// Overwrite output files that already exist
    #[arg(long)]
    force: bool,

    /// Path to configuration file
    #[arg(long, default_value = "cdx-filter.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = if cli.config.exists() {
        match Config::load(&cli.config) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    } else {
        (Config::default(), None)
    };

    init_logging(cli.verbose, &config.logging.level);

    if let Some(e) = config_error {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }
    config.validate()?;

    let source = CriteriaSource::select(cli.scan, cli.textfile, cli.json, cli.field)?;
    let mut plan = ScanPlan::new(source, &config);
    plan.exclude_terms = cli
        .exclude
        .as_deref()
        .map(|list| criteria::negative_filter(list).terms().to_vec())
        .unwrap_or_default();
    plan.case_sensitive |= cli.case_sensitive;
    plan.quiet = cli.quiet;
    plan.force = cli.force;
    if let Some(policy) = cli.url_policy {
        plan.url_policy = policy;
    }
    plan.outputs.plain_list = cli.make_list;
    plan.outputs.html_list = cli.make_html;
    plan.outputs.json_array = cli.json_out;
    plan.outputs.field_output = cli.outfile;
    plan.validate()?;

    if !cli.infile.exists() {
        log::error!("Input file {} doesn't exist", cli.infile.display());
        return Err(AppError::config(format!(
            "input file {} doesn't exist",
            cli.infile.display()
        )));
    }

    let store = pipeline::load_records(&cli.infile)?;

    let mut stdout = io::stdout().lock();
    let report = pipeline::run_scan(&plan, &store, &mut stdout)?;
    drop(stdout);

    for line in report.summary_lines() {
        println!("{line}");
    }

    Ok(())
}
