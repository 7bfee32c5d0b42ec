use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use miette::Result;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;

use sdkguard::analysis::{ApiFinding, GuardAnalyzer};
use sdkguard::apidb::ApiDatabase;
use sdkguard::config::Config;
use sdkguard::discovery::{FileFinder, FileType, SourceFile};
use sdkguard::parser::{JavaParser, KotlinParser, Parser as SourceParser};
use sdkguard::report::{ReportFormat, Reporter};
use sdkguard::resolve::AndroidResolver;

/// sdkguard - Unguarded Android API call detection (Kotlin/Java)
#[derive(Parser, Debug)]
#[command(name = "sdkguard")]
#[command(author, version, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum SDK level (overrides config)
    #[arg(short, long)]
    min_sdk: Option<i64>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML overlay for the API requirement table
    #[arg(long, value_name = "FILE")]
    api_table: Option<PathBuf>,

    /// Ignore suppression markers (noinspection / @SuppressLint)
    #[arg(long)]
    no_suppress: bool,

    /// Enable parallel processing for faster analysis (enabled by default)
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    parallel: bool,

    /// Compact output - one line per issue
    #[arg(long)]
    compact: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Compact,
    Json,
}

/// Determine the report format from CLI options
fn determine_report_format(cli: &Cli) -> ReportFormat {
    if cli.compact {
        return ReportFormat::Compact;
    }
    match cli.format {
        OutputFormat::Terminal => ReportFormat::Terminal,
        OutputFormat::Compact => ReportFormat::Compact,
        OutputFormat::Json => ReportFormat::Json,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completions
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet);

    info!("sdkguard v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run_analysis(&config, &cli)?;

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path).map_err(|e| miette::miette!("{e}"))?
    } else {
        Config::from_default_locations(&cli.path).map_err(|e| miette::miette!("{e}"))?
    };

    // Override with CLI arguments
    if let Some(min_sdk) = cli.min_sdk {
        config.min_sdk = min_sdk;
    }
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if cli.api_table.is_some() {
        config.api_table = cli.api_table.clone();
    }
    if cli.no_suppress {
        config.respect_suppressions = false;
    }

    Ok(config)
}

fn load_api_database(config: &Config, project_root: &PathBuf) -> Result<ApiDatabase> {
    let mut db = ApiDatabase::builtin();
    if let Some(table) = &config.api_table {
        let path = if table.is_absolute() {
            table.clone()
        } else {
            project_root.join(table)
        };
        db.load_overlay(&path).map_err(|e| miette::miette!("{e}"))?;
        info!("Loaded API table overlay from {}", path.display());
    }
    Ok(db)
}

fn analyze_file(
    file: &SourceFile,
    analyzer: &GuardAnalyzer<'_>,
    db: &ApiDatabase,
) -> Vec<ApiFinding> {
    let result = match file.file_type {
        FileType::Java => JavaParser::new().parse_file(&file.path),
        FileType::Kotlin => KotlinParser::new().parse_file(&file.path),
    };
    match result {
        Ok(unit) => analyzer.analyze_unit(&unit, db),
        Err(e) => {
            eprintln!("{}: {}", "Warning".yellow(), e);
            Vec::new()
        }
    }
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start_time = Instant::now();

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config);
    let files = finder
        .find_files(&cli.path)
        .map_err(|e| miette::miette!("{e}"))?;

    info!("Found {} files to analyze", files.len());

    if files.is_empty() {
        println!("{}", "No Kotlin or Java files found.".yellow());
        return Ok(());
    }

    // Step 2: Load the API requirement table
    let db = load_api_database(config, &cli.path)?;
    info!("API table has {} entries", db.len());

    // Step 3: Parse and analyze
    let resolver = AndroidResolver::new();
    let min_sdk = config.min_sdk_level();
    let analyzer =
        GuardAnalyzer::new(&resolver, min_sdk).respect_suppressions(config.respect_suppressions);

    info!("Analyzing against min SDK {}", min_sdk);

    let mut findings: Vec<ApiFinding> = if cli.parallel {
        if !cli.quiet {
            println!(
                "{}",
                format!("⚡ Parallel mode: analyzing {} files...", files.len()).cyan()
            );
        }
        files
            .par_iter()
            .flat_map(|file| analyze_file(file, &analyzer, &db))
            .collect()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut findings = Vec::new();
        for file in &files {
            findings.extend(analyze_file(file, &analyzer, &db));
            pb.inc(1);
        }
        pb.finish_with_message("Analysis complete");
        findings
    };

    findings.sort_by(|a, b| {
        (&a.location.file, a.location.line, a.location.column).cmp(&(
            &b.location.file,
            b.location.line,
            b.location.column,
        ))
    });

    info!("Found {} unguarded calls", findings.len());

    // Step 4: Report results
    let report_format = determine_report_format(cli);
    let reporter =
        Reporter::new(report_format, cli.output.clone()).with_base_path(cli.path.clone());
    reporter.report(&findings)?;

    let elapsed = start_time.elapsed();
    if !cli.quiet {
        println!(
            "{}",
            format!(
                "⏱  Analyzed {} files in {:.2}s",
                files.len(),
                elapsed.as_secs_f64()
            )
            .dimmed()
        );
    }

    Ok(())
}
