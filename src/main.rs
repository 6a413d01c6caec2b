use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sqlgen::codegen::{CodeGenConfig, CodeGenerator, Gofmt, GoGenerator, TerminalPrompt};
use sqlgen::config::{ConnectionOverrides, DbConfig};
use sqlgen::introspect::{Introspector, TableFilter};
use sqlgen::pipeline::{BatchSummary, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "sqlgen")]
#[command(version, about, long_about = None)]
struct Cli {
    /// MySQL host [env: DB_HOST] [default: localhost]
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// MySQL port [env: DB_PORT] [default: 3306]
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// MySQL user [env: DB_USER] [default: root]
    #[arg(short = 'U', long)]
    user: Option<String>,

    /// MySQL password [env: DB_PASSWORD]
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// Database (schema) to read tables from [env: DB_NAME]
    #[arg(short = 'd', long)]
    database: Option<String>,

    /// Comma-separated list of tables to include (default: all)
    #[arg(long, value_delimiter = ',')]
    tables: Option<Vec<String>>,

    /// Comma-separated list of tables to exclude
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Go package name (default: base name of the output directory)
    #[arg(long)]
    package: Option<String>,

    /// Overwrite existing files without asking
    #[arg(short, long)]
    force: bool,

    /// Emit column comments above struct fields
    #[arg(long)]
    comments: bool,

    /// Write generated code without running gofmt
    #[arg(long)]
    no_format: bool,

    /// gofmt binary to format generated code with
    #[arg(long, default_value = Gofmt::DEFAULT_BINARY, conflicts_with = "no_format")]
    gofmt: PathBuf,

    /// Path to .env file for connection config
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("sqlgen v{}", env!("CARGO_PKG_VERSION"));
    info!(
        output = ?cli.output,
        package = ?cli.package,
        force = ?cli.force,
        format = !cli.no_format,
        "Starting code generation"
    );

    let mut codegen_config = CodeGenConfig::new(cli.output)
        .with_force(cli.force)
        .with_comments(cli.comments);
    if let Some(package) = cli.package {
        codegen_config = codegen_config.with_package(package);
    }
    let generator = GoGenerator::new();
    generator
        .validate_config(&codegen_config)
        .context("Invalid code generation settings")?;
    debug!(codegen_config = ?codegen_config, "Code generation config");

    let formatter = if cli.no_format {
        warn!("Formatting disabled, generated code is written as rendered");
        None
    } else {
        let binary = which::which(&cli.gofmt).with_context(|| {
            format!(
                "{} not found; install Go or pass --no-format",
                cli.gofmt.display()
            )
        })?;
        debug!(binary = ?binary, "Using formatter");
        Some(Gofmt::with_binary(binary))
    };

    // Load configuration
    let overrides = ConnectionOverrides {
        host: cli.host,
        port: cli.port,
        database: cli.database,
        user: cli.user,
        password: cli.password,
    };
    let config = DbConfig::load(&cli.env_file, &overrides)
        .context("Failed to load database configuration")?;
    debug!(connection = ?config.redacted_connection_string(), "Loaded configuration");

    // Build table filter
    let filter = TableFilter {
        include: cli.tables,
        exclude: cli.exclude,
    };

    if !filter.is_empty() {
        debug!(filter = ?filter, "Table filter configured");
    }

    let mut introspector = connect(&config)?;

    let all_tables = introspector
        .list_tables(&config.database)
        .with_context(|| format!("Failed to list tables of '{}'", config.database))?;
    for missing in filter.missing(&all_tables) {
        warn!(table = ?missing, database = ?config.database, "Requested table not found");
    }

    let tables = filter.apply(all_tables);
    if tables.is_empty() {
        warn!("No tables found after filtering");
        return Ok(());
    }
    debug!(tables = ?tables, "Tables to generate");

    let mut pipeline = Pipeline::new(&generator, &codegen_config)
        .with_prompt(Box::new(TerminalPrompt::stdio()));
    if let Some(formatter) = &formatter {
        pipeline = pipeline.with_formatter(formatter);
    }

    let reports = pipeline.run(&mut *introspector, &config.database, &tables);

    let failed: Vec<_> = reports
        .iter()
        .filter(|report| report.is_failure())
        .map(|report| report.table.as_str())
        .collect();
    if !failed.is_empty() {
        warn!(tables = ?failed, "Some tables were not generated");
    }

    let summary = BatchSummary::from_reports(&reports);
    info!(
        generated = summary.generated,
        skipped = summary.skipped,
        failed = summary.failed,
        "Done"
    );

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG, when set, takes precedence over -v
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[cfg(feature = "mysql")]
fn connect(config: &DbConfig) -> Result<Box<dyn Introspector>> {
    let introspector = sqlgen::MysqlIntrospector::connect(config).with_context(|| {
        format!(
            "Failed to connect to MySQL at {}",
            config.redacted_connection_string()
        )
    })?;
    Ok(Box::new(introspector))
}

#[cfg(not(feature = "mysql"))]
fn connect(_config: &DbConfig) -> Result<Box<dyn Introspector>> {
    anyhow::bail!("MySQL support not enabled. Rebuild with --features mysql")
}
