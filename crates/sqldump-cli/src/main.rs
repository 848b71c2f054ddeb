//! sqldump CLI - export MySQL/MariaDB databases as SQL statements.

use clap::{Parser, Subcommand};
use sqldump::{Config, DumpError, Dumper, WriterSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sqldump")]
#[command(about = "Export MySQL/MariaDB schemas and rows as SQL statements")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result (to stderr when SQL goes to stdout)
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump schemas and rows as SQL statements
    Dump {
        /// Dump only this database
        #[arg(long)]
        database: Option<String>,

        /// Dump only these tables (repeatable, glob patterns allowed)
        #[arg(long = "table")]
        tables: Vec<String>,

        /// Skip CREATE TABLE statements
        #[arg(long)]
        no_ddl: bool,

        /// Write statements to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the CREATE TABLE statement of one table
    Schema {
        /// Table name
        #[arg(long)]
        table: String,

        /// Database name [default: source.database]
        #[arg(long)]
        database: Option<String>,
    },

    /// List databases visible to the configured user
    ListDatabases,

    /// Test the source database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DumpError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    // Config is loaded before any connection is attempted.
    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Dump {
            database,
            tables,
            no_ddl,
            output,
        } => {
            if let Some(db) = database {
                config.dump.databases = vec![db];
                config.dump.all_databases = false;
            }
            if !tables.is_empty() {
                config.dump.include_tables = tables;
            }
            if no_ddl {
                config.dump.include_ddl = false;
            }
            if output.is_some() {
                config.dump.output = output;
            }
            config.validate()?;

            let output = config.dump.output.clone();
            let writer: Box<dyn Write + Send> = match &output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(BufWriter::new(std::io::stdout())),
            };
            let mut sink = WriterSink::new(writer);

            let dumper = Dumper::new(config).await?;
            let outcome = dumper.run(&mut sink).await;
            dumper.close().await;
            let result = outcome?;

            if let Some(path) = &output {
                info!("Wrote {} statements to {:?}", sink.statements(), path);
            }

            if cli.output_json {
                let json = result.to_json()?;
                if output.is_some() {
                    println!("{}", json);
                } else {
                    eprintln!("{}", json);
                }
            }
        }

        Commands::Schema { table, database } => {
            let database = database
                .or_else(|| config.explicit_databases().into_iter().find(|d| !d.is_empty()))
                .ok_or_else(|| {
                    DumpError::Config("no database given: pass --database".to_string())
                })?;

            let dumper = Dumper::new(config).await?;
            let ddl = dumper.table_ddl(&database, &table).await;
            dumper.close().await;
            println!("{}", ddl?);
        }

        Commands::ListDatabases => {
            let dumper = Dumper::new(config).await?;
            let databases = dumper.list_databases().await;
            dumper.close().await;
            let databases = databases?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&databases)?);
            } else {
                for db in databases {
                    println!("{}", db);
                }
            }
        }

        Commands::HealthCheck => {
            let dumper = Dumper::new(config).await?;
            let result = dumper.health_check().await?;
            dumper.close().await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source ({}): {} ({}ms)",
                    result.db_type,
                    if result.connected { "OK" } else { "FAILED" },
                    result.latency_ms
                );
                if let Some(ref err) = result.error {
                    println!("    Error: {}", err);
                }
            }

            if !result.connected {
                return Err(DumpError::connection(
                    result.error.unwrap_or_default(),
                    "health check",
                ));
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only SQL and results.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
