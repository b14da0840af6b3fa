//! oxide-query CLI
//!
//! Parses and checks queries against a JSON schema document.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use oxide_query::{Database, SqlQuery, parse_sql};

/// Schema-aware SQL parsing and validation.
#[derive(Parser)]
#[command(name = "oxide-query")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON schema document.
    #[arg(short, long, env = "OXIDE_QUERY_SCHEMA")]
    schema: PathBuf,

    /// Output format for parsed queries.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print its AST.
    Parse {
        /// The query text, or `-` to read it from stdin.
        sql: String,
    },

    /// Check that every query is valid against the schema.
    Check {
        /// Query texts; `-` reads one from stdin.
        #[arg(required = true)]
        sql: Vec<String>,
    },

    /// List the declared tables and their columns.
    Tables,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Serialized AST.
    Json,
    /// Rust debug representation of the AST.
    Debug,
    /// Canonical SQL text.
    Sql,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let database = load_schema(&cli.schema)?;

    match cli.command {
        Commands::Parse { sql } => {
            let sql = read_query(&sql)?;
            let query = parse_sql(&database, &sql)?;
            println!("{}", render(&query, cli.format)?);
        }

        Commands::Check { sql } => {
            let mut failures = 0_usize;
            for text in &sql {
                let text = read_query(text)?;
                match parse_sql(&database, &text) {
                    Ok(query) => info!("ok: {query}"),
                    Err(e) => {
                        failures += 1;
                        error!("{}: {e}", text.trim());
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} of {} queries failed", sql.len());
            }
        }

        Commands::Tables => {
            for table in database.tables() {
                let primary_key = table.primary_key().columns();
                println!("{}", table.name());
                for column in table.columns().iter() {
                    let key = if primary_key.contains(&column.name.as_str()) {
                        " PRIMARY KEY"
                    } else {
                        ""
                    };
                    let null = if column.def.nullable { "" } else { " NOT NULL" };
                    println!("  {} {}{null}{key}", column.name, column.def.data_type);
                }
            }
            for fk in database.foreign_keys() {
                println!(
                    "{}.{} -> {}.{}",
                    fk.left_table, fk.left_column, fk.right_table, fk.right_column
                );
            }
        }
    }

    Ok(())
}

fn load_schema(path: &Path) -> anyhow::Result<Database> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let database: Database = serde_json::from_str(&text)
        .with_context(|| format!("invalid schema {}", path.display()))?;
    debug!(
        path = %path.display(),
        tables = database.tables().count(),
        "schema loaded"
    );
    Ok(database)
}

fn read_query(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read query from stdin")?;
    Ok(text)
}

fn render(query: &SqlQuery, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(query)?,
        Format::Debug => format!("{query:#?}"),
        Format::Sql => query.to_string(),
    })
}
