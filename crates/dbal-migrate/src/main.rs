//! dbal CLI
//!
//! Command-line tool for planning and applying table definitions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dbal_core::schema::{diff, TableDefinition};
use dbal_core::{Database, DialectKind};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dbal_migrate::SqliteConnection;

/// Schema planning and migration for dbal table definitions.
#[derive(Parser)]
#[command(name = "dbal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (only SQLite can be opened).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database: String,

    /// Dialect used by `plan`.
    #[arg(long, default_value = "sqlite")]
    dialect: DialectKind,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the DDL that turns one definition into another, offline.
    Plan {
        /// Desired table definition (JSON).
        definition: PathBuf,

        /// Current table definition (JSON); the table is created if omitted.
        #[arg(short, long)]
        from: Option<PathBuf>,
    },

    /// Converge the live table to a definition.
    Apply {
        /// Desired table definition (JSON).
        definition: PathBuf,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop a table.
    Drop {
        /// Table name.
        table: String,

        /// Do nothing if the table is missing.
        #[arg(long)]
        if_exists: bool,
    },

    /// List tables.
    Tables,

    /// List the columns of a table.
    Columns {
        /// Table name.
        table: String,
    },
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

    match cli.command {
        Commands::Plan { definition, from } => {
            let after = read_definition(&definition)?;
            let before = from.as_deref().map(read_definition).transpose()?;
            let statements = diff(
                before.as_ref(),
                Some(&after),
                cli.dialect.schema_dialect(),
            )?;
            for sql in &statements {
                println!("{sql};");
            }
        }

        Commands::Apply {
            definition,
            dry_run,
        } => {
            let after = read_definition(&definition)?;
            let db = Database::new(SqliteConnection::connect(&cli.database)?);
            let schema = db.schema();
            let before = schema.table(&after.name)?;
            let statements = diff(
                before.as_ref(),
                Some(&after),
                db.dialect().schema_dialect(),
            )?;

            if statements.is_empty() {
                info!(table = %after.name, "Schema is up to date");
            } else if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
                for sql in &statements {
                    println!("{sql};");
                }
            } else {
                schema.run_commands(&after.name, &statements)?;
                info!(
                    table = %after.name,
                    statements = statements.len(),
                    "Definition applied"
                );
            }
        }

        Commands::Drop { table, if_exists } => {
            let db = Database::new(SqliteConnection::connect(&cli.database)?);
            if if_exists {
                db.schema().drop_table_if_exists(&table)?;
            } else {
                db.schema().drop_table(&table)?;
            }
            info!(table = %table, "Table dropped");
        }

        Commands::Tables => {
            let db = Database::new(SqliteConnection::connect(&cli.database)?);
            let tables = db.schema().list_table_names()?;
            if tables.is_empty() {
                info!("No tables found.");
            }
            for table in tables {
                println!("{table}");
            }
        }

        Commands::Columns { table } => {
            let db = Database::new(SqliteConnection::connect(&cli.database)?);
            let Some(definition) = db.schema().table(&table)? else {
                anyhow::bail!("table '{table}' does not exist");
            };
            println!("\nColumns of {table}:");
            println!("{:-<60}", "");
            for column in &definition.columns {
                println!(
                    " {:<24} {:<16} {}",
                    column.name,
                    db.dialect().schema_dialect().column_type(column)?,
                    if column.nullable { "NULL" } else { "NOT NULL" }
                );
            }
            println!();
        }
    }

    Ok(())
}

fn read_definition(path: &Path) -> anyhow::Result<TableDefinition> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
