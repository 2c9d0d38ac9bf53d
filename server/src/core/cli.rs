use clap::{Parser, Subcommand};

use std::path::PathBuf;

use crate::data::query::IdentifierKind;

use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_ID_FIELD, ENV_ID_KIND, ENV_MAX_COLUMNS, ENV_MAX_PAGE_SIZE, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about = "Generic-condition query compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Maximum page size (values below 10 are raised to 10)
    #[arg(long, global = true, env = ENV_MAX_PAGE_SIZE)]
    pub max_page_size: Option<i64>,

    /// Maximum number of filter columns per request
    #[arg(long, global = true, env = ENV_MAX_COLUMNS)]
    pub max_columns: Option<usize>,

    /// Identifier field name of the target store
    #[arg(long, global = true, env = ENV_ID_FIELD)]
    pub id_field: Option<String>,

    /// Identifier type of the target store (objectid or uuid)
    #[arg(long, global = true, env = ENV_ID_KIND, value_parser = parse_id_kind)]
    pub id_kind: Option<IdentifierKind>,
}

/// Parse identifier kind from CLI/env string
fn parse_id_kind(s: &str) -> Result<IdentifierKind, String> {
    match s.to_lowercase().as_str() {
        "objectid" | "oid" => Ok(IdentifierKind::ObjectId),
        "uuid" => Ok(IdentifierKind::Uuid),
        _ => Err(format!(
            "Invalid identifier kind '{}'. Valid options: objectid, uuid",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Compile a search request read from a file (or stdin) and print the query
    Compile {
        /// JSON request file; reads stdin when omitted
        input: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub max_page_size: Option<i64>,
    pub max_columns: Option<usize>,
    pub id_field: Option<String>,
    pub id_kind: Option<IdentifierKind>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        max_page_size: cli.max_page_size,
        max_columns: cli.max_columns,
        id_field: cli.id_field,
        id_kind: cli.id_kind,
    };
    (config, cli.command)
}
