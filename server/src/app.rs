//! Core application

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::pagination;
use crate::data::search::{SearchRequest, SearchService};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub search: Arc<SearchService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;

        match command {
            Some(Commands::Compile { input, pretty }) => {
                app.compile_command(input.as_deref(), pretty)
            }
            Some(Commands::Start) | None => Self::start_server(app).await,
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        Ok(Self::from_config(config))
    }

    /// Build the application from an already-loaded configuration
    pub fn from_config(config: AppConfig) -> Self {
        pagination::set_max_page_size(config.query.max_page_size);
        let search = Arc::new(SearchService::from_config(&config.query));
        Self {
            shutdown: ShutdownService::new(),
            config,
            search,
        }
    }

    fn compile_command(&self, input: Option<&Path>, pretty: bool) -> Result<()> {
        let raw = match input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read request file: {}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read request from stdin")?;
                buf
            }
        };
        println!("{}", self.compile_request(&raw, pretty)?);
        Ok(())
    }

    /// Compile a JSON search request into its rendered query document
    pub fn compile_request(&self, raw: &str, pretty: bool) -> Result<String> {
        let request: SearchRequest =
            serde_json::from_str(raw).context("Failed to parse search request")?;
        let compiled = self
            .search
            .compile(&request)
            .context("Failed to compile search request")?;
        let document = compiled.to_document();
        let rendered = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(rendered)
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.config.query,
        );

        ApiServer::new(app).start().await?;
        tracing::debug!("Shutdown complete");

        Ok(())
    }
}
