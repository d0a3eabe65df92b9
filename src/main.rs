use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use thematic::config::Config;
use thematic::pipeline::{PipelineContext, PipelineError};

/// Thematic: rank companies against investment themes.
///
/// Embeds a list of themes and a directory of company profiles, keeps each
/// company's most similar themes, and serves the result over a small HTTP API.
#[derive(Parser)]
#[command(name = "thematic", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Download the ONNX sentence embedding model (~90 MB)
    DownloadModel,

    /// Parse themes and companies, rank them, and write the dataset
    Process {
        /// Themes kept per company (overrides THEMATIC_TOP_N)
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Load the ranked dataset and serve the read-only API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },

    /// Show system status (DB stats, pipeline artifacts, model files)
    Status,
}

impl Commands {
    /// File name used when THEMATIC_LOG_DIR is set.
    fn log_file_name(&self) -> &'static str {
        match self {
            Commands::Process { .. } => "data-pipeline.log",
            #[cfg(feature = "web")]
            Commands::Serve { .. } => "web-api.log",
            _ => "thematic.log",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    init_logging(config.log_dir.as_deref(), cli.command.log_file_name())?;

    match cli.command {
        Commands::Init => {
            info!("Initializing Thematic database...");
            let db = thematic::db::initialize_shared(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nThematic is ready. Next steps:");
            println!("  thematic download-model");
            println!("  thematic process");
        }

        Commands::DownloadModel => {
            let model_dir = &config.model_dir;

            println!("Downloading ONNX models...");
            println!("  Destination: {}", model_dir.display());

            thematic::embeddings::download::download_model(model_dir).await?;

            println!("\n{}", "Models downloaded successfully.".bold());
            println!("You can now run `thematic process`.");
        }

        Commands::Process { top_n } => {
            if let Some(top_n) = top_n {
                if top_n == 0 {
                    anyhow::bail!("--top-n must be at least 1");
                }
                config.top_n = top_n;
            }
            config.require_model()?;

            let embedder =
                thematic::embeddings::onnx::SentenceEmbedder::load(&config.embedding_dir())?;
            let ctx = PipelineContext::from_config(&config, &embedder);

            match thematic::pipeline::process::run(&ctx).await {
                Ok(summary) => {
                    thematic::output::terminal::display_pipeline_summary(&summary);
                }
                Err(e) => {
                    if let Some(fatal) = e.downcast_ref::<PipelineError>() {
                        error!("{fatal}");
                        std::process::exit(1);
                    }
                    return Err(e);
                }
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let theme_names =
                thematic::output::theme_names::load_theme_names(&config.theme_names_path())?;
            let dataset = thematic::output::dataset::load_dataset(&config.dataset_path())?;

            let db = thematic::db::initialize_shared(&config.db_path)?;
            let stored = db
                .replace_dataset(&dataset)
                .await
                .context("Failed to load the ranked dataset into the database")?;
            info!(
                companies = stored,
                themes = theme_names.len(),
                "Loaded ranked dataset into {}",
                config.db_path
            );

            let state = thematic::web::AppState::new(db, theme_names);
            thematic::web::run_server(state, port, &bind).await?;
        }

        Commands::Status => {
            let db = if Path::new(&config.db_path).exists() {
                Some(thematic::db::open_shared(&config.db_path)?)
            } else {
                None
            };
            thematic::status::show(&config, db.as_deref()).await?;
        }
    }

    Ok(())
}

/// Structured logging to stderr, plus a plain-text copy under `log_dir`
/// when one is configured.
fn init_logging(log_dir: Option<&Path>, file_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("thematic=info"));

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let path = dir.join(file_name);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}
