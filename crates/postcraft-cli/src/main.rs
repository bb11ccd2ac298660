mod config;
mod post_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use postcraft_core::orchestrator::GenerationContext;
use postcraft_core::probe::KeyDisplay;
use postcraft_core::provider::config::{DEFAULT_MODEL, KNOWN_MODELS};
use postcraft_core::provider::{GeminiClient, GeminiConfig};
use postcraft_db::config::DbConfig;
use postcraft_db::pool;

use config::{CliOverrides, PostcraftConfig};

#[derive(Parser)]
#[command(name = "postcraft", about = "Generate platform-sized social media posts with an LLM")]
struct Cli {
    /// Database URL (overrides POSTCRAFT_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a postcraft config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Gemini API key (GEMINI_API_KEY still wins when set)
        #[arg(long)]
        api_key: Option<String>,
        /// Gemini model name
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the postcraft database (requires config file or env vars)
    DbInit,
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate posts for one topic across platforms
    Generate {
        /// Topic or idea to write about
        #[arg(long)]
        topic: String,
        /// Target platform (repeatable): twitter, linkedin, instagram, facebook
        #[arg(long = "platform", required = true)]
        platforms: Vec<String>,
        /// Tone: professional, casual, funny, engaging, inspiring
        #[arg(long, default_value = "professional")]
        tone: String,
        /// Attempt every platform and report each outcome
        #[arg(long)]
        report: bool,
    },
    /// List stored posts, newest first
    List,
    /// Delete a stored post
    Delete {
        /// Post ID to delete
        id: String,
    },
    /// Check that the configured API key and model work
    Probe,
}

/// Execute the `postcraft init` command: write config file.
fn cmd_init(db_url: &str, api_key: Option<&str>, model: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: Some(db_url.to_string()),
        },
        gemini: config::GeminiSection {
            api_key: api_key.map(str::to_string),
            model: Some(model.to_string()),
            base_url: None,
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  gemini.model = {model}");
    match api_key {
        Some(key) => {
            let prefix: String = key.chars().take(10).collect();
            println!("  gemini.api_key = {prefix}...");
        }
        None => println!("  gemini.api_key = (unset; export GEMINI_API_KEY)"),
    }
    if !KNOWN_MODELS.contains(&model) {
        println!();
        println!("Warning: {model} is not a known model ({}).", KNOWN_MODELS.join(", "));
    }
    println!();
    println!("Next: run `postcraft db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `postcraft db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &PostcraftConfig) -> anyhow::Result<()> {
    println!("Initializing postcraft database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    let count = postcraft_db::queries::posts::count_posts(&db_pool).await?;
    println!("Database ready. posts: {count} rows");

    db_pool.close().await;

    println!("postcraft db-init complete.");
    Ok(())
}

/// Build the generation client from resolved settings.
///
/// Fails before any database work when no API key is configured.
fn build_generator(resolved: &PostcraftConfig) -> anyhow::Result<(Arc<GeminiClient>, KeyDisplay)> {
    let gemini: GeminiConfig = resolved.gemini()?;
    tracing::info!(
        model = %gemini.model,
        api_key_length = gemini.key_len(),
        "gemini client configured"
    );
    let key = KeyDisplay::from(&gemini);
    Ok((Arc::new(GeminiClient::new(gemini)), key))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut overrides = CliOverrides {
        database_url: cli.database_url.clone(),
        ..CliOverrides::default()
    };

    match cli.command {
        Commands::Init {
            db_url,
            api_key,
            model,
            force,
        } => {
            cmd_init(&db_url, api_key.as_deref(), &model, force)?;
        }
        Commands::DbInit => {
            let resolved = PostcraftConfig::resolve(&overrides)?;
            cmd_db_init(&resolved).await?;
        }
        Commands::Serve { bind, port } => {
            overrides.bind = bind;
            overrides.port = port;
            let resolved = PostcraftConfig::resolve(&overrides)?;
            let (generator, key) = build_generator(&resolved)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let state = serve_cmd::AppState {
                ctx: GenerationContext::new(db_pool.clone(), generator),
                key,
            };
            let result = serve_cmd::run_serve(state, &resolved.server).await;
            db_pool.close().await;
            result?;
        }
        Commands::Generate {
            topic,
            platforms,
            tone,
            report,
        } => {
            let resolved = PostcraftConfig::resolve(&overrides)?;
            let (generator, _key) = build_generator(&resolved)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let ctx = GenerationContext::new(db_pool.clone(), generator);
            let result = post_cmds::run_generate(&ctx, &topic, &platforms, &tone, report).await;
            db_pool.close().await;
            result?;
        }
        Commands::List => {
            let resolved = PostcraftConfig::resolve(&overrides)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = post_cmds::run_list(&db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Delete { id } => {
            let resolved = PostcraftConfig::resolve(&overrides)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = post_cmds::run_delete(&db_pool, &id).await;
            db_pool.close().await;
            result?;
        }
        Commands::Probe => {
            let resolved = PostcraftConfig::resolve(&overrides)?;
            let (generator, key) = build_generator(&resolved)?;
            post_cmds::run_probe(generator.as_ref(), key).await?;
        }
    }

    Ok(())
}
