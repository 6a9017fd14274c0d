//! Newsglot - LLM News Translation Service
//!
//! Entry point: loads configuration, sets up logging and dispatches the
//! CLI subcommand (HTTP service, language listing, one-off translation).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use newsglot::cli::{split_languages, Args, Commands, TranslateMode};
use newsglot::config::{Config, LoggingConfig};
use newsglot::language::LanguageRegistry;
use newsglot::provider::{ModelProvider, ModelSettings, OpenAiProvider};
use newsglot::server;
use newsglot::translate::{ArticlePayload, Coordinator, MultiStatus, Translator};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Environment first, so .env values take part in the overrides
    let _ = dotenvy::dotenv();

    let mut config = load_config(args.config.as_deref())?;
    config.apply_env_overrides()?;

    // Keep the guard alive so buffered log lines reach the file
    let _log_guard = setup_logging(&config.logging, args.verbose)?;

    // Invalid language definitions are fatal at startup
    let registry = Arc::new(
        LanguageRegistry::with_entries(&config.languages)
            .context("Failed to build language registry")?,
    );
    info!("Loaded {} target languages", registry.len());

    match args.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let coordinator = build_coordinator(&config, registry)?;

            info!("Starting Newsglot translation service");
            server::serve(coordinator, &host, port).await?;
        }
        Commands::Languages => {
            println!("\nSupported Languages:");
            println!("{:<10} {:<10} {:<40}", "Key", "Code", "Name");
            println!("{}", "-".repeat(60));
            for language in registry.list_all() {
                println!(
                    "{:<10} {:<10} {:<40}",
                    language.key, language.short_code, language.display_name
                );
            }
            println!("\nTotal: {}", registry.len());
        }
        Commands::Translate {
            input,
            target_langs,
            mode,
        } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read article file {}", input.display()))?;
            let articles = ArticlePayload::parse_many(&content)
                .with_context(|| format!("{} does not contain valid articles", input.display()))?;
            if articles.is_empty() {
                anyhow::bail!("No articles found in {}", input.display());
            }
            let languages = split_languages(&target_langs);
            let coordinator = build_coordinator(&config, registry)?;

            info!(
                "Translating {} article(s) into {:?}",
                articles.len(),
                languages
            );

            let mut outputs = Vec::with_capacity(articles.len());
            let mut failed_articles = 0;
            for article in &articles {
                info!("Translating news {}", article.news_id);
                let output = match mode {
                    TranslateMode::Single => {
                        let language = languages
                            .first()
                            .context("At least one target language is required")?;
                        let record = coordinator.translate_single(article, language).await?;
                        if record.outcome.is_failed() {
                            failed_articles += 1;
                        }
                        serde_json::to_value(&record)?
                    }
                    TranslateMode::Batch => {
                        let records = coordinator.translate_batch(article, &languages).await?;
                        serde_json::to_value(&records)?
                    }
                    TranslateMode::Multi => {
                        let result = coordinator.translate_multi(article, &languages).await?;
                        if result.status == MultiStatus::Error {
                            warn!(
                                "Translation failed for every language of news {}: {:?}",
                                article.news_id, result.failed_languages
                            );
                            failed_articles += 1;
                        }
                        serde_json::to_value(&result)?
                    }
                };
                outputs.push(output);
            }

            let printed = match outputs.len() {
                1 => outputs.remove(0),
                _ => serde_json::Value::Array(outputs),
            };
            println!("{}", serde_json::to_string_pretty(&printed)?);

            if failed_articles == articles.len() {
                anyhow::bail!("Translation failed for all {} article(s)", failed_articles);
            }
            info!(
                "Translated {} of {} article(s)",
                articles.len() - failed_articles,
                articles.len()
            );
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

/// Explicit path, then ./newsglot.toml, then built-in defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(config_path) => Ok(Config::from_file(config_path)?),
        None => {
            if Path::new("newsglot.toml").exists() {
                Ok(Config::from_file("newsglot.toml")?)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn build_coordinator(config: &Config, registry: Arc<LanguageRegistry>) -> Result<Arc<Coordinator>> {
    let provider: Arc<dyn ModelProvider> = Arc::new(OpenAiProvider::new(&config.provider)?);
    info!(
        "Using {} model {} (temperature {}, max tokens {}, timeout {}s)",
        provider.provider_name(),
        config.provider.model,
        config.provider.temperature,
        config.provider.max_tokens,
        config.provider.timeout_secs
    );

    let translator = Translator::new(registry, provider, ModelSettings::from(&config.provider));
    Ok(Arc::new(Coordinator::new(translator, config.server.concurrency)))
}

/// Setup logging to both console and file
fn setup_logging(logging: &LoggingConfig, verbose: bool) -> Result<WorkerGuard> {
    let log_dir = Path::new(&logging.directory);
    std::fs::create_dir_all(log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(log_dir, "newsglot.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Determine log level
    let log_level = if verbose {
        Level::DEBUG
    } else {
        logging
            .level
            .parse::<Level>()
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", logging.level, e))?
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - level: {}, file: {}",
        log_level,
        log_dir.join("newsglot.log").display()
    );

    Ok(guard)
}
