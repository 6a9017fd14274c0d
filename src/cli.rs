use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP translation service
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the supported target languages
    Languages,

    /// Translate an article file and print the JSON result
    Translate {
        /// Article file: a JSON object, an array of objects, or one object
        /// per line, each with news_id, title, description and content
        #[arg(short, long)]
        input: PathBuf,

        /// Target languages (comma-separated)
        #[arg(short, long)]
        target_langs: String,

        /// Output shape
        #[arg(short, long, value_enum, default_value = "multi")]
        mode: TranslateMode,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "newsglot.toml")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TranslateMode {
    /// One record for the first language only
    Single,
    /// One record per language
    Batch,
    /// Field → language code → text
    Multi,
}

/// Split a comma-separated language list, dropping empty items.
pub fn split_languages(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
