//! Newsglot - LLM News Translation Service
//!
//! Forwards news articles to a language model with a language-specific
//! prompt, parses the fenced JSON answer and republishes it per language,
//! as a batch, or regrouped by field and language code.

pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod prompt;
pub mod provider;
pub mod parse;
pub mod translate;
pub mod server;
