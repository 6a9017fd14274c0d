use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::language::LanguageDefinition;
use crate::parse::ParsedResponse;

/// One news article to translate; lives for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePayload {
    pub news_id: String,
    pub title: String,
    pub description: String,
    pub content: String,
}

impl ArticlePayload {
    /// Read articles from a JSON array, a single JSON object, or a stream
    /// of objects (one per line).
    pub fn parse_many(text: &str) -> Result<Vec<Self>> {
        if text.trim_start().starts_with('[') {
            return Ok(serde_json::from_str(text)?);
        }

        let mut articles = Vec::new();
        for article in serde_json::Deserializer::from_str(text).into_iter::<Self>() {
            articles.push(article?);
        }
        Ok(articles)
    }
}

/// How a single (article, language) translation ended.
///
/// Serialized with a `status` discriminator: `success`, `success_raw` or
/// `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum TranslationOutcome {
    /// The model answered with a parseable JSON block
    #[serde(rename = "success")]
    Structured {
        translated_title: String,
        translated_description: String,
        translated_content: String,
    },
    /// The model answered, but not with usable JSON
    #[serde(rename = "success_raw")]
    RawFallback {
        #[serde(rename = "raw_translation")]
        raw_text: String,
    },
    /// The invocation itself failed
    #[serde(rename = "error")]
    Failed {
        #[serde(rename = "error")]
        error_message: String,
    },
}

impl TranslationOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Structured { .. } => "success",
            Self::RawFallback { .. } => "success_raw",
            Self::Failed { .. } => "error",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<ParsedResponse> for TranslationOutcome {
    fn from(parsed: ParsedResponse) -> Self {
        match parsed {
            ParsedResponse::Structured(fields) => Self::Structured {
                translated_title: fields.title,
                translated_description: fields.description,
                translated_content: fields.content,
            },
            ParsedResponse::RawFallback(raw_text) => Self::RawFallback { raw_text },
        }
    }
}

/// Result of translating one article into one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRecord {
    pub news_id: String,
    pub target_language: String,
    pub language_name: String,
    pub language_code: String,
    pub original_title: String,
    pub original_description: String,
    pub original_content: String,
    pub timestamp: DateTime<Local>,
    #[serde(flatten)]
    pub outcome: TranslationOutcome,
}

impl TranslationRecord {
    pub fn new(
        article: &ArticlePayload,
        language: &LanguageDefinition,
        outcome: TranslationOutcome,
    ) -> Self {
        Self {
            news_id: article.news_id.clone(),
            target_language: language.key.clone(),
            language_name: language.display_name.clone(),
            language_code: language.short_code.clone(),
            original_title: article.title.clone(),
            original_description: article.description.clone(),
            original_content: article.content.clone(),
            timestamp: Local::now(),
            outcome,
        }
    }

    pub fn status(&self) -> &'static str {
        self.outcome.status()
    }
}

/// Overall result of a multi-language request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiStatus {
    Success,
    PartialSuccess,
    Error,
}

/// Translated text per field, keyed by language short code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedResult {
    pub title: BTreeMap<String, String>,
    pub description: BTreeMap<String, String>,
    pub content: BTreeMap<String, String>,
}

impl AggregatedResult {
    /// Store `value` under `field`/`short_code`. Returns false for an
    /// unknown field name.
    pub fn insert(&mut self, field: &str, short_code: &str, value: String) -> bool {
        let target = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "content" => &mut self.content,
            _ => return false,
        };
        target.insert(short_code.to_string(), value);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.content.is_empty()
    }
}

/// Response of the multi-language operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiTranslation {
    pub news_id: String,
    pub status: MultiStatus,
    pub timestamp: DateTime<Local>,
    pub data: AggregatedResult,
    /// Languages that ended in a failed invocation
    #[serde(skip)]
    pub failed_languages: Vec<String>,
}
