use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{NewsglotError, Result};
use crate::language::LanguageRegistry;
use crate::parse;
use crate::prompt;
use crate::provider::{ModelProvider, ModelSettings};
use super::types::{ArticlePayload, TranslationOutcome, TranslationRecord};

/// Drives render → invoke → parse for one (article, language) pair.
#[derive(Clone)]
pub struct Translator {
    registry: Arc<LanguageRegistry>,
    provider: Arc<dyn ModelProvider>,
    settings: ModelSettings,
}

impl Translator {
    pub fn new(
        registry: Arc<LanguageRegistry>,
        provider: Arc<dyn ModelProvider>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            registry,
            provider,
            settings,
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Translate `article` into the language registered under `language_key`.
    ///
    /// Provider and parse failures are folded into the returned record;
    /// only an unknown language key is reported as an error.
    pub async fn translate_one(
        &self,
        article: &ArticlePayload,
        language_key: &str,
    ) -> Result<TranslationRecord> {
        let language = self.registry.lookup(language_key)?;

        let prompt = prompt::render(
            &language.prompt_template,
            &article.title,
            &article.description,
            &article.content,
        );
        let request = self.settings.request(prompt);

        debug!(
            "Invoking {} for news {} -> {}",
            self.provider.provider_name(),
            article.news_id,
            language.key
        );

        let outcome = match self.provider.invoke(&request).await {
            Ok(raw_text) => {
                let outcome = TranslationOutcome::from(parse::parse(&raw_text));
                info!(
                    "Translated news {} to {} ({})",
                    article.news_id,
                    language.key,
                    outcome.status()
                );
                outcome
            }
            Err(e) => {
                error!(
                    "Translation failed - news id: {}, target language: {}, error: {}",
                    article.news_id, language.key, e
                );
                TranslationOutcome::Failed {
                    error_message: failure_message(e),
                }
            }
        };

        Ok(TranslationRecord::new(article, language, outcome))
    }
}

fn failure_message(error: NewsglotError) -> String {
    match error {
        NewsglotError::Provider(message) => message,
        other => other.to_string(),
    }
}
