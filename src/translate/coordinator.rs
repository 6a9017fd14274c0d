use chrono::Local;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::error::Result;
use crate::language::LanguageRegistry;
use super::orchestrator::Translator;
use super::types::{
    AggregatedResult, ArticlePayload, MultiStatus, MultiTranslation, TranslationOutcome,
    TranslationRecord,
};

/// Prefix of the text synthesized for a failed language. Contributions
/// containing it are left out of the aggregated output.
pub const FAILURE_MARKER: &str = "translation failed";

const FIELDS: [&str; 3] = ["title", "description", "content"];

/// Runs the orchestrator over several languages and aggregates the results.
pub struct Coordinator {
    translator: Translator,
    concurrency: usize,
}

impl Coordinator {
    /// `concurrency` bounds the languages in flight per request; 1 (or 0)
    /// processes them strictly in order.
    pub fn new(translator: Translator, concurrency: usize) -> Self {
        Self {
            translator,
            concurrency: concurrency.max(1),
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        self.translator.registry()
    }

    pub async fn translate_single(
        &self,
        article: &ArticlePayload,
        language_key: &str,
    ) -> Result<TranslationRecord> {
        self.translator.translate_one(article, language_key).await
    }

    /// Translate into every language, validating all keys before any call.
    pub async fn translate_batch(
        &self,
        article: &ArticlePayload,
        language_keys: &[String],
    ) -> Result<Vec<TranslationRecord>> {
        self.registry().ensure_supported(language_keys)?;
        info!(
            "Batch translation of news {} into {} languages",
            article.news_id,
            language_keys.len()
        );
        self.run_all(article, language_keys).await
    }

    /// Translate into every language and regroup by field and short code.
    pub async fn translate_multi(
        &self,
        article: &ArticlePayload,
        language_keys: &[String],
    ) -> Result<MultiTranslation> {
        self.registry().ensure_supported(language_keys)?;
        info!(
            "Multi translation of news {} into {:?}",
            article.news_id, language_keys
        );

        let records = self.run_all(article, language_keys).await?;
        let aggregation = aggregate(&records);
        let status = aggregation.status();

        if status != MultiStatus::Success {
            warn!(
                "Multi translation of news {} finished with {:?} (failed: {:?})",
                article.news_id, status, aggregation.failed_languages
            );
        }

        Ok(MultiTranslation {
            news_id: article.news_id.clone(),
            status,
            timestamp: Local::now(),
            data: aggregation.data,
            failed_languages: aggregation.failed_languages,
        })
    }

    async fn run_all(
        &self,
        article: &ArticlePayload,
        language_keys: &[String],
    ) -> Result<Vec<TranslationRecord>> {
        if self.concurrency == 1 || language_keys.len() < 2 {
            let mut records = Vec::with_capacity(language_keys.len());
            for key in language_keys {
                records.push(self.translator.translate_one(article, key).await?);
            }
            return Ok(records);
        }

        self.fan_out(article, language_keys).await
    }

    /// Bounded parallel variant; output keeps input order.
    async fn fan_out(
        &self,
        article: &ArticlePayload,
        language_keys: &[String],
    ) -> Result<Vec<TranslationRecord>> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let shared_article = Arc::new(article.clone());
        let mut tasks = JoinSet::new();

        for (index, key) in language_keys.iter().enumerate() {
            let translator = self.translator.clone();
            let semaphore = Arc::clone(&semaphore);
            let article = Arc::clone(&shared_article);
            let key = key.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, translator.translate_one(&article, &key).await)
            });
        }

        let mut slots: Vec<Option<TranslationRecord>> =
            (0..language_keys.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result?),
                Err(e) => warn!("Translation task aborted: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(language_keys)
            .map(|(slot, key)| match slot {
                Some(record) => Ok(record),
                None => {
                    let language = self.registry().lookup(key)?;
                    Ok(TranslationRecord::new(
                        article,
                        language,
                        TranslationOutcome::Failed {
                            error_message: "translation task aborted".to_string(),
                        },
                    ))
                }
            })
            .collect()
    }
}

/// Regrouped multi-language output plus failure bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub data: AggregatedResult,
    pub failed_languages: Vec<String>,
    pub inserted: usize,
}

impl Aggregation {
    pub fn has_error(&self) -> bool {
        !self.failed_languages.is_empty()
    }

    pub fn status(&self) -> MultiStatus {
        if self.inserted == 0 {
            MultiStatus::Error
        } else if self.has_error() {
            MultiStatus::PartialSuccess
        } else {
            MultiStatus::Success
        }
    }
}

/// `field_<short code>` → value triple for one record.
fn contribution(record: &TranslationRecord) -> Vec<(String, String)> {
    let code = &record.language_code;
    let values = match &record.outcome {
        TranslationOutcome::Structured {
            translated_title,
            translated_description,
            translated_content,
        } => [
            translated_title.clone(),
            translated_description.clone(),
            translated_content.clone(),
        ],
        TranslationOutcome::RawFallback { raw_text } => {
            [raw_text.clone(), raw_text.clone(), raw_text.clone()]
        }
        TranslationOutcome::Failed { error_message } => {
            let text = format!("{}: {}", FAILURE_MARKER, error_message);
            [text.clone(), text.clone(), text]
        }
    };

    FIELDS
        .iter()
        .zip(values)
        .map(|(field, value)| (format!("{}_{}", field, code), value))
        .collect()
}

/// Regroup per-language records into field → short code → text.
///
/// A contribution is inserted only when none of its values carries the
/// failure marker, so failed languages count towards `failed_languages`
/// but never appear in `data`.
pub fn aggregate(records: &[TranslationRecord]) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for record in records {
        if record.outcome.is_failed() {
            aggregation.failed_languages.push(record.target_language.clone());
        }

        let entries = contribution(record);
        if entries.iter().any(|(_, value)| value.contains(FAILURE_MARKER)) {
            continue;
        }

        for (key, value) in entries {
            if let Some((field, code)) = key.split_once('_') {
                aggregation.data.insert(field, code, value);
            }
        }
        aggregation.inserted += 1;
    }

    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewsglotError;
    use crate::language::LanguageDefinition;
    use crate::provider::{CompletionRequest, MockModelProvider, ModelProvider, ModelSettings};
    use async_trait::async_trait;
    use std::time::Duration;

    fn article() -> ArticlePayload {
        ArticlePayload {
            news_id: "2024-001".to_string(),
            title: "标题".to_string(),
            description: "描述".to_string(),
            content: "正文".to_string(),
        }
    }

    fn registry() -> Arc<LanguageRegistry> {
        let definitions = ["en", "ja", "vi", "zh_hk"]
            .iter()
            .map(|code| {
                LanguageDefinition::new(
                    code,
                    &code.to_uppercase(),
                    code,
                    &format!("{}|{{title}}|{{description}}|{{content}}", code),
                )
            })
            .collect();
        Arc::new(LanguageRegistry::from_definitions(definitions).unwrap())
    }

    fn language_of(request: &CompletionRequest) -> String {
        request.prompt.split('|').next().unwrap_or_default().to_string()
    }

    fn structured(code: &str) -> String {
        format!(
            "```json\n{{\"title\": \"T-{0}\", \"description\": \"D-{0}\", \"content\": \"C-{0}\"}}\n```",
            code
        )
    }

    /// Succeeds for every language except those listed in `failing`.
    fn provider(failing: &'static [&'static str]) -> MockModelProvider {
        let mut provider = MockModelProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider.expect_invoke().returning(move |request| {
            let code = language_of(request);
            if failing.contains(&code.as_str()) {
                Err(NewsglotError::Provider(format!("{} unavailable", code)))
            } else {
                Ok(structured(&code))
            }
        });
        provider
    }

    fn coordinator(provider: impl ModelProvider + 'static, concurrency: usize) -> Coordinator {
        let settings = ModelSettings {
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_tokens: 4000,
        };
        Coordinator::new(
            Translator::new(registry(), Arc::new(provider), settings),
            concurrency,
        )
    }

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_unsupported_keys_perform_zero_invocations() {
        let mut provider = MockModelProvider::new();
        provider.expect_invoke().times(0);
        let coordinator = coordinator(provider, 1);

        let batch = coordinator
            .translate_batch(&article(), &keys(&["en", "fr", "de"]))
            .await;
        match batch {
            Err(NewsglotError::UnsupportedLanguage { requested, supported }) => {
                assert_eq!(requested, vec!["fr", "de"]);
                assert_eq!(supported, vec!["en", "ja", "vi", "zh_hk"]);
            }
            other => panic!("unexpected: {:?}", other),
        }

        let multi = coordinator.translate_multi(&article(), &keys(&["xx"])).await;
        assert!(matches!(multi, Err(NewsglotError::UnsupportedLanguage { .. })));

        let single = coordinator.translate_single(&article(), "xx").await;
        assert!(matches!(single, Err(NewsglotError::UnsupportedLanguage { .. })));
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let coordinator = coordinator(provider(&["ja"]), 1);
        let records = coordinator
            .translate_batch(&article(), &keys(&["vi", "ja", "en"]))
            .await
            .unwrap();

        let statuses: Vec<_> = records
            .iter()
            .map(|r| (r.target_language.as_str(), r.status()))
            .collect();
        assert_eq!(
            statuses,
            vec![("vi", "success"), ("ja", "error"), ("en", "success")]
        );
    }

    #[tokio::test]
    async fn test_multi_partial_success_excludes_failed_language() {
        let coordinator = coordinator(provider(&["ja"]), 1);
        let result = coordinator
            .translate_multi(&article(), &keys(&["en", "ja"]))
            .await
            .unwrap();

        assert_eq!(result.status, MultiStatus::PartialSuccess);
        assert_eq!(result.failed_languages, vec!["ja"]);
        for field in [&result.data.title, &result.data.description, &result.data.content] {
            assert_eq!(field.len(), 1);
            assert!(field.contains_key("en"));
        }
        assert_eq!(result.data.title["en"], "T-en");
    }

    #[tokio::test]
    async fn test_multi_all_failed_is_error_with_empty_data() {
        let coordinator = coordinator(provider(&["en", "ja", "vi"]), 1);
        let result = coordinator
            .translate_multi(&article(), &keys(&["en", "ja", "vi"]))
            .await
            .unwrap();

        assert_eq!(result.status, MultiStatus::Error);
        assert!(result.data.is_empty());
        assert_eq!(result.failed_languages.len(), 3);
    }

    #[tokio::test]
    async fn test_multi_all_success_with_underscored_short_code() {
        let coordinator = coordinator(provider(&[]), 1);
        let result = coordinator
            .translate_multi(&article(), &keys(&["en", "ja", "zh_hk"]))
            .await
            .unwrap();

        assert_eq!(result.status, MultiStatus::Success);
        for field in [&result.data.title, &result.data.description, &result.data.content] {
            assert_eq!(field.len(), 3);
        }
        assert_eq!(result.data.content["zh_hk"], "C-zh_hk");
    }

    #[tokio::test]
    async fn test_multi_raw_fallback_fills_all_fields() {
        let mut provider = MockModelProvider::new();
        provider.expect_provider_name().return_const("mock");
        provider
            .expect_invoke()
            .returning(|_| Ok("plain answer".to_string()));
        let coordinator = coordinator(provider, 1);

        let result = coordinator
            .translate_multi(&article(), &keys(&["vi"]))
            .await
            .unwrap();
        assert_eq!(result.status, MultiStatus::Success);
        assert_eq!(result.data.title["vi"], "plain answer");
        assert_eq!(result.data.description["vi"], "plain answer");
        assert_eq!(result.data.content["vi"], "plain answer");
    }

    #[tokio::test]
    async fn test_empty_language_list_is_error() {
        let coordinator = coordinator(provider(&[]), 1);
        let result = coordinator.translate_multi(&article(), &[]).await.unwrap();
        assert_eq!(result.status, MultiStatus::Error);
    }

    #[tokio::test]
    async fn test_fan_out_preserves_input_order() {
        let coordinator = coordinator(provider(&["vi"]), 3);
        let order = keys(&["zh_hk", "vi", "en", "ja"]);
        let records = coordinator.translate_batch(&article(), &order).await.unwrap();

        let languages: Vec<_> = records.iter().map(|r| r.target_language.clone()).collect();
        assert_eq!(languages, order);
        assert_eq!(records[1].status(), "error");
        assert_eq!(records[3].status(), "success");
    }

    /// Panics while translating into one language, answers for the rest.
    struct PanickingProvider {
        panics_on: &'static str,
    }

    #[async_trait]
    impl ModelProvider for PanickingProvider {
        async fn invoke(&self, request: &CompletionRequest) -> crate::error::Result<String> {
            let code = language_of(request);
            if code == self.panics_on {
                panic!("model client crashed for {}", code);
            }
            Ok(structured(&code))
        }

        fn provider_name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_fan_out_panicking_task_fails_only_its_language() {
        let coordinator = coordinator(PanickingProvider { panics_on: "vi" }, 3);
        let result = coordinator
            .translate_multi(&article(), &keys(&["en", "vi", "ja"]))
            .await
            .unwrap();

        assert_eq!(result.status, MultiStatus::PartialSuccess);
        assert_eq!(result.failed_languages, vec!["vi"]);
        for field in [&result.data.title, &result.data.description, &result.data.content] {
            assert_eq!(field.keys().collect::<Vec<_>>(), vec!["en", "ja"]);
        }

        let records = coordinator
            .translate_batch(&article(), &keys(&["vi", "en"]))
            .await
            .unwrap();
        assert_eq!(
            records[0].outcome,
            TranslationOutcome::Failed {
                error_message: "translation task aborted".to_string()
            }
        );
        assert_eq!(records[1].status(), "success");
    }

    #[tokio::test]
    async fn test_single_is_repeatable() {
        let coordinator = coordinator(provider(&[]), 1);
        let first = coordinator.translate_single(&article(), "ja").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = coordinator.translate_single(&article(), "ja").await.unwrap();

        assert_eq!(first.outcome, second.outcome);
        assert!(first.timestamp < second.timestamp);
    }

    fn record(code: &str, outcome: TranslationOutcome) -> TranslationRecord {
        let language = LanguageDefinition::new(code, code, code, "{title}{description}{content}");
        TranslationRecord::new(&article(), &language, outcome)
    }

    #[test]
    fn test_marker_in_successful_text_excludes_contribution() {
        let records = vec![
            record(
                "en",
                TranslationOutcome::Structured {
                    translated_title: "Why the translation failed to land".to_string(),
                    translated_description: "d".to_string(),
                    translated_content: "c".to_string(),
                },
            ),
            record(
                "ja",
                TranslationOutcome::RawFallback {
                    raw_text: "raw".to_string(),
                },
            ),
        ];

        let aggregation = aggregate(&records);
        assert_eq!(aggregation.inserted, 1);
        assert!(!aggregation.has_error());
        assert_eq!(aggregation.status(), MultiStatus::Success);
        assert!(!aggregation.data.title.contains_key("en"));
    }

    #[test]
    fn test_contribution_keys() {
        let failed = record(
            "zh_hk",
            TranslationOutcome::Failed {
                error_message: "timeout".to_string(),
            },
        );
        let entries = contribution(&failed);
        assert_eq!(entries[0].0, "title_zh_hk");
        assert_eq!(entries[2].1, "translation failed: timeout");
    }
}
