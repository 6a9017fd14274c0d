// Language registry
//
// Maps a target-language key to its display name, short code and prompt
// template. Built once at startup and shared read-only afterwards.

pub mod prompts;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::config::LanguageEntry;
use crate::error::{NewsglotError, Result};
use crate::prompt::PLACEHOLDERS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDefinition {
    /// Identifier callers use to select the language
    pub key: String,
    /// Human readable name
    pub display_name: String,
    /// Suffix used to key aggregated multi-language output
    pub short_code: String,
    /// Prompt with `{title}`, `{description}` and `{content}` placeholders
    pub prompt_template: String,
}

impl LanguageDefinition {
    pub fn new(key: &str, display_name: &str, short_code: &str, prompt_template: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            short_code: short_code.to_string(),
            prompt_template: prompt_template.to_string(),
        }
    }

    /// Reject definitions that cannot be rendered into a usable prompt.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(NewsglotError::InvalidLanguageDefinition(
                "language key is empty".to_string(),
            ));
        }
        if self.short_code.trim().is_empty() {
            return Err(NewsglotError::InvalidLanguageDefinition(format!(
                "language '{}' has an empty short code",
                self.key
            )));
        }

        let missing: Vec<&str> = PLACEHOLDERS
            .iter()
            .copied()
            .filter(|placeholder| !self.prompt_template.contains(placeholder))
            .collect();

        if !missing.is_empty() {
            return Err(NewsglotError::InvalidLanguageDefinition(format!(
                "prompt template for '{}' lacks placeholders: {}",
                self.key,
                missing.join(", ")
            )));
        }

        Ok(())
    }
}

impl From<&LanguageEntry> for LanguageDefinition {
    fn from(entry: &LanguageEntry) -> Self {
        Self::new(&entry.key, &entry.name, &entry.code, &entry.prompt_template)
    }
}

/// Ordered, validated set of target languages.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    definitions: Vec<LanguageDefinition>,
    index: HashMap<String, usize>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The languages shipped with the service.
    pub fn builtin() -> Result<Self> {
        Self::from_definitions(vec![
            LanguageDefinition::new("tw", "Traditional Chinese (Taiwan)", "tw", prompts::TRADITIONAL_TW),
            LanguageDefinition::new("zh_hk", "Traditional Chinese (Hong Kong)", "zh_hk", prompts::TRADITIONAL_HK),
            LanguageDefinition::new("vi", "Vietnamese", "vi", prompts::VIETNAMESE),
            LanguageDefinition::new("ja", "Japanese", "ja", prompts::JAPANESE),
            LanguageDefinition::new("en", "English", "en", prompts::ENGLISH),
            LanguageDefinition::new("hi", "Hindi", "hi", prompts::HINDI),
        ])
    }

    /// Built-in languages overlaid with entries from the config file.
    pub fn with_entries(entries: &[LanguageEntry]) -> Result<Self> {
        let mut registry = Self::builtin()?;
        for entry in entries {
            registry.register(entry.into())?;
        }
        Ok(registry)
    }

    pub fn from_definitions(definitions: Vec<LanguageDefinition>) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Add a definition, replacing an existing one with the same key in place.
    pub fn register(&mut self, definition: LanguageDefinition) -> Result<()> {
        definition.validate()?;

        match self.index.get(&definition.key) {
            Some(&position) => {
                debug!("Overriding language definition '{}'", definition.key);
                self.definitions[position] = definition;
            }
            None => {
                self.index
                    .insert(definition.key.clone(), self.definitions.len());
                self.definitions.push(definition);
            }
        }
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Result<&LanguageDefinition> {
        self.get(key).ok_or_else(|| NewsglotError::UnsupportedLanguage {
            requested: vec![key.to_string()],
            supported: self.keys(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&LanguageDefinition> {
        self.index.get(key).map(|&position| &self.definitions[position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Fail with every unknown key at once, or succeed if all resolve.
    pub fn ensure_supported<S: AsRef<str>>(&self, keys: &[S]) -> Result<()> {
        let unsupported: Vec<String> = keys
            .iter()
            .map(|key| key.as_ref())
            .filter(|key| !self.contains(key))
            .map(str::to_string)
            .collect();

        if unsupported.is_empty() {
            Ok(())
        } else {
            Err(NewsglotError::UnsupportedLanguage {
                requested: unsupported,
                supported: self.keys(),
            })
        }
    }

    /// Definitions in registration order.
    pub fn list_all(&self) -> impl Iterator<Item = &LanguageDefinition> {
        self.definitions.iter()
    }

    pub fn keys(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// `{key: {name, code}}` view, keeping registration order.
    pub fn listing(&self) -> LanguageListing<'_> {
        LanguageListing(self)
    }
}

pub struct LanguageListing<'a>(&'a LanguageRegistry);

#[derive(Serialize)]
struct ListingEntry<'a> {
    name: &'a str,
    code: &'a str,
}

impl Serialize for LanguageListing<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for definition in self.0.list_all() {
            map.serialize_entry(
                &definition.key,
                &ListingEntry {
                    name: &definition.display_name,
                    code: &definition.short_code,
                },
            )?;
        }
        map.end()
    }
}
