use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

/// First ```json fenced block holding a JSON object, matched lazily.
static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("fenced JSON pattern is valid")
});

/// The three translated fields extracted from a model answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedFields {
    pub title: String,
    pub description: String,
    pub content: String,
}

/// Result of interpreting raw model output. Malformed output is an
/// expected outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    Structured(TranslatedFields),
    RawFallback(String),
}

pub fn parse(raw_text: &str) -> ParsedResponse {
    match extract_fields(raw_text) {
        Some(fields) => ParsedResponse::Structured(fields),
        None => ParsedResponse::RawFallback(raw_text.to_string()),
    }
}

fn extract_fields(raw_text: &str) -> Option<TranslatedFields> {
    let Some(captures) = FENCED_JSON.captures(raw_text) else {
        debug!("No fenced JSON block in model response");
        return None;
    };

    let block = captures.get(1)?.as_str();
    let object = match serde_json::from_str::<Value>(block) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            debug!("Fenced block is JSON but not an object");
            return None;
        }
        Err(e) => {
            debug!("Fenced block is not valid JSON: {}", e);
            return None;
        }
    };

    let field = |name: &str| match object.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };

    Some(TranslatedFields {
        title: field("title"),
        description: field("description"),
        content: field("content"),
    })
}
