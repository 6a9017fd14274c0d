// Translation pipeline
//
// - types: article, per-language record and aggregated output shapes
// - orchestrator: render → invoke → parse for one language
// - coordinator: single, batch and multi operations over many languages

pub mod types;
pub mod orchestrator;
pub mod coordinator;

pub use types::*;
pub use orchestrator::Translator;
pub use coordinator::{aggregate, Aggregation, Coordinator, FAILURE_MARKER};
