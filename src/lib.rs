//! Fund Q&A Assistant
//!
//! Answers plain-English questions about fund holdings and trades:
//! - Ranks each question against a fixed set of intents (zero-shot or keyword)
//! - Lets keyword overrides preempt the ranked intent
//! - Answers with deterministic aggregations over read-only tables
//! - Records every resolution against a fingerprint of the data snapshot
//!
//! FLOW:
//! QUESTION → CLASSIFY → DECIDE → AGGREGATE → ANSWER

pub mod audit;
pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod resolver;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{IntentClassifier, KeywordClassifier, MockClassifier, ZeroShotClient};
pub use data::DataStore;
pub use resolver::{AnswerResolver, FALLBACK_ANSWER, GREETING_ANSWER};
