//! Answer resolver - routes a question to an answer
//!
//! CLASSIFY → DECIDE → HANDLE → RECORD

use crate::audit::{AuditLog, ResolutionRecord};
use crate::classifier::IntentClassifier;
use crate::data::DataStore;
use crate::models::{Intent, Resolution, Route};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

pub mod handlers;
pub mod policy;

pub use handlers::{FALLBACK_ANSWER, GREETING_ANSWER};
pub use policy::{create_default_policy, Decision, DecisionPolicy, DecisionRule, RuleInput};

/// Resolver context: datasets, classifier, routing policy and audit trail
pub struct AnswerResolver {
    store: Arc<DataStore>,
    classifier: Box<dyn IntentClassifier>,
    policy: DecisionPolicy,
    audit_log: AuditLog,
}

impl AnswerResolver {
    pub fn new(store: Arc<DataStore>, classifier: Box<dyn IntentClassifier>) -> Self {
        Self::with_policy(store, classifier, create_default_policy())
    }

    pub fn with_policy(
        store: Arc<DataStore>,
        classifier: Box<dyn IntentClassifier>,
        policy: DecisionPolicy,
    ) -> Self {
        Self {
            store,
            classifier,
            policy,
            audit_log: AuditLog::new(),
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    /// Answer a question; only a classifier failure is an error
    pub async fn ask(&self, question: &str) -> Result<String> {
        Ok(self.resolve(question).await?.answer)
    }

    /// Answer a question and report how the answer was reached
    pub async fn resolve(&self, question: &str) -> Result<Resolution> {
        let start_time = Instant::now();

        let labels = Intent::candidate_labels();
        let ranking = self.classifier.classify(question, &labels).await?;
        let top_intent = ranking.into_iter().next();

        debug!(
            classifier = self.classifier.name(),
            top_intent = ?top_intent,
            "Question classified"
        );

        let lowered = question.to_lowercase();
        let decision = self.policy.decide(&RuleInput {
            lowered: &lowered,
            top_intent: top_intent.as_ref(),
        });

        let answer = match decision.route {
            Route::Performance => handlers::answer_performance(&self.store),
            Route::Count => handlers::answer_count(&self.store, question),
            Route::Greeting => GREETING_ANSWER.to_string(),
            Route::Fallback => FALLBACK_ANSWER.to_string(),
        };

        let answered = answer != FALLBACK_ANSWER;
        info!(
            rule = decision.rule,
            route = ?decision.route,
            answered,
            "Question resolved"
        );

        let resolution = Resolution {
            answer,
            route: decision.route,
            rule: decision.rule,
            top_intent,
        };

        self.audit_log
            .record(ResolutionRecord {
                audit_id: Uuid::new_v4(),
                question: question.to_string(),
                resolution: resolution.clone(),
                dataset_fingerprint: self.store.fingerprint().to_string(),
                created_at: Utc::now(),
                execution_time_ms: start_time.elapsed().as_millis() as u64,
            })
            .await;

        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{KeywordClassifier, MockClassifier};
    use crate::error::AssistantError;
    use crate::models::LabelScore;
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    const HOLDINGS: &str = "\
PortfolioName,SecurityName,PL_YTD
Northpoint 401K,AAPL,1000000.25
Northpoint 401K,MSFT,234567.64
Northpoint,IBM,10
Garfield,TSLA,500
Garfield,GOOG,-100
";

    const TRADES: &str = "\
TradeId,PortfolioName
1,Northpoint 401K
2,Northpoint 401K
3,Northpoint 401K
4,Northpoint
5,Garfield
6,Garfield
";

    fn store() -> Arc<DataStore> {
        Arc::new(DataStore::from_readers(HOLDINGS.as_bytes(), TRADES.as_bytes()).unwrap())
    }

    fn resolver(intent: Intent, score: f64) -> AnswerResolver {
        AnswerResolver::new(store(), Box::new(MockClassifier::new(intent.label(), score)))
    }

    struct FailingClassifier;

    #[async_trait]
    impl IntentClassifier for FailingClassifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn classify(&self, _text: &str, _labels: &[&str]) -> Result<Vec<LabelScore>> {
            Err(AssistantError::ClassifierError("model offline".to_string()))
        }
    }

    struct EmptyClassifier;

    #[async_trait]
    impl IntentClassifier for EmptyClassifier {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn classify(&self, _text: &str, _labels: &[&str]) -> Result<Vec<LabelScore>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_count_scenario() {
        let resolver = resolver(Intent::UnknownDetails, 0.6);
        let answer = assert_ok!(resolver.ask("How many trades does Northpoint 401K have?").await);
        assert_eq!(answer, "Fund 'Northpoint 401K' has 2 holdings and 3 trades.");
    }

    #[tokio::test]
    async fn test_performance_scenario() {
        let resolver = resolver(Intent::Greeting, 0.99);
        let answer = assert_ok!(resolver.ask("What is the best performing fund?").await);
        assert_eq!(
            answer,
            "The best performing fund is 'Northpoint 401K' with a Yearly P&L of $1,234,567.89."
        );
    }

    #[tokio::test]
    async fn test_unknown_detail_scenario() {
        let resolver = resolver(Intent::UnknownDetails, 0.9);
        let answer = assert_ok!(resolver.ask("Who is the manager of the Garfield fund?").await);
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_greeting_confidence() {
        let confident = resolver(Intent::Greeting, 0.95);
        assert_eq!(confident.ask("Hello there").await.unwrap(), GREETING_ANSWER);

        let unsure = resolver(Intent::Greeting, 0.5);
        assert_eq!(unsure.ask("Hello there").await.unwrap(), FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_count_intent_still_needs_guardrail_keyword() {
        let resolver = resolver(Intent::CountRecords, 0.97);
        let resolution = resolver.resolve("Tell me about Northpoint 401K").await.unwrap();
        assert_eq!(resolution.route, Route::Count);
        assert_eq!(resolution.rule, "count_override");
        assert_eq!(resolution.answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_reference_transcript_questions() {
        let resolver = AnswerResolver::new(store(), Box::new(KeywordClassifier));

        assert_eq!(
            resolver
                .ask("What is the total Yearly P&L for all funds combined?")
                .await
                .unwrap(),
            "The best performing fund is 'Northpoint 401K' with a Yearly P&L of $1,234,567.89."
        );
        assert_eq!(
            resolver
                .ask("What is the total number of trades for Northpoint 401K?")
                .await
                .unwrap(),
            "Fund 'Northpoint 401K' has 2 holdings and 3 trades."
        );
        assert_eq!(
            resolver
                .ask("Who is the manager of the Garfield fund?")
                .await
                .unwrap(),
            FALLBACK_ANSWER
        );
    }

    #[tokio::test]
    async fn test_ask_is_idempotent() {
        let resolver = resolver(Intent::CountRecords, 0.9);
        let question = "number of holdings in garfield";

        let first = resolver.ask(question).await.unwrap();
        let second = resolver.ask(question).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "Fund 'Garfield' has 2 holdings and 2 trades.");
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let resolver = AnswerResolver::new(store(), Box::new(FailingClassifier));
        let err = assert_err!(resolver.ask("What is the best fund?").await);
        assert!(matches!(err, AssistantError::ClassifierError(_)));
        assert!(resolver.audit_log().is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_ranking_uses_keywords_only() {
        let resolver = AnswerResolver::new(store(), Box::new(EmptyClassifier));

        let resolution = resolver.resolve("Hello there").await.unwrap();
        assert_eq!(resolution.route, Route::Fallback);
        assert!(resolution.top_intent.is_none());

        let answer = resolver.ask("count trades in Garfield").await.unwrap();
        assert_eq!(answer, "Fund 'Garfield' has 2 holdings and 2 trades.");
    }

    #[tokio::test]
    async fn test_resolutions_are_audited() {
        let resolver = resolver(Intent::Greeting, 0.95);
        resolver.ask("Hello there").await.unwrap();
        resolver.ask("Which fund did worst?").await.unwrap();

        let records = resolver.audit_log().list().await;
        assert_eq!(records.len(), 2);

        let greeting = records
            .iter()
            .find(|r| r.question == "Hello there")
            .expect("greeting recorded");
        assert_eq!(greeting.resolution.rule, "confident_greeting");
        assert_eq!(greeting.dataset_fingerprint, resolver.store().fingerprint());
        assert!(
            resolver
                .audit_log()
                .matches_snapshot(greeting.audit_id, resolver.store().fingerprint())
                .await
        );
    }
}
