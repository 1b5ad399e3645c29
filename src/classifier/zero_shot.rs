//! Zero-shot classification client
//!
//! Calls a hosted NLI model (bart-large-mnli by default) through the
//! Hugging Face inference API.
//! Uses a long-lived reqwest::Client for connection pooling.

use super::{rank, IntentClassifier};
use crate::error::AssistantError;
use crate::models::LabelScore;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

/// Reusable zero-shot client (connection-pooled)
pub struct ZeroShotClient {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl ZeroShotClient {
    pub fn new(endpoint: String, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IntentClassifier for ZeroShotClient {
    fn name(&self) -> &'static str {
        "zero-shot"
    }

    async fn classify(&self, text: &str, candidate_labels: &[&str]) -> Result<Vec<LabelScore>> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels,
                multi_label: false,
            },
        };

        debug!(endpoint = %self.endpoint, "Calling zero-shot classifier");

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Zero-shot request failed: {}", e);
            AssistantError::ClassifierError(format!("Zero-shot request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Zero-shot error response ({}): {}", status, error_text);
            return Err(AssistantError::ClassifierError(format!(
                "Zero-shot API returned {}: {}",
                status, error_text
            )));
        }

        let body: ZeroShotResponse = response.json().await.map_err(|e| {
            error!("Failed to parse zero-shot response: {}", e);
            AssistantError::ClassifierError(format!("Zero-shot parse error: {}", e))
        })?;

        body.into_ranking()
    }
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
    multi_label: bool,
}

/// Both payload shapes the inference API has served for this task
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Columns {
        labels: Vec<String>,
        scores: Vec<f64>,
    },
    Pairs(Vec<LabelScore>),
}

impl ZeroShotResponse {
    fn into_ranking(self) -> Result<Vec<LabelScore>> {
        let scores = match self {
            ZeroShotResponse::Columns { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(AssistantError::ClassifierError(format!(
                        "Zero-shot returned {} labels but {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                labels
                    .into_iter()
                    .zip(scores)
                    .map(|(label, score)| LabelScore::new(label, score))
                    .collect()
            }
            ZeroShotResponse::Pairs(pairs) => pairs,
        };

        Ok(rank(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Intent;
    use crate::resolver::policy::GREETING_THRESHOLD;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/models/facebook/bart-large-mnli";

    fn client(server: &MockServer, token: Option<&str>) -> ZeroShotClient {
        ZeroShotClient::new(
            format!("{}{}", server.uri(), MODEL_PATH),
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_serialization() {
        let labels = ["greeting", "other"];
        let request = ZeroShotRequest {
            inputs: "Hello there",
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
                multi_label: false,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"], "Hello there");
        assert_eq!(json["parameters"]["candidate_labels"][0], "greeting");
        assert_eq!(json["parameters"]["multi_label"], false);
    }

    #[test]
    fn test_column_response() {
        let body = r#"{
            "sequence": "Hello there",
            "labels": ["greeting", "check the profit and loss performance"],
            "scores": [0.91, 0.09]
        }"#;

        let parsed: ZeroShotResponse = serde_json::from_str(body).unwrap();
        let ranked = parsed.into_ranking().unwrap();
        assert_eq!(ranked[0], LabelScore::new("greeting", 0.91));
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_pair_response_is_resorted() {
        let body = r#"[
            {"label": "greeting", "score": 0.1},
            {"label": "count the number of trades or holdings", "score": 0.7},
            {"label": "check the profit and loss performance", "score": 0.2}
        ]"#;

        let parsed: ZeroShotResponse = serde_json::from_str(body).unwrap();
        let ranked = parsed.into_ranking().unwrap();
        assert_eq!(ranked[0].label, "count the number of trades or holdings");
        assert_eq!(ranked[2].label, "greeting");
    }

    #[test]
    fn test_scores_keep_full_precision() {
        let body = r#"{"labels": ["greeting", "other"], "scores": [0.80000001, 0.19999999]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(body).unwrap();
        let ranked = parsed.into_ranking().unwrap();
        assert!(ranked[0].score > GREETING_THRESHOLD);
    }

    #[test]
    fn test_mismatched_columns_are_rejected() {
        let body = r#"{"labels": ["a", "b"], "scores": [1.0]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            parsed.into_ranking(),
            Err(AssistantError::ClassifierError(_))
        ));
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let client = ZeroShotClient::new(
            DEFAULT_ENDPOINT.to_string(),
            Some("  ".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(client.api_token.is_none());
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_classify_column_body() {
        let server = MockServer::start().await;
        let labels = Intent::candidate_labels();

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(body_json(json!({
                "inputs": "Hello there",
                "parameters": {"candidate_labels": labels, "multi_label": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sequence": "Hello there",
                "labels": ["check the profit and loss performance", "greeting"],
                "scores": [0.05, 0.95]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ranked = assert_ok!(client(&server, None).classify("Hello there", &labels).await);
        assert_eq!(ranked[0], LabelScore::new("greeting", 0.95));
        assert_eq!(ranked[1].label, "check the profit and loss performance");
    }

    #[tokio::test]
    async fn test_classify_pair_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"label": "greeting", "score": 0.1},
                {"label": "count the number of trades or holdings", "score": 0.9}
            ])))
            .mount(&server)
            .await;

        let ranked = assert_ok!(
            client(&server, None)
                .classify("How many trades?", &Intent::candidate_labels())
                .await
        );
        assert_eq!(ranked[0].label, "count the number of trades or holdings");
        assert_eq!(ranked[1].label, "greeting");
    }

    #[tokio::test]
    async fn test_error_status_is_classifier_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let result = client(&server, None)
            .classify("Hello there", &Intent::candidate_labels())
            .await;
        match assert_err!(result) {
            AssistantError::ClassifierError(message) => assert!(message.contains("503")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_classifier_error() {
        // Bind then release a port so nothing is listening on it
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = ZeroShotClient::new(
            format!("http://127.0.0.1:{}{}", port, MODEL_PATH),
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        let result = client.classify("Hello there", &Intent::candidate_labels()).await;
        assert!(matches!(result, Err(AssistantError::ClassifierError(_))));
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer hf_secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "labels": ["greeting"],
                "scores": [1.0]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ranked = assert_ok!(
            client(&server, Some("hf_secret"))
                .classify("Hello there", &["greeting"])
                .await
        );
        assert_eq!(ranked, vec![LabelScore::new("greeting", 1.0)]);
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let server = MockServer::start().await;

        // Mounted first, so it takes any request that carries the header
        Mock::given(method("POST"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(401))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "labels": ["greeting"],
                "scores": [1.0]
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert_ok!(client(&server, None).classify("Hello there", &["greeting"]).await);
    }
}
