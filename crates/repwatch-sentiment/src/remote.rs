//! Remote sentiment provider speaking the Text Analytics v3.1 sentiment API.

use std::time::Duration;

use async_trait::async_trait;
use repwatch_core::Sentiment;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::scorer::Scorer;
use crate::types::{ConfidenceScores, SentimentAnalysis};

const SERVICE: &str = "text analytics";
const SENTIMENT_PATH: &str = "/text/analytics/v3.1/sentiment";

#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    documents: [RequestDocument<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestDocument<'a> {
    id: &'a str,
    language: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    #[serde(default)]
    documents: Vec<ResponseDocument>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseDocument {
    sentiment: String,
    confidence_scores: ConfidenceScores,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    id: String,
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// HTTP client for a hosted sentiment endpoint.
pub struct RemoteScorer {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl RemoteScorer {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{SENTIMENT_PATH}", endpoint.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }
}

impl std::fmt::Debug for RemoteScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteScorer")
            .field("url", &self.url)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Scorer for RemoteScorer {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn score(&self, text: &str, language: &str) -> Result<SentimentAnalysis, SentimentError> {
        let body = SentimentRequest {
            documents: [RequestDocument {
                id: "1",
                language,
                text,
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SentimentError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let payload: SentimentResponse =
            response
                .json()
                .await
                .map_err(|e| SentimentError::MalformedResponse {
                    service: SERVICE,
                    reason: e.to_string(),
                })?;

        if let Some(err) = payload.errors.into_iter().next() {
            return Err(SentimentError::Document {
                id: err.id,
                code: err.error.code,
                message: err.error.message,
            });
        }

        let document =
            payload
                .documents
                .into_iter()
                .next()
                .ok_or_else(|| SentimentError::MalformedResponse {
                    service: SERVICE,
                    reason: "response contained no documents".to_string(),
                })?;

        Ok(analysis_from_document(&document))
    }
}

fn analysis_from_document(document: &ResponseDocument) -> SentimentAnalysis {
    let confidence = document.confidence_scores;
    let (sentiment, score) = match document.sentiment.to_ascii_lowercase().as_str() {
        "positive" => (Sentiment::Positive, confidence.positive),
        "negative" => (Sentiment::Negative, -confidence.negative),
        // neutral and mixed
        _ => {
            return SentimentAnalysis {
                confidence: Some(confidence),
                ..SentimentAnalysis::neutral()
            }
        }
    };
    SentimentAnalysis {
        sentiment,
        score,
        confidence: Some(confidence),
    }
}
