//! Retrieval client for the remote RAG server.
//!
//! The server owns document indexing and grounded answering; this module
//! only submits questions and normalizes the results. Wire shapes follow
//! the server's REST surface: `{"prompt": ...}` in, `{"response": ...}`
//! out for answers, and an empty key-list in, `[{"path": ...}, ...]` out
//! for document listings.

use caduceus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Answer text substituted when the server reply lacks a response field.
pub const NO_RESPONSE_FALLBACK: &str = "No response received.";

/// Answer text shown when the retrieval call itself fails.
pub const RETRIEVAL_ERROR_FALLBACK: &str = "An error occurred while fetching the response.";

/// Metadata describing one indexed source document.
///
/// Produced entirely by the RAG server; the client only snapshots it for
/// display. Descriptive fields beyond the path are carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source path as indexed by the server
    pub path: String,

    /// Remaining descriptive fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl DocumentMetadata {
    /// Final path component, used for display lists.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A normalized answer from the retrieval backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Grounded answer text
    pub answer: String,

    /// Source documents the server attributed, when provided
    #[serde(default)]
    pub sources: Vec<DocumentMetadata>,
}

/// Narrow interface over the RAG server.
///
/// Kept minimal so the server is swappable and mockable: ask a question,
/// list the indexed documents, nothing else.
#[async_trait::async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Submit a question and return the grounded answer.
    async fn ask(&self, question: &str) -> AppResult<RetrievalResult>;

    /// List the documents currently indexed by the server.
    async fn list_documents(&self) -> AppResult<Vec<DocumentMetadata>>;
}

/// Wire request for the answer endpoint.
#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    prompt: &'a str,
}

/// Wire response for the answer endpoint.
#[derive(Debug, Deserialize)]
struct AskResponse {
    response: Option<String>,
    #[serde(default)]
    sources: Vec<DocumentMetadata>,
}

/// Wire request for the document listing endpoint.
#[derive(Debug, Serialize)]
struct ListDocumentsRequest {
    keys: Vec<String>,
}

/// Normalize a wire reply into a result the pipeline can display.
fn normalize_answer(reply: AskResponse) -> RetrievalResult {
    let answer = match reply.response {
        Some(text) => text,
        None => {
            tracing::warn!("RAG server reply had no response field");
            NO_RESPONSE_FALLBACK.to_string()
        }
    };

    RetrievalResult {
        answer,
        sources: reply.sources,
    }
}

/// HTTP client for the RAG server's REST surface.
pub struct HttpRetrievalClient {
    /// Base URL of the server (e.g., "http://localhost:8000")
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpRetrievalClient {
    /// Create a new client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Retrieval(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + Sync,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::Retrieval(format!("Failed to reach RAG server at {}: {}", url, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Retrieval(format!(
                "RAG server error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse RAG server response: {}", e)))
    }
}

#[async_trait::async_trait]
impl RetrievalBackend for HttpRetrievalClient {
    async fn ask(&self, question: &str) -> AppResult<RetrievalResult> {
        tracing::info!("Requesting grounded answer from RAG server");

        let reply: AskResponse = self
            .post_json("/v1/pw_ai_answer", &AskRequest { prompt: question })
            .await?;

        Ok(normalize_answer(reply))
    }

    async fn list_documents(&self) -> AppResult<Vec<DocumentMetadata>> {
        tracing::info!("Requesting document list from RAG server");

        self.post_json(
            "/v1/pw_list_documents",
            &ListDocumentsRequest { keys: Vec::new() },
        )
        .await
    }
}

/// Retrieval client with the local-recovery policy applied.
///
/// `ask` never surfaces backend failures to the caller: the orchestration
/// layer must always have something displayable, so failures are logged
/// and replaced with a fixed fallback answer. Document listing propagates
/// errors; callers decide how to surface those.
pub struct RetrievalClient {
    backend: Arc<dyn RetrievalBackend>,
}

impl RetrievalClient {
    /// Wrap a backend with the recovery policy.
    pub fn new(backend: Arc<dyn RetrievalBackend>) -> Self {
        Self { backend }
    }

    /// Submit a question, recovering backend failures into a fallback
    /// answer.
    ///
    /// Returns `AppError::Validation` without touching the network when
    /// the question is empty after trimming.
    pub async fn ask(&self, question: &str) -> AppResult<RetrievalResult> {
        if question.trim().is_empty() {
            return Err(AppError::Validation(
                "Question must not be empty".to_string(),
            ));
        }

        match self.backend.ask(question).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::error!(
                    operation = "ask",
                    error = %e,
                    "Retrieval failed, substituting fallback answer"
                );
                Ok(RetrievalResult {
                    answer: RETRIEVAL_ERROR_FALLBACK.to_string(),
                    sources: Vec::new(),
                })
            }
        }
    }

    /// List indexed documents.
    pub async fn list_documents(&self) -> AppResult<Vec<DocumentMetadata>> {
        self.backend.list_documents().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc(path: &str) -> DocumentMetadata {
        DocumentMetadata {
            path: path.to_string(),
            extra: HashMap::new(),
        }
    }

    struct FailingBackend;

    #[async_trait::async_trait]
    impl RetrievalBackend for FailingBackend {
        async fn ask(&self, _question: &str) -> AppResult<RetrievalResult> {
            Err(AppError::Retrieval("connection refused".to_string()))
        }

        async fn list_documents(&self) -> AppResult<Vec<DocumentMetadata>> {
            Err(AppError::Retrieval("connection refused".to_string()))
        }
    }

    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RetrievalBackend for CountingBackend {
        async fn ask(&self, _question: &str) -> AppResult<RetrievalResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RetrievalResult {
                answer: "grounded".to_string(),
                sources: Vec::new(),
            })
        }

        async fn list_documents(&self) -> AppResult<Vec<DocumentMetadata>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![doc("records/labs.pdf")])
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(doc("patients/smith/labs.pdf").file_name(), "labs.pdf");
        assert_eq!(doc("labs.pdf").file_name(), "labs.pdf");
    }

    #[test]
    fn test_normalize_answer_present() {
        let reply: AskResponse =
            serde_json::from_str(r#"{"response": "Creatinine is elevated."}"#).unwrap();
        let result = normalize_answer(reply);
        assert_eq!(result.answer, "Creatinine is elevated.");
    }

    #[test]
    fn test_normalize_answer_missing_field() {
        let reply: AskResponse = serde_json::from_str("{}").unwrap();
        let result = normalize_answer(reply);
        assert_eq!(result.answer, NO_RESPONSE_FALLBACK);
        assert!(result.sources.is_empty());
    }

    #[test]
    fn test_document_metadata_keeps_extra_fields() {
        let parsed: DocumentMetadata = serde_json::from_str(
            r#"{"path": "records/labs.pdf", "modified_at": 1700000000, "owner": "emr"}"#,
        )
        .unwrap();
        assert_eq!(parsed.path, "records/labs.pdf");
        assert_eq!(
            parsed.extra.get("owner"),
            Some(&serde_json::Value::String("emr".to_string()))
        );
    }

    #[tokio::test]
    async fn test_ask_recovers_backend_failure() {
        let client = RetrievalClient::new(Arc::new(FailingBackend));
        let result = client.ask("What is the renal status?").await.unwrap();
        assert_eq!(result.answer, RETRIEVAL_ERROR_FALLBACK);
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_question_before_network() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicUsize::new(0),
        });
        let client = RetrievalClient::new(backend.clone());

        let err = client.ask("   \n\t").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_list_documents_propagates_errors() {
        let client = RetrievalClient::new(Arc::new(FailingBackend));
        let err = client.list_documents().await.unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
    }
}
