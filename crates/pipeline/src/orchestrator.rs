//! Conversation orchestration.
//!
//! Drives one retrieval-then-refinement cycle per user message and owns
//! the per-session state. The cycle is strictly sequential because
//! refinement consumes retrieval's output, and `&mut self` keeps a second
//! message out of the same pipeline instance while one is in flight.

use crate::documents::DocumentCache;
use crate::refine::RefinementStage;
use crate::retrieval::{DocumentMetadata, RetrievalClient};
use crate::session::Conversation;
use caduceus_core::{AppError, AppResult};

/// One chat session: backends plus private per-session state.
///
/// State (conversation history, document cache) is created with the
/// session and dropped with it; nothing is shared across sessions.
pub struct ChatSession {
    retrieval: RetrievalClient,
    refiner: RefinementStage,
    conversation: Conversation,
    documents: DocumentCache,
}

impl ChatSession {
    /// Create a fresh session over the given backends.
    pub fn new(retrieval: RetrievalClient, refiner: RefinementStage) -> Self {
        Self {
            retrieval,
            refiner,
            conversation: Conversation::new(),
            documents: DocumentCache::new(),
        }
    }

    /// Conversation history for display.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Cached document metadata for display.
    pub fn documents(&self) -> &[DocumentMetadata] {
        self.documents.entries()
    }

    /// Populate the document cache on first use.
    pub async fn ensure_documents(&mut self) -> AppResult<&[DocumentMetadata]> {
        if !self.documents.is_populated() {
            self.documents.refresh(&self.retrieval).await?;
        }
        Ok(self.documents.entries())
    }

    /// Force-refresh the document cache, replacing it wholesale.
    pub async fn refresh_documents(&mut self) -> AppResult<&[DocumentMetadata]> {
        self.documents.refresh(&self.retrieval).await
    }

    /// Run one full request/response cycle.
    ///
    /// Appends the user turn, retrieves a grounded answer, refines it, and
    /// appends the assistant turn. Backend failures have already been
    /// recovered into displayable fallback text by the time they reach the
    /// history, so a non-empty question always gains exactly two turns.
    ///
    /// An empty-after-trim question is rejected before any turn is
    /// appended or any backend is called.
    pub async fn handle_user_message(&mut self, text: &str) -> AppResult<String> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "Question must not be empty".to_string(),
            ));
        }

        tracing::info!("Handling user message");
        self.conversation.push_user(text);

        let retrieved = self.retrieval.ask(text).await?;
        tracing::debug!("Retrieved {} bytes of grounded answer", retrieved.answer.len());

        let refined = self.refiner.refine(text, &retrieved.answer).await;

        self.conversation.push_assistant(refined.text.clone());
        tracing::info!("Cycle complete, history has {} turns", self.conversation.len());

        Ok(refined.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::REFINEMENT_ERROR_FALLBACK;
    use crate::retrieval::{
        RetrievalBackend, RetrievalResult, NO_RESPONSE_FALLBACK, RETRIEVAL_ERROR_FALLBACK,
    };
    use crate::session::Role;
    use caduceus_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct StaticBackend {
        answer: Option<String>,
        fail: bool,
        asks: AtomicUsize,
    }

    impl StaticBackend {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Some(answer.to_string()),
                fail: false,
                asks: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: None,
                fail: true,
                asks: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl RetrievalBackend for StaticBackend {
        async fn ask(&self, _question: &str) -> AppResult<RetrievalResult> {
            self.asks.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Retrieval("boom".to_string()));
            }
            Ok(RetrievalResult {
                answer: self
                    .answer
                    .clone()
                    .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string()),
                sources: Vec::new(),
            })
        }

        async fn list_documents(&self) -> AppResult<Vec<crate::retrieval::DocumentMetadata>> {
            Ok(vec![crate::retrieval::DocumentMetadata {
                path: "records/labs.pdf".to_string(),
                extra: HashMap::new(),
            }])
        }
    }

    struct RecordingLlm {
        reply: String,
        fail: bool,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl RecordingLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                fail: false,
                last_request: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: String::new(),
                fail: true,
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for RecordingLlm {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.fail {
                return Err(AppError::Generation("boom".to_string()));
            }
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    fn session(backend: Arc<StaticBackend>, llm: Arc<RecordingLlm>) -> ChatSession {
        let retrieval = RetrievalClient::new(backend);
        let refiner = RefinementStage::new(llm, "deepseek-r1-distill-llama-70b").unwrap();
        ChatSession::new(retrieval, refiner)
    }

    #[tokio::test]
    async fn test_cycle_appends_exactly_two_turns() {
        let backend = StaticBackend::answering("Patient has elevated creatinine.");
        let llm = RecordingLlm::replying("Creatinine is elevated; trend review advised.");
        let mut session = session(backend, llm);

        let answer = session
            .handle_user_message("What is the renal status?")
            .await
            .unwrap();

        assert_eq!(answer, "Creatinine is elevated; trend review advised.");
        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "What is the renal status?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "Creatinine is elevated; trend review advised.");
    }

    #[tokio::test]
    async fn test_refinement_sees_exact_concatenation() {
        let backend = StaticBackend::answering("Patient has elevated creatinine.");
        let llm = RecordingLlm::replying("ok");
        let mut session = session(backend, llm.clone());

        session
            .handle_user_message("What is the renal status?")
            .await
            .unwrap();

        let request = llm.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request.prompt,
            "What is the renal status? RAG Response:Patient has elevated creatinine."
        );
    }

    #[tokio::test]
    async fn test_retrieval_failure_still_gains_assistant_turn() {
        let backend = StaticBackend::failing();
        let llm = RecordingLlm::replying("Styled fallback.");
        let mut session = session(backend, llm.clone());

        let answer = session.handle_user_message("question").await.unwrap();

        // Refinement ran on the retrieval fallback text
        let request = llm.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request.prompt,
            format!("question RAG Response:{}", RETRIEVAL_ERROR_FALLBACK)
        );

        assert_eq!(answer, "Styled fallback.");
        assert_eq!(session.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_both_backends_failing_still_displayable() {
        let backend = StaticBackend::failing();
        let llm = RecordingLlm::failing();
        let mut session = session(backend, llm);

        let answer = session.handle_user_message("question").await.unwrap();
        assert_eq!(answer, REFINEMENT_ERROR_FALLBACK);
        assert_eq!(session.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_question_rejected_before_backends() {
        let backend = StaticBackend::answering("unused");
        let llm = RecordingLlm::replying("unused");
        let mut session = session(backend.clone(), llm.clone());

        let err = session.handle_user_message("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(session.conversation().is_empty());
        assert_eq!(backend.asks.load(Ordering::SeqCst), 0);
        assert!(llm.last_request.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_accumulates_across_cycles() {
        let backend = StaticBackend::answering("grounded");
        let llm = RecordingLlm::replying("refined");
        let mut session = session(backend, llm);

        session.handle_user_message("first").await.unwrap();
        session.handle_user_message("second").await.unwrap();

        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].content, "first");
        assert_eq!(turns[2].content, "second");
    }

    #[tokio::test]
    async fn test_document_cache_first_use_and_refresh() {
        let backend = StaticBackend::answering("unused");
        let llm = RecordingLlm::replying("unused");
        let mut session = session(backend, llm);

        assert!(session.documents().is_empty());
        let docs = session.ensure_documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].file_name(), "labs.pdf");

        let refreshed = session.refresh_documents().await.unwrap();
        assert_eq!(refreshed.len(), 1);
    }
}
