//! Chat command handler.
//!
//! Hosts one chat session: each user message runs the full
//! retrieval-then-refinement cycle before the next message is read, so one
//! cycle is in flight at a time.

use caduceus_core::{config::AppConfig, AppError, AppResult};
use caduceus_llm::create_client;
use caduceus_pipeline::{ChatSession, HttpRetrievalClient, RefinementStage, RetrievalClient};
use clap::Args;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

/// Chat with the assistant
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// One-shot question (skips the interactive loop)
    #[arg(short, long)]
    pub question: Option<String>,

    /// Print the full transcript after each answer
    #[arg(long)]
    pub show_history: bool,

    /// Output answers as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        config.validate()?;
        let mut session = build_session(config)?;

        if let Some(ref question) = self.question {
            let answer = session.handle_user_message(question).await?;
            self.print_answer(&answer, &session)?;
            return Ok(());
        }

        self.run_interactive(&mut session).await
    }

    /// Interactive loop. Input is read only after the previous cycle
    /// finishes.
    async fn run_interactive(&self, session: &mut ChatSession) -> AppResult<()> {
        println!("Caduceus is ready. Type a question, /documents, or /quit.");

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next() else { break };
            let line = line?;
            let text = line.trim();

            if text.is_empty() {
                continue;
            }

            match text {
                "/quit" | "/exit" => break,
                "/documents" => {
                    self.print_documents(session).await;
                    continue;
                }
                _ => {}
            }

            match session.handle_user_message(text).await {
                Ok(answer) => self.print_answer(&answer, session)?,
                Err(AppError::Validation(msg)) => eprintln!("{}", msg),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Print the refined answer (and optionally the transcript).
    fn print_answer(&self, answer: &str, session: &ChatSession) -> AppResult<()> {
        if self.json {
            let output = serde_json::json!({
                "answer": answer,
                "turns": session.conversation().len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        if self.show_history {
            println!("---");
            print!("{}", session.conversation().render());
        }

        Ok(())
    }

    /// Print the indexed-file display, refreshing the session cache.
    async fn print_documents(&self, session: &mut ChatSession) {
        match session.refresh_documents().await {
            Ok(docs) if docs.is_empty() => println!("No indexed files found."),
            Ok(docs) => {
                println!("Indexed files:");
                for doc in docs {
                    println!("- {}", doc.file_name());
                }
            }
            Err(e) => eprintln!("Could not list documents: {}", e),
        }
    }
}

/// Wire a chat session from the application configuration.
pub(crate) fn build_session(config: &AppConfig) -> AppResult<ChatSession> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let backend = HttpRetrievalClient::new(config.retrieval_url(), timeout)?;
    let retrieval = RetrievalClient::new(Arc::new(backend));

    let api_key = config.resolve_api_key()?;
    let llm = create_client(
        &config.provider,
        config.provider_endpoint(),
        api_key.as_deref(),
        timeout,
    )?;
    let refiner = RefinementStage::new(llm, &config.model)?;

    Ok(ChatSession::new(retrieval, refiner))
}
