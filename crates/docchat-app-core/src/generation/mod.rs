//! The generation collaborator: message history plus a document selection in,
//! assistant text out, chunk by chunk.
//!
//! [`Generator`] is the seam the chat workflow talks to. [`GenaiGenerator`]
//! is the production implementation; it grounds the conversation in the
//! selected documents via [`ChunkRetriever`] before handing it to a hosted
//! model through `genai`.

pub mod context;
pub mod provider;

pub use self::context::ChunkRetriever;
pub use self::provider::GenaiGenerator;

use async_trait::async_trait;
use docchat_types::Message;
use futures::stream::BoxStream;
use thiserror::Error;

/// Instructions that confine the assistant to the selected documents.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that ONLY answers questions based on \
the provided document content. You must strictly follow these rules: 1) NEVER use information \
outside of the provided context, 2) If the provided information doesn't contain the answer, \
clearly state that you don't have enough information in the documents, 3) Do not make \
assumptions or provide general knowledge, 4) Only reference and use information that is \
explicitly provided in the document context.";

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The hosted model rejected the request or the stream broke.
    #[error("model provider error: {0}")]
    Provider(String),

    /// Document context could not be loaded.
    #[error("document context unavailable: {0}")]
    Context(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub messages: Vec<Message>,
    /// Document paths the answer may draw on.
    pub selection: Vec<String>,
}

impl GenerationRequest {
    pub fn grounded(messages: Vec<Message>, selection: Vec<String>) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_owned(),
            messages,
            selection,
        }
    }
}

/// Incremental assistant output. The stream ends when generation is done.
pub type TextStream = BoxStream<'static, Result<String, GenerationError>>;

#[async_trait]
pub trait Generator: Send + Sync {
    /// Start generating. Errors returned here happen before any output.
    async fn generate(&self, request: GenerationRequest) -> Result<TextStream, GenerationError>;
}
