use async_trait::async_trait;
use docchat_types::{Message, Role};
use futures::StreamExt;
use genai::chat::{ChatMessage, ChatRequest, ChatStreamEvent};
use tracing::{debug, info};

use super::context::{attach_context, last_user_question};
use super::{ChunkRetriever, GenerationError, GenerationRequest, Generator, TextStream};
use crate::entities::ChunkStore;

/// Streams completions from a hosted model via `genai`, grounded in the
/// selected documents.
///
/// Provider credentials come from the environment (`OPENAI_API_KEY`,
/// `ANTHROPIC_API_KEY`, ...) and the provider is picked from the model name.
pub struct GenaiGenerator<S> {
    client: genai::Client,
    model: String,
    retriever: ChunkRetriever<S>,
}

impl<S: ChunkStore> GenaiGenerator<S> {
    pub fn new(model: impl Into<String>, retriever: ChunkRetriever<S>) -> Self {
        Self {
            client: genai::Client::default(),
            model: model.into(),
            retriever,
        }
    }
}

fn to_provider_message(message: Message) -> ChatMessage {
    match message.role {
        Role::User => ChatMessage::user(message.content),
        Role::Assistant => ChatMessage::assistant(message.content),
    }
}

#[async_trait]
impl<S: ChunkStore> Generator for GenaiGenerator<S> {
    async fn generate(&self, request: GenerationRequest) -> Result<TextStream, GenerationError> {
        let GenerationRequest {
            system,
            messages,
            selection,
        } = request;

        let question = last_user_question(&messages).unwrap_or_default().to_owned();
        let passages = self.retriever.retrieve(&selection, &question).await?;
        let messages = attach_context(messages, &passages);

        let chat_req = ChatRequest::new(messages.into_iter().map(to_provider_message).collect())
            .with_system(system);

        info!(model = %self.model, passages = passages.len(), "starting completion stream");
        let response = self
            .client
            .exec_chat_stream(self.model.as_str(), chat_req, None)
            .await
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        let stream = response.stream.filter_map(|event| async move {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => Some(Ok(chunk.content)),
                Ok(ChatStreamEvent::End(_)) => {
                    debug!("completion stream ended");
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(GenerationError::Provider(e.to_string()))),
            }
        });
        Ok(stream.boxed())
    }
}
