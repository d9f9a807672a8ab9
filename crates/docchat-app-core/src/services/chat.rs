//! Chat workflows: ownership checks and store sequencing.
//!
//! Checks always run in the same order: input, then identity, then
//! existence, then ownership. Because existence is checked before ownership a
//! caller probing someone else's id sees 403 only for chats that exist; that
//! disclosure is accepted.
//!
//! Nothing is cached between calls; every operation re-reads the store.

use std::sync::Arc;

use docchat_types::{Chat, Message};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use crate::context::{RequestContext, User};
use crate::entities::ChatStore;
use crate::error::AppCoreError;
use crate::generation::{GenerationRequest, Generator};

/// Buffered chunks between the generator task and the response body.
const REPLY_CHANNEL_CAPACITY: usize = 32;

/// Assistant output as it is produced. The stream closes after the reply has
/// been persisted.
pub type ReplyStream = ReceiverStream<Result<String, AppCoreError>>;

/// Input to [`ChatService::stream_reply`].
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub id: String,
    pub messages: Vec<Message>,
    pub selection: Vec<String>,
}

pub struct ChatService<S> {
    store: Arc<S>,
    generator: Arc<dyn Generator>,
}

impl<S: ChatStore> ChatService<S> {
    pub fn new(store: Arc<S>, generator: Arc<dyn Generator>) -> Self {
        Self { store, generator }
    }

    /// Hard-delete a chat owned by the caller.
    ///
    /// A blank id counts as missing. Deleting an id twice yields
    /// [`AppCoreError::NotFound`] the second time.
    pub async fn delete_chat(&self, ctx: &RequestContext, id: Option<&str>) -> Result<(), AppCoreError> {
        let id = id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppCoreError::Validation("Chat ID is required".into()))?;
        let user = ctx.require_user()?;

        self.owned_chat(user, id).await?;
        if !self.store.delete_chat_by_id(id).await? {
            // Lost a race with a concurrent delete.
            return Err(AppCoreError::NotFound(id.to_owned()));
        }

        info!(chat_id = %id, author = %user.email, "chat deleted");
        Ok(())
    }

    pub async fn get_chat(&self, ctx: &RequestContext, id: &str) -> Result<Chat, AppCoreError> {
        let user = ctx.require_user()?;
        self.owned_chat(user, id).await
    }

    /// The caller's chats, newest first.
    pub async fn list_history(&self, ctx: &RequestContext) -> Result<Vec<Chat>, AppCoreError> {
        let user = ctx.require_user()?;
        Ok(self.store.list_chats_by_author(&user.email).await?)
    }

    async fn owned_chat(&self, user: &User, id: &str) -> Result<Chat, AppCoreError> {
        let chat = self
            .store
            .get_chat_by_id(id)
            .await?
            .ok_or_else(|| AppCoreError::NotFound(id.to_owned()))?;
        if chat.author != user.email {
            warn!(chat_id = %id, caller = %user.email, "chat access by non-owner refused");
            return Err(AppCoreError::Forbidden(id.to_owned()));
        }
        Ok(chat)
    }

    /// Generate the assistant's next turn and stream it back.
    ///
    /// Only a session is required. When generation completes and the caller
    /// is still listening, the chat is stored as `messages + [reply]` under
    /// the session user's email before the stream closes. A session without a
    /// user still gets the reply, but nothing is stored because there is no
    /// author to record. A caller that goes away mid-stream loses the reply.
    pub async fn stream_reply(
        &self,
        ctx: &RequestContext,
        request: ReplyRequest,
    ) -> Result<ReplyStream, AppCoreError> {
        let session = ctx.require_session()?;
        if request.id.is_empty() {
            return Err(AppCoreError::Validation("Chat ID is required".into()));
        }
        if request.messages.is_empty() {
            return Err(AppCoreError::Validation("At least one message is required".into()));
        }

        let author = session.user.as_ref().map(|u| u.email.clone());
        let ReplyRequest {
            id,
            messages,
            selection,
        } = request;

        debug!(chat_id = %id, turns = messages.len(), selected_files = selection.len(), "generating reply");
        let mut upstream = self
            .generator
            .generate(GenerationRequest::grounded(messages.clone(), selection))
            .await?;

        let store = Arc::clone(&self.store);
        let (tx, rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut reply = String::new();
            while let Some(chunk) = upstream.next().await {
                match chunk {
                    Ok(delta) => {
                        reply.push_str(&delta);
                        if tx.send(Ok(delta)).await.is_err() {
                            info!(chat_id = %id, "caller disconnected; reply discarded");
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(chat_id = %id, error = %e, "generation failed mid-stream");
                        let _ = tx.send(Err(e.into())).await;
                        return;
                    }
                }
            }

            if tx.is_closed() {
                info!(chat_id = %id, "caller disconnected; reply discarded");
                return;
            }
            let Some(author) = author else {
                warn!(chat_id = %id, "session has no user; reply not persisted");
                return;
            };

            let mut history = messages;
            history.push(Message::assistant(reply));
            match store.create_message(&id, &author, &history).await {
                Ok(true) => info!(chat_id = %id, turns = history.len(), "reply persisted"),
                Ok(false) => {
                    warn!(chat_id = %id, author = %author, "chat owned by another author; reply not persisted");
                    let _ = tx.send(Err(AppCoreError::Conflict(id))).await;
                }
                Err(e) => {
                    error!(chat_id = %id, error = %e, "failed to persist reply");
                    let _ = tx.send(Err(e.into())).await;
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }
}
