//! Selecting document passages for a question.
//!
//! Only chunks of the selected files are ever considered. Candidates are
//! ranked by how many distinct question terms they contain and the top
//! `limit` are kept, ties broken by storage order.

use std::collections::HashSet;
use std::sync::Arc;

use docchat_types::{Message, Role};
use tracing::debug;

use super::GenerationError;
use crate::entities::{ChunkStore, DocumentChunk};

const CONTEXT_PREAMBLE: &str = "Here is some relevant information that you can use to answer the question:";

pub struct ChunkRetriever<S> {
    store: Arc<S>,
    limit: usize,
}

impl<S: ChunkStore> ChunkRetriever<S> {
    pub fn new(store: Arc<S>, limit: usize) -> Self {
        Self { store, limit }
    }

    pub async fn retrieve(
        &self,
        selection: &[String],
        question: &str,
    ) -> Result<Vec<DocumentChunk>, GenerationError> {
        let candidates = self.store.list_chunks_by_paths(selection).await?;
        let total = candidates.len();
        let ranked = rank_chunks(candidates, question, self.limit);
        debug!(selected_files = selection.len(), candidates = total, kept = ranked.len(), "document context retrieved");
        Ok(ranked)
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

pub fn rank_chunks(chunks: Vec<DocumentChunk>, question: &str, limit: usize) -> Vec<DocumentChunk> {
    let wanted = terms(question);
    let mut scored: Vec<(usize, DocumentChunk)> = chunks
        .into_iter()
        .map(|chunk| {
            let score = terms(&chunk.content).intersection(&wanted).count();
            (score, chunk)
        })
        .collect();
    // Stable sort keeps storage order among equal scores.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

/// The last user message, which is what the passages are ranked against.
pub fn last_user_question(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

/// Attach `passages` to the final message when it is a user turn.
pub fn attach_context(mut messages: Vec<Message>, passages: &[DocumentChunk]) -> Vec<Message> {
    if passages.is_empty() {
        return messages;
    }
    if let Some(last) = messages.last_mut().filter(|m| m.role == Role::User) {
        let mut content = std::mem::take(&mut last.content);
        content.push_str("\n\n");
        content.push_str(CONTEXT_PREAMBLE);
        for passage in passages {
            content.push_str("\n\n");
            content.push_str(&passage.content);
        }
        last.content = content;
    }
    messages
}
