use docchat_app_core::services::ReplyRequest;
use docchat_types::Message;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Chat to append the reply to; created on first reply.
    #[validate(length(min = 1, message = "Chat ID is required"))]
    pub id: String,
    /// Conversation so far, oldest first.
    #[validate(length(min = 1, message = "At least one message is required"))]
    pub messages: Vec<Message>,
    /// Document paths the assistant may answer from.
    #[serde(default)]
    pub selected_file_pathnames: Vec<String>,
}

impl From<ChatRequest> for ReplyRequest {
    fn from(req: ChatRequest) -> Self {
        ReplyRequest {
            id: req.id,
            messages: req.messages,
            selection: req.selected_file_pathnames,
        }
    }
}

/// Query string of `DELETE /api/chat/delete`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteChatQuery {
    /// Chat to delete.
    pub id: Option<String>,
}
