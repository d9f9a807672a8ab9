pub mod chat;

pub use chat::{ChatService, ReplyRequest, ReplyStream};
