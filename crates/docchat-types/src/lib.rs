//! Types shared between the docchat server and its clients.
//!
//! The JSON shapes here are the wire format of the `/api` endpoints, so field
//! names follow the browser client's conventions (`createdAt`, lowercase
//! roles) rather than Rust's.

pub mod chat;

pub use chat::{Chat, DeleteChatResponse, Message, Role};
