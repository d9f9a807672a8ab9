//! Core of the docchat server: persistence, caller identity, the generation
//! collaborator and the chat workflows that sequence them.
//!
//! HTTP concerns live in the server binary; everything here is usable (and
//! tested) without a web framework.

pub mod context;
pub mod entities;
pub mod error;
pub mod generation;
pub mod identity;
pub mod services;

pub use context::{RequestContext, Session, User};
pub use error::AppCoreError;
