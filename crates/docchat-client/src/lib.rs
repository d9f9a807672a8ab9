//! Client side of docchat: an HTTP binding for the history endpoints and the
//! history view state machine that drives the sidebar and the `docchat` CLI.

pub mod api;
pub mod error;
pub mod history;

pub use api::{HistoryApi, HttpHistoryApi};
pub use error::ClientError;
pub use history::{HistoryDisplay, HistoryEntry, HistoryView, Navigation, Route};
