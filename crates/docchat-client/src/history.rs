//! History sidebar as an explicit state machine.
//!
//! The view never mutates its cached list optimistically: every change is
//! followed by a re-fetch, and the last fetch wins.

use docchat_types::Chat;
use tracing::{debug, warn};

use crate::api::HistoryApi;
use crate::error::ClientError;

/// Widths (in percent) of the placeholder rows shown while loading.
pub const SKELETON_WIDTHS: [u8; 4] = [44, 32, 28, 52];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Ready,
    Unauthenticated,
    Failed(String),
}

/// What the main pane is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Chat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteDialog {
    Idle,
    PendingConfirmation(String),
    InFlight(String),
}

/// Where the caller should go after a delete completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub active: bool,
}

/// What to render in the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryDisplay {
    /// "Login to save and revisit previous chats!"
    LoginPrompt,
    Skeleton(&'static [u8]),
    /// "No chats found"
    Empty,
    Entries(Vec<HistoryEntry>),
    Unavailable(String),
}

pub struct HistoryView<A> {
    api: A,
    status: ListStatus,
    chats: Option<Vec<Chat>>,
    route: Route,
    dialog: DeleteDialog,
}

impl<A: HistoryApi> HistoryView<A> {
    pub fn new(api: A, route: Route) -> Self {
        Self {
            api,
            status: ListStatus::Loading,
            chats: None,
            route,
            dialog: DeleteDialog::Idle,
        }
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn dialog(&self) -> &DeleteDialog {
        &self.dialog
    }

    pub fn chats(&self) -> Option<&[Chat]> {
        self.chats.as_deref()
    }

    pub async fn mount(&mut self) {
        self.refresh().await;
    }

    /// Switch the active route and re-synchronise with the server.
    pub async fn navigate(&mut self, route: Route) {
        self.route = route;
        self.refresh().await;
    }

    pub async fn refresh(&mut self) {
        if self.chats.is_none() {
            self.status = ListStatus::Loading;
        }
        match self.api.list_history().await {
            Ok(chats) => {
                debug!(count = chats.len(), "history refreshed");
                self.chats = Some(chats);
                self.status = ListStatus::Ready;
            }
            Err(ClientError::Unauthorized) => {
                self.chats = None;
                self.status = ListStatus::Unauthenticated;
            }
            Err(e) => {
                // A stale list stays on screen; only an empty cache shows the failure.
                warn!(error = %e, "failed to fetch history");
                self.status = ListStatus::Failed(e.to_string());
            }
        }
    }

    /// Open the confirmation dialog for `id`. Ignored while a delete is in flight.
    pub fn request_delete(&mut self, id: impl Into<String>) {
        if matches!(self.dialog, DeleteDialog::InFlight(_)) {
            return;
        }
        self.dialog = DeleteDialog::PendingConfirmation(id.into());
    }

    pub fn cancel_delete(&mut self) {
        if let DeleteDialog::PendingConfirmation(_) = self.dialog {
            self.dialog = DeleteDialog::Idle;
        }
    }

    /// Issue the pending delete. The dialog is closed whatever the outcome.
    ///
    /// Returns [`Navigation::Home`] when the deleted chat was the one being
    /// viewed. Failures are logged and handed back without retrying.
    pub async fn confirm_delete(&mut self) -> Result<Navigation, ClientError> {
        let id = match std::mem::replace(&mut self.dialog, DeleteDialog::Idle) {
            DeleteDialog::PendingConfirmation(id) => id,
            other => {
                self.dialog = other;
                return Ok(Navigation::Stay);
            }
        };

        self.dialog = DeleteDialog::InFlight(id.clone());
        let result = self.api.delete_chat(&id).await;
        self.dialog = DeleteDialog::Idle;

        if let Err(e) = result {
            warn!(chat_id = %id, error = %e, "failed to delete chat");
            return Err(e);
        }

        self.refresh().await;
        if self.route == Route::Chat(id) {
            self.route = Route::Home;
            return Ok(Navigation::Home);
        }
        Ok(Navigation::Stay)
    }

    pub fn display(&self) -> HistoryDisplay {
        match (&self.status, &self.chats) {
            (ListStatus::Unauthenticated, _) => HistoryDisplay::LoginPrompt,
            (_, Some(chats)) if chats.is_empty() => HistoryDisplay::Empty,
            (_, Some(chats)) => HistoryDisplay::Entries(
                chats
                    .iter()
                    .map(|chat| HistoryEntry {
                        id: chat.id.clone(),
                        title: chat.title().unwrap_or_default().to_owned(),
                        active: matches!(&self.route, Route::Chat(id) if *id == chat.id),
                    })
                    .collect(),
            ),
            (ListStatus::Failed(msg), None) => HistoryDisplay::Unavailable(msg.clone()),
            (_, None) => HistoryDisplay::Skeleton(&SKELETON_WIDTHS),
        }
    }

    /// Count shown next to the "History" heading.
    pub fn header_label(&self) -> String {
        match &self.chats {
            Some(chats) => chats.len().to_string(),
            None => "loading".to_owned(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use docchat_types::Message;
    use std::sync::{Arc, Mutex};

    fn chat(id: &str, first: &str) -> Chat {
        Chat {
            id: id.into(),
            created_at: Utc::now(),
            messages: vec![Message::user(first)],
            author: "a@x.com".into(),
        }
    }

    /// Counts calls and serves a mutable in-memory history.
    #[derive(Default)]
    struct FakeApi {
        chats: Mutex<Vec<Chat>>,
        unauthorized: bool,
        fail_delete: bool,
        list_calls: Mutex<usize>,
        delete_calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with(chats: Vec<Chat>) -> Self {
            Self {
                chats: Mutex::new(chats),
                ..Default::default()
            }
        }

        fn shared(self) -> Arc<Self> {
            Arc::new(self)
        }
    }

    #[async_trait]
    impl HistoryApi for FakeApi {
        async fn list_history(&self) -> Result<Vec<Chat>, ClientError> {
            *self.list_calls.lock().unwrap() += 1;
            if self.unauthorized {
                return Err(ClientError::Unauthorized);
            }
            Ok(self.chats.lock().unwrap().clone())
        }

        async fn delete_chat(&self, id: &str) -> Result<(), ClientError> {
            self.delete_calls.lock().unwrap().push(id.to_owned());
            if self.fail_delete {
                return Err(ClientError::Status(403, "Unauthorized".into()));
            }
            self.chats.lock().unwrap().retain(|c| c.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn cancel_issues_no_delete() {
        let api = FakeApi::with(vec![chat("c1", "hello")]).shared();
        let mut view = HistoryView::new(Arc::clone(&api), Route::Home);
        view.mount().await;

        view.request_delete("c1");
        assert_eq!(view.dialog(), &DeleteDialog::PendingConfirmation("c1".into()));
        view.cancel_delete();

        assert_eq!(view.dialog(), &DeleteDialog::Idle);
        assert!(api.delete_calls.lock().unwrap().is_empty());
        assert_eq!(*api.list_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn confirm_issues_exactly_one_delete_and_refetches() {
        let api = FakeApi::with(vec![chat("c1", "hello"), chat("c2", "other")]).shared();
        let mut view = HistoryView::new(Arc::clone(&api), Route::Chat("c2".into()));
        view.mount().await;

        view.request_delete("c1");
        let nav = view.confirm_delete().await.unwrap();

        assert_eq!(nav, Navigation::Stay);
        assert_eq!(*api.delete_calls.lock().unwrap(), vec!["c1".to_owned()]);
        assert_eq!(*api.list_calls.lock().unwrap(), 2);
        assert_eq!(view.header_label(), "1");
        assert_eq!(view.dialog(), &DeleteDialog::Idle);
    }

    #[tokio::test]
    async fn deleting_the_active_chat_navigates_home() {
        let api = FakeApi::with(vec![chat("c1", "hello")]).shared();
        let mut view = HistoryView::new(Arc::clone(&api), Route::Chat("c1".into()));
        view.mount().await;

        view.request_delete("c1");
        assert_eq!(view.confirm_delete().await.unwrap(), Navigation::Home);
        assert_eq!(view.route(), &Route::Home);
        assert_eq!(view.display(), HistoryDisplay::Empty);
    }

    #[tokio::test]
    async fn failed_delete_still_closes_dialog_without_refetch() {
        let api = FakeApi {
            fail_delete: true,
            ..FakeApi::with(vec![chat("c1", "hello")])
        }
        .shared();
        let mut view = HistoryView::new(Arc::clone(&api), Route::Chat("c1".into()));
        view.mount().await;

        view.request_delete("c1");
        assert!(view.confirm_delete().await.is_err());
        assert_eq!(view.dialog(), &DeleteDialog::Idle);
        assert_eq!(view.route(), &Route::Chat("c1".into()));
        assert_eq!(*api.list_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn confirm_without_pending_request_is_a_no_op() {
        let api = FakeApi::with(vec![chat("c1", "hello")]).shared();
        let mut view = HistoryView::new(Arc::clone(&api), Route::Home);
        view.mount().await;

        assert_eq!(view.confirm_delete().await.unwrap(), Navigation::Stay);
        assert!(api.delete_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn navigation_refetches() {
        let api = FakeApi::with(vec![chat("c1", "hello")]).shared();
        let mut view = HistoryView::new(Arc::clone(&api), Route::Home);
        view.mount().await;
        view.navigate(Route::Chat("c1".into())).await;

        assert_eq!(*api.list_calls.lock().unwrap(), 2);
        assert_eq!(
            view.display(),
            HistoryDisplay::Entries(vec![HistoryEntry {
                id: "c1".into(),
                title: "hello".into(),
                active: true,
            }])
        );
    }

    #[tokio::test]
    async fn display_distinguishes_loading_login_and_empty() {
        let api = FakeApi::default().shared();
        let mut view = HistoryView::new(Arc::clone(&api), Route::Home);
        assert_eq!(view.display(), HistoryDisplay::Skeleton(&SKELETON_WIDTHS));
        assert_eq!(view.header_label(), "loading");

        view.mount().await;
        assert_eq!(view.display(), HistoryDisplay::Empty);
        assert_eq!(view.header_label(), "0");

        let anonymous = FakeApi {
            unauthorized: true,
            ..Default::default()
        }
        .shared();
        let mut view = HistoryView::new(anonymous, Route::Home);
        view.mount().await;
        assert_eq!(view.status(), &ListStatus::Unauthenticated);
        assert_eq!(view.display(), HistoryDisplay::LoginPrompt);
    }
}
