//! HTTP binding for the history endpoints of docchat-server.

use async_trait::async_trait;
use docchat_types::{Chat, DeleteChatResponse};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

use crate::error::ClientError;

/// Data source behind the history view.
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// The signed-in caller's chats, newest first.
    async fn list_history(&self) -> Result<Vec<Chat>, ClientError>;

    /// Delete one of the caller's chats.
    async fn delete_chat(&self, id: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: HistoryApi + ?Sized> HistoryApi for std::sync::Arc<T> {
    async fn list_history(&self) -> Result<Vec<Chat>, ClientError> {
        (**self).list_history().await
    }

    async fn delete_chat(&self, id: &str) -> Result<(), ClientError> {
        (**self).delete_chat(id).await
    }
}

/// [`HistoryApi`] over `GET /api/history` and `DELETE /api/chat/delete`.
#[derive(Debug, Clone)]
pub struct HttpHistoryApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpHistoryApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status(status.as_u16(), body))
}

#[async_trait]
impl HistoryApi for HttpHistoryApi {
    async fn list_history(&self) -> Result<Vec<Chat>, ClientError> {
        let url = self.endpoint("/api/history")?;
        let resp = self.authorized(self.client.get(url)).send().await?;
        let chats: Vec<Chat> = check(resp).await?.json().await?;
        debug!(count = chats.len(), "history fetched");
        Ok(chats)
    }

    async fn delete_chat(&self, id: &str) -> Result<(), ClientError> {
        let mut url = self.endpoint("/api/chat/delete")?;
        url.query_pairs_mut().append_pair("id", id);
        let resp = self.authorized(self.client.delete(url)).send().await?;
        let body: DeleteChatResponse = check(resp).await?.json().await?;
        if !body.success {
            return Err(ClientError::Status(200, "delete not acknowledged".into()));
        }
        debug!(chat_id = id, "chat deleted");
        Ok(())
    }
}
