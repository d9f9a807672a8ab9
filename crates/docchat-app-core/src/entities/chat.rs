use std::future::Future;

use chrono::{SecondsFormat, Utc};
use docchat_types::{Chat, Message};

use super::{parse_timestamp, SqliteStore};

pub trait ChatStore: Send + Sync + 'static {
    fn get_chat_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Chat>, sqlx::Error>> + Send;

    /// Returns `true` if a row was removed.
    fn delete_chat_by_id(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// The author's chats, newest first.
    fn list_chats_by_author(
        &self,
        author: &str,
    ) -> impl Future<Output = Result<Vec<Chat>, sqlx::Error>> + Send;

    /// Insert the chat, or replace its message list if it already exists
    /// under the same author.
    ///
    /// Returns `false` (and writes nothing) when a chat with this id exists
    /// under a different author.
    fn create_message(
        &self,
        id: &str,
        author: &str,
        messages: &[Message],
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

type ChatRow = (String, String, String, String);

fn chat_from_row((id, author, messages, created_at): ChatRow) -> Result<Chat, sqlx::Error> {
    let messages: Vec<Message> =
        serde_json::from_str(&messages).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(Chat {
        created_at: parse_timestamp(&created_at, "chats.created_at"),
        id,
        messages,
        author,
    })
}

impl ChatStore for SqliteStore {
    async fn get_chat_by_id(&self, id: &str) -> Result<Option<Chat>, sqlx::Error> {
        let row: Option<ChatRow> = sqlx::query_as(
            "SELECT id, author, messages, created_at FROM chats WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(chat_from_row).transpose()
    }

    async fn delete_chat_by_id(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_chats_by_author(&self, author: &str) -> Result<Vec<Chat>, sqlx::Error> {
        let rows: Vec<ChatRow> = sqlx::query_as(
            "SELECT id, author, messages, created_at FROM chats \
             WHERE author = ?1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(author)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(chat_from_row).collect()
    }

    async fn create_message(
        &self,
        id: &str,
        author: &str,
        messages: &[Message],
    ) -> Result<bool, sqlx::Error> {
        let encoded = serde_json::to_string(messages).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        // Fixed-width timestamps keep lexical order equal to time order.
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let result = sqlx::query(
            "INSERT INTO chats (id, author, messages, created_at) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(id) DO UPDATE SET messages = excluded.messages \
             WHERE chats.author = excluded.author",
        )
        .bind(id)
        .bind(author)
        .bind(&encoded)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips_messages() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        let messages = vec![Message::user("hello"), Message::assistant("hi there")];
        assert!(store.create_message("c1", "a@x.com", &messages).await.unwrap());

        let chat = store.get_chat_by_id("c1").await.unwrap().expect("chat stored");
        assert_eq!(chat.author, "a@x.com");
        assert_eq!(chat.messages, messages);
    }

    #[tokio::test]
    async fn append_replaces_messages_but_keeps_author_and_created_at() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store.create_message("c1", "a@x.com", &[Message::user("one")]).await.unwrap();
        let first = store.get_chat_by_id("c1").await.unwrap().unwrap();

        let longer = vec![Message::user("one"), Message::assistant("two")];
        assert!(store.create_message("c1", "a@x.com", &longer).await.unwrap());

        let second = store.get_chat_by_id("c1").await.unwrap().unwrap();
        assert_eq!(second.messages.len(), 2);
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn append_under_another_author_is_refused() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store.create_message("c1", "a@x.com", &[Message::user("mine")]).await.unwrap();

        let written = store
            .create_message("c1", "b@x.com", &[Message::user("hijack")])
            .await
            .unwrap();
        assert!(!written);

        let chat = store.get_chat_by_id("c1").await.unwrap().unwrap();
        assert_eq!(chat.author, "a@x.com");
        assert_eq!(chat.messages, vec![Message::user("mine")]);
    }

    #[tokio::test]
    async fn list_filters_by_author_newest_first() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store.create_message("c1", "a@x.com", &[Message::user("first")]).await.unwrap();
        store.create_message("c2", "b@x.com", &[Message::user("other")]).await.unwrap();
        store.create_message("c3", "a@x.com", &[Message::user("second")]).await.unwrap();

        let ids: Vec<String> = store
            .list_chats_by_author("a@x.com")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["c3", "c1"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        store.create_message("c1", "a@x.com", &[Message::user("x")]).await.unwrap();

        assert!(store.delete_chat_by_id("c1").await.unwrap());
        assert!(!store.delete_chat_by_id("c1").await.unwrap());
        assert!(store.get_chat_by_id("c1").await.unwrap().is_none());
    }
}
