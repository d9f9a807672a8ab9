use std::future::Future;

use super::SqliteStore;

/// A row in the `document_chunks` table: one retrievable slice of an
/// uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub id: String,
    pub file_path: String,
    pub content: String,
}

pub trait ChunkStore: Send + Sync + 'static {
    /// All chunks belonging to any of `file_paths`. An empty slice yields
    /// nothing.
    fn list_chunks_by_paths(
        &self,
        file_paths: &[String],
    ) -> impl Future<Output = Result<Vec<DocumentChunk>, sqlx::Error>> + Send;

    /// Store one chunk of a document. Called by the upload/ingestion job that
    /// splits files into chunks; the server itself only reads chunks. Upserts
    /// on `id`.
    fn insert_chunk(
        &self,
        chunk: DocumentChunk,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

impl ChunkStore for SqliteStore {
    async fn list_chunks_by_paths(
        &self,
        file_paths: &[String],
    ) -> Result<Vec<DocumentChunk>, sqlx::Error> {
        if file_paths.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, file_path, content FROM document_chunks WHERE file_path IN (",
        );
        let mut separated = builder.separated(", ");
        for path in file_paths {
            separated.push_bind(path.as_str());
        }
        separated.push_unseparated(") ORDER BY file_path, id");

        let rows: Vec<(String, String, String)> =
            builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, file_path, content)| DocumentChunk {
                id,
                file_path,
                content,
            })
            .collect())
    }

    async fn insert_chunk(&self, chunk: DocumentChunk) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO document_chunks (id, file_path, content) VALUES (?1, ?2, ?3) \
             ON CONFLICT(id) DO UPDATE SET file_path = ?2, content = ?3",
        )
        .bind(&chunk.id)
        .bind(&chunk.file_path)
        .bind(&chunk.content)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
