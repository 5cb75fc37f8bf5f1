use rusqlite::{params, OptionalExtension};

use crate::db::Db;
use crate::error::{MechanicError, Result};
use crate::index::vector::{encode_embedding, parse_embedding};
use crate::index::DocumentChunk;
use crate::ingest::chunker::estimate_tokens;

/// Metadata key for the embedding model an index was built with.
pub const META_EMBEDDING_MODEL: &str = "embedding_model";
/// Metadata key for the embedding dimensionality.
pub const META_DIMENSIONS: &str = "dimensions";
/// Metadata key written only after every chunk of a build has been stored.
pub const META_BUILD_COMPLETE: &str = "build_complete";

/// A chunk loaded back from the store together with its vector.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk_id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Number of chunks in the store
pub async fn count_chunks(db: &Db) -> Result<usize> {
    db.with_connection(|conn| {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    })
    .await
}

/// Delete every chunk and the completion marker; returns the number of
/// chunks removed
pub async fn clear_chunks(db: &Db) -> Result<usize> {
    db.with_connection(|conn| {
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM index_meta WHERE key = ?1",
            params![META_BUILD_COMPLETE],
        )?;
        let removed = tx.execute("DELETE FROM chunks", [])?;
        tx.commit()?;
        Ok(removed)
    })
    .await
}

/// Mark the stored chunks as a complete build
pub async fn mark_build_complete(db: &Db) -> Result<()> {
    set_meta(db, META_BUILD_COMPLETE, "true").await
}

/// Whether the last build ran to completion
pub async fn is_build_complete(db: &Db) -> Result<bool> {
    Ok(get_meta(db, META_BUILD_COMPLETE).await?.as_deref() == Some("true"))
}

/// Insert (or replace) chunks with their embeddings in one transaction
///
/// Returns the number of rows written.
pub async fn insert_chunks(db: &Db, chunks: Vec<(DocumentChunk, Vec<f32>)>) -> Result<usize> {
    if chunks.is_empty() {
        return Ok(0);
    }

    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO chunks (
                    chunk_id, source, page, position, chunk_text, tokens, embedding
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )?;
            for (chunk, embedding) in &chunks {
                written += stmt.execute(params![
                    chunk.chunk_id,
                    chunk.source,
                    chunk.page as i64,
                    chunk.position as i64,
                    chunk.text,
                    estimate_tokens(&chunk.text) as i64,
                    encode_embedding(embedding),
                ])?;
            }
        }
        tx.commit()?;
        Ok::<usize, MechanicError>(written)
    })
    .await
}

/// Load every chunk whose embedding parses to finite values, ordered by chunk id
pub async fn load_embedded_chunks(db: &Db) -> Result<Vec<EmbeddedChunk>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            "SELECT chunk_id, chunk_text, embedding FROM chunks \
             WHERE embedding IS NOT NULL ORDER BY chunk_id",
        )?;
        let mut rows = stmt.query([])?;
        let mut chunks = Vec::new();
        while let Some(row) = rows.next()? {
            let chunk_id: String = row.get(0)?;
            let text: String = row.get(1)?;
            let blob: Vec<u8> = row.get(2)?;
            match parse_embedding(&blob) {
                Some(embedding) if embedding.iter().all(|x| x.is_finite()) => {
                    chunks.push(EmbeddedChunk {
                        chunk_id,
                        text,
                        embedding,
                    })
                }
                _ => log::warn!("Skipping chunk {} with malformed embedding", chunk_id),
            }
        }
        Ok::<Vec<EmbeddedChunk>, MechanicError>(chunks)
    })
    .await
}

/// Load a single chunk by id (without its embedding)
pub async fn get_chunk(db: &Db, chunk_id: &str) -> Result<Option<DocumentChunk>> {
    let chunk_id = chunk_id.to_string();
    db.with_connection(move |conn| {
        let chunk = conn
            .query_row(
                "SELECT chunk_id, source, page, position, chunk_text FROM chunks WHERE chunk_id = ?1",
                params![chunk_id],
                |row| {
                    Ok(DocumentChunk {
                        chunk_id: row.get(0)?,
                        source: row.get(1)?,
                        page: row.get::<_, i64>(2)? as usize,
                        position: row.get::<_, i64>(3)? as usize,
                        text: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(chunk)
    })
    .await
}

/// Record an index metadata value
pub async fn set_meta(db: &Db, key: &str, value: &str) -> Result<()> {
    let key = key.to_string();
    let value = value.to_string();
    db.with_connection(move |conn| {
        conn.execute(
            "INSERT INTO index_meta (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    })
    .await
}

/// Read an index metadata value
pub async fn get_meta(db: &Db, key: &str) -> Result<Option<String>> {
    let key = key.to_string();
    db.with_connection(move |conn| {
        let value = conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Db, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));
        db.initialize().await.unwrap();
        (db, temp_dir)
    }

    fn chunk(page: usize, position: usize, text: &str) -> DocumentChunk {
        DocumentChunk {
            chunk_id: format!("doc_{}_{}", page, position),
            source: "manual.txt".to_string(),
            page,
            position,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let (db, _temp) = setup_test_db().await;
        assert_eq!(count_chunks(&db).await.unwrap(), 0);

        let written = insert_chunks(
            &db,
            vec![
                (chunk(0, 0, "ABS warning lamp"), vec![1.0, 0.0]),
                (chunk(1, 0, "Tyre pressure"), vec![0.0, 1.0]),
            ],
        )
        .await
        .unwrap();

        assert_eq!(written, 2);
        assert_eq!(count_chunks(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_empty_is_noop() {
        let (db, _temp) = setup_test_db().await;
        assert_eq!(insert_chunks(&db, Vec::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reinsert_replaces_same_id() {
        let (db, _temp) = setup_test_db().await;
        insert_chunks(&db, vec![(chunk(0, 0, "old text"), vec![1.0])])
            .await
            .unwrap();
        insert_chunks(&db, vec![(chunk(0, 0, "new text"), vec![2.0])])
            .await
            .unwrap();

        assert_eq!(count_chunks(&db).await.unwrap(), 1);
        let stored = get_chunk(&db, "doc_0_0").await.unwrap().unwrap();
        assert_eq!(stored.text, "new text");
    }

    #[tokio::test]
    async fn test_load_embedded_chunks_round_trip() {
        let (db, _temp) = setup_test_db().await;
        insert_chunks(
            &db,
            vec![
                (chunk(2, 0, "Fuse box"), vec![0.5, 0.25, -1.0]),
                (chunk(1, 0, "ABS"), vec![1.0, 0.0, 0.0]),
            ],
        )
        .await
        .unwrap();

        let loaded = load_embedded_chunks(&db).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].chunk_id, "doc_1_0");
        assert_eq!(loaded[1].text, "Fuse box");
        assert_eq!(loaded[1].embedding, vec![0.5, 0.25, -1.0]);
    }

    #[tokio::test]
    async fn test_get_chunk_metadata() {
        let (db, _temp) = setup_test_db().await;
        insert_chunks(&db, vec![(chunk(7, 2, "Brake fluid"), vec![1.0])])
            .await
            .unwrap();

        let stored = get_chunk(&db, "doc_7_2").await.unwrap().unwrap();
        assert_eq!(stored.page, 7);
        assert_eq!(stored.position, 2);
        assert_eq!(stored.source, "manual.txt");
        assert!(get_chunk(&db, "doc_99_0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_chunks() {
        let (db, _temp) = setup_test_db().await;
        insert_chunks(&db, vec![(chunk(0, 0, "a"), vec![1.0]), (chunk(0, 1, "b"), vec![1.0])])
            .await
            .unwrap();
        mark_build_complete(&db).await.unwrap();
        set_meta(&db, META_EMBEDDING_MODEL, "nomic-embed-text").await.unwrap();

        assert_eq!(clear_chunks(&db).await.unwrap(), 2);
        assert_eq!(count_chunks(&db).await.unwrap(), 0);
        assert!(!is_build_complete(&db).await.unwrap());
        assert!(get_meta(&db, META_EMBEDDING_MODEL).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_build_complete_marker() {
        let (db, _temp) = setup_test_db().await;
        assert!(!is_build_complete(&db).await.unwrap());
        mark_build_complete(&db).await.unwrap();
        assert!(is_build_complete(&db).await.unwrap());
    }

    #[tokio::test]
    async fn test_meta_upsert() {
        let (db, _temp) = setup_test_db().await;
        assert!(get_meta(&db, META_EMBEDDING_MODEL).await.unwrap().is_none());

        set_meta(&db, META_EMBEDDING_MODEL, "nomic-embed-text").await.unwrap();
        set_meta(&db, META_EMBEDDING_MODEL, "all-minilm").await.unwrap();

        assert_eq!(
            get_meta(&db, META_EMBEDDING_MODEL).await.unwrap().as_deref(),
            Some("all-minilm")
        );
    }
}
