//! Notes table queries

use crate::model::Note;
use crate::Result;
use sqlx::{Row, SqlitePool};

/// List all notes, newest first
pub async fn list_notes(pool: &SqlitePool) -> Result<Vec<Note>> {
    let rows = sqlx::query(
        "SELECT id, timestamp, content, relatedAnalysisId FROM notes ORDER BY timestamp DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;

    let notes = rows
        .into_iter()
        .map(|row| Note {
            id: row.get("id"),
            timestamp: row.get("timestamp"),
            content: row.get("content"),
            related_analysis_id: row.get("relatedAnalysisId"),
        })
        .collect();
    Ok(notes)
}

/// Persist one note
pub async fn insert_note(pool: &SqlitePool, note: &Note) -> Result<()> {
    sqlx::query(
        "INSERT INTO notes (id, timestamp, content, relatedAnalysisId) VALUES (?, ?, ?, ?)",
    )
    .bind(&note.id)
    .bind(note.timestamp)
    .bind(&note.content)
    .bind(&note.related_analysis_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a note by identifier, returning the number of rows removed
pub async fn delete_note(pool: &SqlitePool, id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    fn note(id: &str, timestamp: i64, related: Option<&str>) -> Note {
        Note {
            id: id.to_string(),
            timestamp,
            content: format!("note {id}"),
            related_analysis_id: related.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_note() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("vibesync.db")).await.unwrap();

        insert_note(&pool, &note("n1", 1000, None)).await.unwrap();
        insert_note(&pool, &note("n2", 2000, Some("a1"))).await.unwrap();
        insert_note(&pool, &note("n3", 3000, None)).await.unwrap();

        let removed = delete_note(&pool, "n2").await.unwrap();
        assert_eq!(removed, 1);

        let notes = list_notes(&pool).await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, "n3");
        assert_eq!(notes[1].id, "n1");

        let removed = delete_note(&pool, "n2").await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn related_analysis_id_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("vibesync.db")).await.unwrap();

        insert_note(&pool, &note("n1", 1000, Some("a9"))).await.unwrap();
        let notes = list_notes(&pool).await.unwrap();
        assert_eq!(notes[0].related_analysis_id.as_deref(), Some("a9"));
    }
}
