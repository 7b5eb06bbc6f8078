//! History table queries

use crate::model::AudioAnalysis;
use crate::Result;
use sqlx::{Row, SqlitePool};

/// List all analyses, newest first.
///
/// The `data` blob is authoritative for the payload; the `id` and
/// `timestamp` columns are authoritative for identity and ordering, and
/// are overlaid onto the parsed record.
pub async fn list_history(pool: &SqlitePool) -> Result<Vec<AudioAnalysis>> {
    let rows = sqlx::query(
        "SELECT id, timestamp, data FROM history ORDER BY timestamp DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;

    let mut history = Vec::with_capacity(rows.len());
    for row in rows {
        let data: String = row.get("data");
        let mut analysis: AudioAnalysis = serde_json::from_str(&data)?;
        analysis.id = row.get("id");
        analysis.timestamp = row.get("timestamp");
        history.push(analysis);
    }
    Ok(history)
}

/// Persist one analysis. Duplicate identifiers are a caller error and
/// surface as a database error.
pub async fn insert_analysis(pool: &SqlitePool, analysis: &AudioAnalysis) -> Result<()> {
    let data = serde_json::to_string(analysis)?;

    sqlx::query(
        r#"
        INSERT INTO history (id, timestamp, mood, detectedGenre, tempo, data)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&analysis.id)
    .bind(analysis.timestamp)
    .bind(&analysis.mood)
    .bind(&analysis.detected_genre)
    .bind(&analysis.tempo)
    .bind(&data)
    .execute(pool)
    .await?;

    Ok(())
}
