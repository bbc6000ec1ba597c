//! Raw page and extraction persistence.

use sqlx::{PgPool, Row};

use super::Result;

/// Postgres-backed repository for fetched markup and extraction payloads.
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store fetched markup for a URL, overwriting any previous fetch.
    /// Returns the raw page id.
    pub async fn insert_raw_page(
        &self,
        url_id: i64,
        url: &str,
        html: Option<&str>,
        status_code: Option<i32>,
        content_type: Option<&str>,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO raw_pages (url_id, url, html, status_code, content_type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (url_id)
            DO UPDATE SET html = $3, status_code = $4, content_type = $5, fetched_at = now()
            RETURNING id
            "#,
        )
        .bind(url_id)
        .bind(url)
        .bind(html)
        .bind(status_code)
        .bind(content_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<i64, _>("id"))
    }

    /// Store the extraction for a URL, overwriting any previous one.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_extraction(
        &self,
        url_id: i64,
        page_id: i64,
        schema_name: &str,
        payload: &serde_json::Value,
        confidence: f64,
        geo_score: f64,
        signals: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO extractions (url_id, page_id, schema_name, payload, confidence, geo_score, signals)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (url_id)
            DO UPDATE SET
                page_id = $2,
                schema_name = $3,
                payload = $4,
                confidence = $5,
                geo_score = $6,
                signals = $7,
                extracted_at = now()
            "#,
        )
        .bind(url_id)
        .bind(page_id)
        .bind(schema_name)
        .bind(payload)
        .bind(confidence.clamp(0.0, 1.0))
        .bind(geo_score.clamp(0.0, 1.0))
        .bind(signals)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
