//! Generator repository
//!
//! Rows are addressed by their integer id and every write is a single-row
//! statement, so concurrent requests sharing the pool need no extra locking;
//! concurrent updates of one generator are last-writer-wins.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{Generator, GeneratorPatch, NewGenerator};
use crate::utils::AppError;

#[derive(Debug, sqlx::FromRow)]
struct GeneratorRow {
    id: i64,
    name: String,
    charset: String,
    chunks: i64,
    chunk_length: i64,
    times_activated_max: Option<i64>,
    separator: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
    expires_in: Option<i64>,
    created_at: String,
    created_by: Option<i64>,
    updated_at: Option<String>,
    updated_by: Option<i64>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, charset, chunks, chunk_length, times_activated_max,
           separator, prefix, suffix, expires_in,
           created_at, created_by, updated_at, updated_by
    FROM generators
"#;

pub struct GeneratorRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GeneratorRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All generators, ordered by id
    pub async fn find_all(&self) -> Result<Vec<Generator>, AppError> {
        let rows = sqlx::query_as::<_, GeneratorRow>(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(row_to_generator).collect()
    }

    /// Look up a generator by id
    pub async fn find(&self, id: i64) -> Result<Generator, AppError> {
        if id <= 0 {
            return Err(not_found(id));
        }

        let row = sqlx::query_as::<_, GeneratorRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| not_found(id))?;

        row_to_generator(row)
    }

    /// Validate and store a new generator
    pub async fn insert(&self, new: &NewGenerator, actor: Option<i64>) -> Result<Generator, AppError> {
        new.validate()?;

        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO generators (
                name, charset, chunks, chunk_length, times_activated_max,
                separator, prefix, suffix, expires_in, created_at, created_by
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.name.as_deref())
        .bind(new.charset.as_deref())
        .bind(new.chunks.map(i64::from))
        .bind(new.chunk_length.map(i64::from))
        .bind(new.times_activated_max.map(i64::from))
        .bind(new.separator.as_deref())
        .bind(new.prefix.as_deref())
        .bind(new.suffix.as_deref())
        .bind(new.expires_in.map(i64::from))
        .bind(created_at.to_rfc3339())
        .bind(actor)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(generator_id = id, "Generator inserted");

        match self.find(id).await {
            Err(AppError::NotFound(_)) => Err(AppError::Database(
                "Failed to retrieve created generator".to_string(),
            )),
            other => other,
        }
    }

    /// Validate a partial update and merge it into the stored generator
    pub async fn update(
        &self,
        id: i64,
        patch: &GeneratorPatch,
        actor: Option<i64>,
    ) -> Result<Generator, AppError> {
        patch.validate()?;

        let mut generator = self.find(id).await?;
        generator.apply(patch);
        generator.updated_at = Some(Utc::now());
        generator.updated_by = actor;

        let result = sqlx::query(
            r#"
            UPDATE generators
            SET name = ?, charset = ?, chunks = ?, chunk_length = ?,
                times_activated_max = ?, separator = ?, prefix = ?, suffix = ?,
                expires_in = ?, updated_at = ?, updated_by = ?
            WHERE id = ?
            "#,
        )
        .bind(&generator.name)
        .bind(&generator.charset)
        .bind(i64::from(generator.chunks))
        .bind(i64::from(generator.chunk_length))
        .bind(generator.times_activated_max.map(i64::from))
        .bind(generator.separator.as_deref())
        .bind(generator.prefix.as_deref())
        .bind(generator.suffix.as_deref())
        .bind(generator.expires_in.map(i64::from))
        .bind(generator.updated_at.map(|t| t.to_rfc3339()))
        .bind(generator.updated_by)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(generator)
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(format!("Generator with ID: {} could not be found.", id))
}

fn row_to_generator(row: GeneratorRow) -> Result<Generator, AppError> {
    Ok(Generator {
        id: row.id,
        name: row.name,
        charset: row.charset,
        chunks: to_u32(row.chunks, "chunks")?,
        chunk_length: to_u32(row.chunk_length, "chunk_length")?,
        times_activated_max: row
            .times_activated_max
            .map(|v| to_u32(v, "times_activated_max"))
            .transpose()?,
        separator: row.separator,
        prefix: row.prefix,
        suffix: row.suffix,
        expires_in: row
            .expires_in
            .map(|v| to_u32(v, "expires_in"))
            .transpose()?,
        created_at: parse_db_timestamp(&row.created_at, "created_at")?,
        created_by: row.created_by,
        updated_at: row
            .updated_at
            .as_deref()
            .map(|ts| parse_db_timestamp(ts, "updated_at"))
            .transpose()?,
        updated_by: row.updated_by,
    })
}

fn to_u32(value: i64, column: &str) -> Result<u32, AppError> {
    u32::try_from(value)
        .map_err(|_| AppError::Database(format!("Corrupt generator column {}: {}", column, value)))
}

fn parse_db_timestamp(ts: &str, column: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
    }
    Err(AppError::Database(format!(
        "Corrupt generator column {}: {}",
        column, ts
    )))
}
