//! Settings repository - database operations for settings

use std::collections::BTreeMap;

use crate::models::{flag_value, route_setting_key, Setting, ROUTE_SETTING_PREFIX};
use crate::utils::AppError;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

pub struct SettingsRepository {
    pool: Pool<Sqlite>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get a setting by key
    pub async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            SELECT key, value, description, created_at, updated_at
            FROM settings
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Get all settings with a key prefix
    pub async fn get_settings_by_prefix(&self, prefix: &str) -> Result<Vec<Setting>, AppError> {
        let pattern = format!("{}%", prefix);
        let settings = sqlx::query_as::<_, Setting>(
            r#"
            SELECT key, value, description, created_at, updated_at
            FROM settings
            WHERE key LIKE ?
            ORDER BY key
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Set or update a setting
    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                description = COALESCE(excluded.description, description),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a setting only if the key is not present yet
    pub async fn insert_if_missing(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<bool, AppError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO settings (key, value, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get the stored route flags as (code, raw value) pairs
    pub async fn get_route_flags(&self) -> Result<Vec<(String, String)>, AppError> {
        let settings = self.get_settings_by_prefix(ROUTE_SETTING_PREFIX).await?;

        Ok(settings
            .into_iter()
            .filter_map(|s| {
                s.key
                    .strip_prefix(ROUTE_SETTING_PREFIX)
                    .map(|code| (code.to_string(), s.value))
            })
            .collect())
    }

    /// Enable or disable a single route
    pub async fn set_route_flag(&self, code: &str, enabled: bool) -> Result<(), AppError> {
        self.set_setting(&route_setting_key(code), flag_value(enabled), None)
            .await
    }

    /// Seed default route flags without overwriting stored ones.
    ///
    /// Returns the number of flags that were newly written.
    pub async fn seed_route_flags(&self, defaults: &BTreeMap<String, bool>) -> Result<usize, AppError> {
        let mut seeded = 0;
        for (code, enabled) in defaults {
            let description = format!("Enable REST route {}", code);
            if self
                .insert_if_missing(&route_setting_key(code), flag_value(*enabled), Some(&description))
                .await?
            {
                seeded += 1;
            }
        }
        Ok(seeded)
    }
}
