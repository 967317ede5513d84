//! Settings models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Key prefix under which route flags are stored
pub const ROUTE_SETTING_PREFIX: &str = "api.route.";

/// Application setting (key-value)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Settings key holding the enable flag of a route
pub fn route_setting_key(code: &str) -> String {
    format!("{}{}", ROUTE_SETTING_PREFIX, code)
}

/// Interpret a stored flag value
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Render a flag for storage
pub fn flag_value(enabled: bool) -> &'static str {
    if enabled {
        "true"
    } else {
        "false"
    }
}
