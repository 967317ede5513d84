//! Runtime enable/disable switch for REST routes
//!
//! Each route is identified by a stable three-digit code. The flags are read
//! from the settings store once, when the API router is built, and never
//! change afterwards; toggling a route takes effect on the next start.

use std::collections::HashMap;

use crate::db::SettingsRepository;
use crate::models::parse_flag;
use crate::utils::AppError;

/// REST routes guarded by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiRoute {
    ListGenerators,
    GetGenerator,
    CreateGenerator,
    UpdateGenerator,
}

impl ApiRoute {
    pub const ALL: [ApiRoute; 4] = [
        ApiRoute::ListGenerators,
        ApiRoute::GetGenerator,
        ApiRoute::CreateGenerator,
        ApiRoute::UpdateGenerator,
    ];

    /// Stable short code used as the settings key
    pub fn code(self) -> &'static str {
        match self {
            ApiRoute::ListGenerators => "006",
            ApiRoute::GetGenerator => "007",
            ApiRoute::CreateGenerator => "008",
            ApiRoute::UpdateGenerator => "009",
        }
    }

    /// Versioned resource path the route answers for
    pub fn path(self) -> &'static str {
        match self {
            ApiRoute::ListGenerators | ApiRoute::CreateGenerator => "v1/generators",
            ApiRoute::GetGenerator | ApiRoute::UpdateGenerator => "v1/generators/{id}",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.code() == code)
    }
}

/// Immutable snapshot of the route flags
#[derive(Debug, Clone, Default)]
pub struct RouteGate {
    flags: HashMap<String, bool>,
}

impl RouteGate {
    /// Build a gate from (code, stored value) pairs
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            flags: flags
                .into_iter()
                .map(|(code, value)| (code, parse_flag(&value)))
                .collect(),
        }
    }

    /// Read the current flags from the settings store
    pub async fn load(settings: &SettingsRepository) -> Result<Self, AppError> {
        let gate = Self::from_flags(settings.get_route_flags().await?);
        tracing::info!(
            enabled = ?gate.enabled_codes(),
            "Loaded REST route flags"
        );
        Ok(gate)
    }

    /// A route is enabled only when its flag is present and true
    pub fn is_enabled(&self, route: ApiRoute) -> bool {
        self.flags.get(route.code()).copied().unwrap_or(false)
    }

    /// Fail with the route-disabled error when the route is switched off
    pub fn check(&self, route: ApiRoute) -> Result<(), AppError> {
        if self.is_enabled(route) {
            Ok(())
        } else {
            tracing::debug!(route = route.code(), "Rejected request to disabled route");
            Err(AppError::RouteDisabled(route.code().to_string()))
        }
    }

    /// Codes of all enabled routes, sorted
    pub fn enabled_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .flags
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(code, _)| code.as_str())
            .collect();
        codes.sort_unstable();
        codes
    }
}
