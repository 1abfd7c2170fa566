//!  Yado Hotel Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Process Configuration
//!
//! Credentials and endpoint read from the environment once at startup.

use crate::hotels_policy::{PolicyError, SearchPolicy};
use std::path::PathBuf;
use thiserror::Error;

pub const VACANT_HOTEL_SEARCH_ENDPOINT: &str =
    "https://app.rakuten.co.jp/services/api/Travel/VacantHotelSearch/20170426";

pub const APPLICATION_ID_VAR: &str = "APPLICATION_ID";
pub const AFFILIATE_ID_VAR: &str = "AFFILIATE_ID";
pub const ENDPOINT_VAR: &str = "RAKUTEN_API_ENDPOINT";
pub const POLICY_FILE_VAR: &str = "YADO_POLICY_FILE";

/// Exit status for a missing or invalid configuration (sysexits `EX_CONFIG`).
pub const EXIT_CONFIG: i32 = 78;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),
}

/// Upstream API credentials. `Debug` never prints the values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub application_id: String,
    pub affiliate_id: Option<String>,
}

impl Credentials {
    pub fn new(application_id: impl Into<String>, affiliate_id: Option<String>) -> Self {
        Self {
            application_id: application_id.into(),
            affiliate_id,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("application_id", &"***")
            .field("affiliate_id", &self.affiliate_id.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub endpoint: String,
    pub policy_file: Option<PathBuf>,
}

impl AppConfig {
    /// Loads `.env` (if any) then reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary lookup so tests need no `set_var`.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let application_id = non_blank(APPLICATION_ID_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(APPLICATION_ID_VAR.to_string()))?;
        let affiliate_id = non_blank(AFFILIATE_ID_VAR);
        let endpoint =
            non_blank(ENDPOINT_VAR).unwrap_or_else(|| VACANT_HOTEL_SEARCH_ENDPOINT.to_string());
        let policy_file = non_blank(POLICY_FILE_VAR).map(PathBuf::from);

        Ok(Self {
            credentials: Credentials::new(application_id, affiliate_id),
            endpoint,
            policy_file,
        })
    }

    /// The policy file given on the command line wins over the environment.
    pub fn load_policy(&self, override_path: Option<&PathBuf>) -> Result<SearchPolicy, PolicyError> {
        match override_path.or(self.policy_file.as_ref()) {
            Some(path) => SearchPolicy::from_toml_file(path),
            None => Ok(SearchPolicy::default()),
        }
    }
}
