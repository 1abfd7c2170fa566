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

//! # Hotels Search Policy
//!
//! Business policy applied to every search: the default search origin,
//! radius and nightly price ceiling, the lodging categories that are never
//! shown, and the preferred hotel chains with their ranking priority.
//!
//! The built-in policy can be replaced by a TOML file, see `policy.example.toml`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Reference point used when the caller gives no coordinates (Tokyo, Chiyoda).
pub const DEFAULT_LATITUDE: f64 = 35.6994856;
pub const DEFAULT_LONGITUDE: f64 = 139.7532791;
pub const DEFAULT_RADIUS_KM: f64 = 2.0;
/// Nightly price ceiling in JPY.
pub const DEFAULT_MAX_PRICE: f64 = 15000.0;

/// Upper bound accepted by the upstream `searchRadius` parameter.
pub const MAX_RADIUS_KM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchDefaults {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub max_price: f64,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            radius_km: DEFAULT_RADIUS_KM,
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl SearchDefaults {
    pub fn origin(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A preferred hotel chain. Lower `priority` is shown first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRule {
    pub name: String,
    pub priority: u32,
    pub keywords: Vec<String>,
}

impl ChainRule {
    pub fn new(name: &str, priority: u32, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            priority,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// A keyword marking an excluded lodging category (dormitory, capsule...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionRule {
    pub keyword: String,
}

impl ExclusionRule {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse policy file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid policy: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchPolicy {
    pub defaults: SearchDefaults,
    pub excluded_types: Vec<ExclusionRule>,
    pub preferred_chains: Vec<ChainRule>,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            defaults: SearchDefaults::default(),
            excluded_types: default_excluded_types(),
            preferred_chains: default_preferred_chains(),
        }
    }
}

fn default_excluded_types() -> Vec<ExclusionRule> {
    [
        "ドミトリー",
        "カプセル",
        "カプセルホテル",
        "簡易宿泊",
        "ゲストハウス",
        "ホステル",
        "バックパッカー",
    ]
    .iter()
    .map(|k| ExclusionRule::new(k))
    .collect()
}

fn default_preferred_chains() -> Vec<ChainRule> {
    vec![
        ChainRule::new(
            "ルートインホテルズ",
            1,
            &["ルートイン", "ROUTE-INN", "ルート・イン", "ROUTEINN"],
        ),
        ChainRule::new(
            "東横INN",
            2,
            &["東横イン", "東横INN", "TOYOKO INN", "TOYOKO-INN"],
        ),
        ChainRule::new(
            "アパホテルズ&リゾーツ",
            3,
            &["アパホテル", "APA HOTEL", "アパ・ホテル", "アパヴィラ"],
        ),
        ChainRule::new(
            "スーパーホテル",
            4,
            &["スーパーホテル", "SUPER HOTEL", "スーパー・ホテル", "スーパーホテルLohas"],
        ),
        ChainRule::new(
            "リブマックスホテルズ&リゾーツ",
            5,
            &["リブマックス", "LIBEMAX", "リブ・マックス", "リブマックスリゾート"],
        ),
    ]
}

impl SearchPolicy {
    pub fn from_toml_str(content: &str) -> Result<Self, PolicyError> {
        Self::parse(content, "<inline>")
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, PolicyError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: display.clone(),
            source,
        })?;
        let policy = Self::parse(&content, &display)?;
        tracing::debug!(
            "Loaded policy from {}: {} exclusion(s), {} chain(s)",
            display,
            policy.excluded_types.len(),
            policy.preferred_chains.len()
        );
        Ok(policy)
    }

    fn parse(content: &str, path: &str) -> Result<Self, PolicyError> {
        let policy: SearchPolicy = toml::from_str(content).map_err(|source| PolicyError::Parse {
            path: path.to_string(),
            source,
        })?;
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> Result<(), PolicyError> {
        let d = &self.defaults;
        if !(d.latitude.is_finite() && (-90.0..=90.0).contains(&d.latitude)) {
            return Err(PolicyError::Invalid(format!(
                "default latitude {} out of range",
                d.latitude
            )));
        }
        if !(d.longitude.is_finite() && (-180.0..=180.0).contains(&d.longitude)) {
            return Err(PolicyError::Invalid(format!(
                "default longitude {} out of range",
                d.longitude
            )));
        }
        if !(d.radius_km.is_finite() && d.radius_km > 0.0 && d.radius_km <= MAX_RADIUS_KM) {
            return Err(PolicyError::Invalid(format!(
                "default radius {} km must be in (0, {}]",
                d.radius_km, MAX_RADIUS_KM
            )));
        }
        if !(d.max_price.is_finite() && d.max_price > 0.0) {
            return Err(PolicyError::Invalid(format!(
                "default max price {} must be positive",
                d.max_price
            )));
        }
        if self.excluded_types.iter().any(|r| r.keyword.trim().is_empty()) {
            return Err(PolicyError::Invalid("empty exclusion keyword".into()));
        }
        for chain in &self.preferred_chains {
            if chain.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(PolicyError::Invalid(format!(
                    "chain '{}' has an empty keyword",
                    chain.name
                )));
            }
        }
        Ok(())
    }
}
