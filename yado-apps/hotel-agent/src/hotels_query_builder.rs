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

//! # Hotels Query Builder
//!
//! Side-effect free validation of the caller's search parameters and
//! construction of the upstream vacant-hotel-search query.

use crate::config::Credentials;
use crate::hotels_policy::{Coordinates, MAX_RADIUS_KM, SearchDefaults};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Response layout where each hotel is a flat list of tagged items.
pub const FORMAT_VERSION: u32 = 2;
/// World geodetic system, coordinates in degrees.
pub const DATUM_TYPE: u32 = 1;

const REDACTED: &str = "***";

static STRICT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Check-in date is required")]
    MissingCheckIn,
    #[error("Check-out date is required")]
    MissingCheckOut,
    #[error("Dates must use the YYYY-MM-DD format")]
    InvalidDateFormat,
    #[error("Check-out date must be after the check-in date")]
    CheckOutNotAfterCheckIn,
    #[error("Latitude must be between -90 and 90")]
    InvalidLatitude,
    #[error("Longitude must be between -180 and 180")]
    InvalidLongitude,
    #[error("Search radius must be greater than 0 and at most 3 km")]
    InvalidRadius,
    #[error("Max price must be positive")]
    InvalidMaxPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Application ID is not configured")]
    MissingApplicationId,
}

/// Raw `getHotels` arguments as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "mcp", schemars(transform = require_stay_dates))]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Check-in date (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    /// Check-out date (YYYY-MM-DD), strictly after check-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    /// Latitude of the search origin in degrees (default: central Tokyo)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude of the search origin in degrees (default: central Tokyo)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Search radius in km, greater than 0 and at most 3 (default: 2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,
    /// Maximum nightly price in JPY (default: 15000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

// Deserialization keeps the dates optional so a missing one is reported by
// `validate`, but callers should still see them as required.
#[cfg(feature = "mcp")]
fn require_stay_dates(schema: &mut schemars::Schema) {
    schema.insert(
        "required".to_string(),
        serde_json::json!(["checkIn", "checkOut"]),
    );
}

impl SearchParams {
    pub fn new(check_in: impl Into<String>, check_out: impl Into<String>) -> Self {
        Self {
            check_in: Some(check_in.into()),
            check_out: Some(check_out.into()),
            ..Default::default()
        }
    }

    pub fn origin(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    pub fn max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(&self) -> Result<SearchQuery, ValidationError> {
        let check_in = present(&self.check_in).ok_or(ValidationError::MissingCheckIn)?;
        let check_out = present(&self.check_out).ok_or(ValidationError::MissingCheckOut)?;

        let (Some(check_in), Some(check_out)) =
            (parse_strict_date(check_in), parse_strict_date(check_out))
        else {
            return Err(ValidationError::InvalidDateFormat);
        };
        if check_out <= check_in {
            return Err(ValidationError::CheckOutNotAfterCheckIn);
        }

        check_optional(
            self.latitude,
            |v| (-90.0..=90.0).contains(&v),
            ValidationError::InvalidLatitude,
        )?;
        check_optional(
            self.longitude,
            |v| (-180.0..=180.0).contains(&v),
            ValidationError::InvalidLongitude,
        )?;
        check_optional(
            self.radius_km,
            |v| v > 0.0 && v <= MAX_RADIUS_KM,
            ValidationError::InvalidRadius,
        )?;
        check_optional(self.max_price, |v| v > 0.0, ValidationError::InvalidMaxPrice)?;

        Ok(SearchQuery {
            check_in,
            check_out,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_km: self.radius_km,
            max_price: self.max_price,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// chrono alone accepts `2024-1-5` or a signed year, hence the pattern check.
fn parse_strict_date(s: &str) -> Option<NaiveDate> {
    if !STRICT_DATE_RE.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn check_optional(
    value: Option<f64>,
    in_range: impl Fn(f64) -> bool,
    error: ValidationError,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(v.is_finite() && in_range(v)) => Err(error),
        _ => Ok(()),
    }
}

/// A validated search. Unset optional fields fall back to the policy defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchQuery {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn effective_origin(&self, defaults: &SearchDefaults) -> Coordinates {
        let origin = defaults.origin();
        Coordinates::new(
            self.latitude.unwrap_or(origin.latitude),
            self.longitude.unwrap_or(origin.longitude),
        )
    }

    pub fn effective_radius_km(&self, defaults: &SearchDefaults) -> f64 {
        self.radius_km.unwrap_or(defaults.radius_km)
    }

    pub fn effective_max_price(&self, defaults: &SearchDefaults) -> f64 {
        self.max_price.unwrap_or(defaults.max_price)
    }

    pub fn to_upstream_query(
        &self,
        defaults: &SearchDefaults,
        credentials: &Credentials,
    ) -> Result<UpstreamQuery, BuildError> {
        if credentials.application_id.trim().is_empty() {
            return Err(BuildError::MissingApplicationId);
        }
        let origin = self.effective_origin(defaults);

        let mut pairs = vec![
            ("applicationId", credentials.application_id.clone()),
            ("formatVersion", FORMAT_VERSION.to_string()),
            ("datumType", DATUM_TYPE.to_string()),
            ("checkinDate", self.check_in.format("%Y-%m-%d").to_string()),
            ("checkoutDate", self.check_out.format("%Y-%m-%d").to_string()),
            ("latitude", origin.latitude.to_string()),
            ("longitude", origin.longitude.to_string()),
            ("searchRadius", self.effective_radius_km(defaults).to_string()),
        ];
        if let Some(affiliate_id) = credentials
            .affiliate_id
            .as_ref()
            .filter(|id| !id.trim().is_empty())
        {
            pairs.push(("affiliateId", affiliate_id.clone()));
        }
        Ok(UpstreamQuery { pairs })
    }
}

/// Ordered query parameters for one upstream call.
#[derive(Clone, PartialEq)]
pub struct UpstreamQuery {
    pairs: Vec<(&'static str, String)>,
}

impl UpstreamQuery {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn to_query_string(&self) -> String {
        encode_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
    }

    /// Same as [`Self::to_query_string`] with credentials masked, for logs and dry runs.
    pub fn to_redacted_query_string(&self) -> String {
        encode_pairs(self.pairs.iter().map(|(k, v)| match *k {
            "applicationId" | "affiliateId" => (*k, REDACTED),
            _ => (*k, v.as_str()),
        }))
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}?{}", endpoint, self.to_query_string())
    }

    pub fn redacted_url(&self, endpoint: &str) -> String {
        format!("{}?{}", endpoint, self.to_redacted_query_string())
    }
}

impl std::fmt::Debug for UpstreamQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UpstreamQuery")
            .field(&self.to_redacted_query_string())
            .finish()
    }
}

fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("app-id", None)
    }

    #[test]
    fn strict_date_pattern_rejects_lenient_forms() {
        for bad in ["invalid-date", "2024-1-05", "+2024-01-05", "2024-01-05T00:00", "2024-02-30"] {
            assert_eq!(parse_strict_date(bad), None, "{bad} should be rejected");
        }
        assert_eq!(
            parse_strict_date("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn nights_counts_calendar_days() {
        let query = SearchParams::new("2023-12-30", "2024-01-02").validate().unwrap();
        assert_eq!(query.nights(), 3);
    }

    #[test]
    fn upstream_query_uses_defaults() {
        let query = SearchParams::new("2023-12-01", "2023-12-02").validate().unwrap();
        let upstream = query
            .to_upstream_query(&SearchDefaults::default(), &credentials())
            .unwrap();
        assert_eq!(upstream.get("applicationId"), Some("app-id"));
        assert_eq!(upstream.get("formatVersion"), Some("2"));
        assert_eq!(upstream.get("datumType"), Some("1"));
        assert_eq!(upstream.get("checkinDate"), Some("2023-12-01"));
        assert_eq!(upstream.get("checkoutDate"), Some("2023-12-02"));
        assert_eq!(upstream.get("latitude"), Some("35.6994856"));
        assert_eq!(upstream.get("longitude"), Some("139.7532791"));
        assert_eq!(upstream.get("searchRadius"), Some("2"));
        assert_eq!(upstream.get("affiliateId"), None);
    }

    #[test]
    fn upstream_query_prefers_caller_values() {
        let query = SearchParams::new("2023-12-01", "2023-12-02")
            .origin(34.6937, 135.5023)
            .radius_km(1.5)
            .validate()
            .unwrap();
        let creds = Credentials::new("app-id", Some("aff-id".into()));
        let upstream = query
            .to_upstream_query(&SearchDefaults::default(), &creds)
            .unwrap();
        assert_eq!(upstream.get("latitude"), Some("34.6937"));
        assert_eq!(upstream.get("longitude"), Some("135.5023"));
        assert_eq!(upstream.get("searchRadius"), Some("1.5"));
        assert_eq!(upstream.pairs().last().map(|(k, _)| *k), Some("affiliateId"));
    }

    #[test]
    fn effective_origin_fills_missing_axis_from_policy() {
        let defaults = SearchDefaults {
            latitude: 43.0687,
            longitude: 141.3508,
            ..SearchDefaults::default()
        };
        let query = SearchParams {
            latitude: Some(43.1),
            ..SearchParams::new("2023-12-01", "2023-12-02")
        }
        .validate()
        .unwrap();
        assert_eq!(
            query.effective_origin(&defaults),
            Coordinates::new(43.1, 141.3508)
        );
    }

    #[test]
    fn blank_application_id_fails_the_build() {
        let query = SearchParams::new("2023-12-01", "2023-12-02").validate().unwrap();
        let err = query
            .to_upstream_query(&SearchDefaults::default(), &Credentials::new(" ", None))
            .unwrap_err();
        assert_eq!(err, BuildError::MissingApplicationId);
    }

    #[test]
    fn redacted_query_hides_credentials() {
        let query = SearchParams::new("2023-12-01", "2023-12-02").validate().unwrap();
        let creds = Credentials::new("secret-app", Some("secret-aff".into()));
        let upstream = query
            .to_upstream_query(&SearchDefaults::default(), &creds)
            .unwrap();
        let redacted = upstream.redacted_url("https://example.test/search");
        assert!(!redacted.contains("secret"), "leaked: {redacted}");
        assert!(redacted.contains("applicationId=%2A%2A%2A"));
        assert!(upstream.to_query_string().contains("applicationId=secret-app"));
        assert!(!format!("{upstream:?}").contains("secret"));
    }
}
