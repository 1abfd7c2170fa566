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

//! # Rakuten Travel Search Client
//!
//! Effectful (network) operations: one bounded GET to the vacant-hotel-search
//! endpoint, then the pure validate/normalize/rank pipeline around it.

use crate::config::Credentials;
use crate::hotels_policy::SearchPolicy;
use crate::hotels_query_builder::{BuildError, SearchParams, UpstreamQuery, ValidationError};
use crate::hotels_ranking::{HotelRanker, RankedResult};
use crate::hotels_results_parser::VacantHotelSearchResponse;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Hotel API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("No response from hotel API: {0}")]
    NoResponse(String),
    #[error("Hotel API request failed: {0}")]
    Request(String),
    #[error("Unexpected hotel API response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Error body sent by the upstream on non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpstreamErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Clone)]
pub struct RakutenTravelClient {
    client: Arc<wreq::Client>,
    endpoint: String,
    timeout: Duration,
}

impl RakutenTravelClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = wreq::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Arc::new(client),
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single attempt, no retry.
    pub async fn fetch(
        &self,
        query: &UpstreamQuery,
    ) -> Result<VacantHotelSearchResponse, UpstreamError> {
        tracing::info!(
            "Fetching vacant hotels: {}",
            query.redacted_url(&self.endpoint)
        );

        let url = query.url(&self.endpoint);
        let http_start = Instant::now();
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| classify_send_error(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::NoResponse(e.to_string()))?;
        tracing::debug!(
            "[fetch] HTTP {} in {:?}, {} bytes",
            status.as_u16(),
            http_start.elapsed(),
            body.len()
        );

        if !status.is_success() {
            let message = upstream_error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::warn!("Hotel API error {}: {}", status.as_u16(), message);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(VacantHotelSearchResponse::from_json(&body)?)
    }
}

fn classify_send_error(e: wreq::Error, timeout: Duration) -> UpstreamError {
    if e.is_builder() {
        UpstreamError::Request(e.to_string())
    } else if e.is_timeout() {
        UpstreamError::NoResponse(format!("request timed out after {:?}", timeout))
    } else if e.is_connect() {
        UpstreamError::NoResponse(format!("could not connect: {e}"))
    } else {
        UpstreamError::Request(e.to_string())
    }
}

fn upstream_error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<UpstreamErrorBody>(body) {
        Ok(parsed) => parsed
            .error_description
            .or(parsed.error)
            .filter(|m| !m.is_empty()),
        Err(_) => {
            let preview: String = body.trim().chars().take(200).collect();
            (!preview.is_empty()).then_some(preview)
        }
    }
}

/// `getHotels` outcome: serializes as `{"result": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GetHotelsResponse {
    Result(RankedResult),
    Error(String),
}

impl From<Result<RankedResult, SearchError>> for GetHotelsResponse {
    fn from(outcome: Result<RankedResult, SearchError>) -> Self {
        match outcome {
            Ok(result) => GetHotelsResponse::Result(result),
            Err(e) => GetHotelsResponse::Error(e.to_string()),
        }
    }
}

/// The whole `getHotels` pipeline. Cheap to clone, safe to share across calls.
#[derive(Clone)]
pub struct HotelSearchService {
    client: RakutenTravelClient,
    credentials: Credentials,
    ranker: Arc<HotelRanker>,
}

impl HotelSearchService {
    pub fn new(client: RakutenTravelClient, credentials: Credentials, policy: &SearchPolicy) -> Self {
        Self {
            client,
            credentials,
            ranker: Arc::new(HotelRanker::new(policy)),
        }
    }

    pub fn ranker(&self) -> &HotelRanker {
        &self.ranker
    }

    /// Validates and builds the upstream query without sending it.
    pub fn prepare(&self, params: &SearchParams) -> Result<UpstreamQuery, SearchError> {
        let query = params.validate()?;
        Ok(query.to_upstream_query(self.ranker.defaults(), &self.credentials)?)
    }

    pub async fn search(&self, params: &SearchParams) -> Result<RankedResult, SearchError> {
        let overall_start = Instant::now();
        let query = params.validate()?;
        let upstream = query.to_upstream_query(self.ranker.defaults(), &self.credentials)?;

        let response = self.client.fetch(&upstream).await?;
        let (paging_info, records) = response.into_records();
        tracing::debug!(
            "Normalized {} hotel(s), upstream reports {} record(s)",
            records.len(),
            paging_info.record_count
        );

        let hotels = self.ranker.rank(records, &query);
        tracing::info!(
            "getHotels {} -> {} ({} night(s)): {} hotel(s) in {:?}",
            query.check_in,
            query.check_out,
            query.nights(),
            hotels.len(),
            overall_start.elapsed()
        );
        Ok(RankedResult {
            hotels,
            paging_info,
        })
    }

    pub async fn get_hotels(&self, params: &SearchParams) -> GetHotelsResponse {
        let outcome = self.search(params).await;
        if let Err(e) = &outcome {
            tracing::warn!("getHotels failed: {}", e);
        }
        outcome.into()
    }
}
