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

//! # Hotels Ranking
//!
//! Side-effect free filtering and ordering of normalized hotels:
//! excluded lodging types and over-budget hotels are removed, then preferred
//! chains come first (by priority) and everything else is ordered by
//! distance from the search origin.

use crate::hotels_policy::{Coordinates, SearchDefaults, SearchPolicy};
use crate::hotels_query_builder::SearchQuery;
use crate::hotels_results_parser::{HotelRecord, PagingInfo};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Final `getHotels` payload: ranked hotels plus the upstream paging block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub hotels: Vec<HotelRecord>,
    pub paging_info: PagingInfo,
}

struct ChainMatcher {
    priority: u32,
    keywords: Vec<String>,
}

#[derive(Debug)]
struct Annotated {
    hotel: HotelRecord,
    chain_priority: Option<u32>,
    distance_km: f64,
}

/// Filter and rank engine. Keywords are lowercased once at construction.
pub struct HotelRanker {
    defaults: SearchDefaults,
    exclusions: Vec<String>,
    chains: Vec<ChainMatcher>,
}

impl HotelRanker {
    pub fn new(policy: &SearchPolicy) -> Self {
        Self {
            defaults: policy.defaults.clone(),
            exclusions: policy
                .excluded_types
                .iter()
                .map(|r| r.keyword.to_lowercase())
                .collect(),
            chains: policy
                .preferred_chains
                .iter()
                .map(|c| ChainMatcher {
                    priority: c.priority,
                    keywords: c.keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect(),
        }
    }

    pub fn defaults(&self) -> &SearchDefaults {
        &self.defaults
    }

    pub fn is_excluded(&self, hotel: &HotelRecord) -> bool {
        let name = hotel.name().to_lowercase();
        let special = hotel.special().to_lowercase();
        self.exclusions
            .iter()
            .any(|k| name.contains(k.as_str()) || special.contains(k.as_str()))
    }

    /// Priority of the first chain rule matching the hotel name.
    pub fn chain_priority(&self, hotel: &HotelRecord) -> Option<u32> {
        let name = hotel.name().to_lowercase();
        self.chains
            .iter()
            .find(|c| c.keywords.iter().any(|k| name.contains(k.as_str())))
            .map(|c| c.priority)
    }

    /// Hotels without coordinates get an infinite distance.
    pub fn distance_km(&self, hotel: &HotelRecord, origin: Coordinates) -> f64 {
        hotel
            .coordinates()
            .map_or(f64::INFINITY, |c| haversine_km(origin, c))
    }

    pub fn rank(&self, hotels: Vec<HotelRecord>, query: &SearchQuery) -> Vec<HotelRecord> {
        let max_price = query.effective_max_price(&self.defaults);
        let origin = query.effective_origin(&self.defaults);
        let received = hotels.len();

        let mut annotated: Vec<Annotated> = hotels
            .into_iter()
            .filter(|h| !self.is_excluded(h))
            .filter(|h| h.min_charge().is_none_or(|charge| charge <= max_price))
            .map(|hotel| Annotated {
                chain_priority: self.chain_priority(&hotel),
                distance_km: self.distance_km(&hotel, origin),
                hotel,
            })
            .collect();

        // `sort_by` is stable, exact ties keep upstream order.
        annotated.sort_by(compare_ranked);

        tracing::debug!(
            "Ranked {} of {} hotel(s), {} chain match(es)",
            annotated.len(),
            received,
            annotated.iter().filter(|a| a.chain_priority.is_some()).count()
        );

        annotated.into_iter().map(|a| a.hotel).collect()
    }
}

fn compare_ranked(a: &Annotated, b: &Annotated) -> Ordering {
    match (a.chain_priority, b.chain_priority) {
        (Some(pa), Some(pb)) => pa
            .cmp(&pb)
            .then_with(|| a.distance_km.total_cmp(&b.distance_km)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.distance_km.total_cmp(&b.distance_km),
    }
}
