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

// Library for yado-hotel-agent
// Nearby vacant-hotel search (Rakuten Travel) exposed as an MCP tool and a CLI

pub mod config;
mod hotels_policy;
mod hotels_query_builder;
mod hotels_ranking;
mod hotels_results_parser;
mod hotels_search;

pub use config::{AppConfig, ConfigError, Credentials, EXIT_CONFIG, VACANT_HOTEL_SEARCH_ENDPOINT};

// Re-export hotels_policy
pub use hotels_policy::{
    ChainRule, Coordinates, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_MAX_PRICE,
    DEFAULT_RADIUS_KM, ExclusionRule, PolicyError, SearchDefaults, SearchPolicy,
};

// Re-export hotels_query_builder
pub use hotels_query_builder::{
    BuildError, DATUM_TYPE, FORMAT_VERSION, SearchParams, SearchQuery, UpstreamQuery,
    ValidationError,
};

// Re-export hotels_results_parser
pub use hotels_results_parser::{
    DailyCharge, HotelBasicInfo, HotelGroup, HotelGroupItem, HotelRecord, PagingInfo,
    RoomBasicInfo, RoomOffer, VacantHotelSearchResponse, normalize_groups,
};

// Re-export hotels_ranking
pub use hotels_ranking::{EARTH_RADIUS_KM, HotelRanker, RankedResult, haversine_km};

// Re-export hotels_search
pub use hotels_search::{
    GetHotelsResponse, HotelSearchService, REQUEST_TIMEOUT, RakutenTravelClient, SearchError,
    UpstreamError,
};
