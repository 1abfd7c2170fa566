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

//! # Hotels Results Parser
//!
//! Side-effect free decoding of the vacant-hotel-search JSON response.
//! Each upstream hotel arrives as a group of tagged items: one basic-info
//! item and any number of room-info lists. Normalization folds a group into
//! a single [`HotelRecord`].

use crate::hotels_policy::Coordinates;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Off-type or `null` values fall back to the field default instead of
/// failing the whole hotel.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(&value).unwrap_or_else(|e| {
        tracing::debug!("Ignoring malformed field value {}: {}", value, e);
        T::default()
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelBasicInfo {
    #[serde(deserialize_with = "lenient")]
    pub hotel_no: u64,
    #[serde(deserialize_with = "lenient")]
    pub hotel_name: String,
    #[serde(deserialize_with = "lenient")]
    pub hotel_information_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub plan_list_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub dp_plan_list_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub review_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hotel_kana_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hotel_special: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hotel_min_charge: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub postal_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub address1: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub address2: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub telephone_no: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub fax_no: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub access: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub parking_information: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub nearest_station: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hotel_image_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hotel_thumbnail_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub room_image_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub room_thumbnail_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub hotel_map_image_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub review_count: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub review_average: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub user_review: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomBasicInfo {
    #[serde(deserialize_with = "lenient")]
    pub room_class: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub room_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub plan_id: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub plan_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub point_rate: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub with_dinner_flag: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub dinner_select_flag: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub with_breakfast_flag: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub breakfast_select_flag: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub payment: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub reserve_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub salesform_flag: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyCharge {
    #[serde(deserialize_with = "lenient")]
    pub stay_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub rakuten_charge: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub total: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub charge_flag: Option<u32>,
}

/// One entry of a room-info list. Upstream splits the room/plan descriptor
/// and its daily charge into separate entries, so both are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomOffer {
    #[serde(
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub room_basic_info: Option<RoomBasicInfo>,
    #[serde(
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub daily_charge: Option<DailyCharge>,
}

/// Item of a hotel group, picked by key: `hotelBasicInfo` first, then
/// `roomInfo`. Everything else (rating/detail blocks) is `Other`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HotelGroupItem {
    BasicInfo {
        #[serde(rename = "hotelBasicInfo")]
        hotel_basic_info: HotelBasicInfo,
    },
    RoomInfo {
        #[serde(rename = "roomInfo")]
        room_info: Vec<RoomOffer>,
    },
    Other(Value),
}

impl<'de> Deserialize<'de> for HotelGroupItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(HotelGroupItem::from_value(Value::deserialize(deserializer)?))
    }
}

impl HotelGroupItem {
    fn from_value(value: Value) -> Self {
        if let Some(info) = value.get("hotelBasicInfo") {
            return match HotelBasicInfo::deserialize(info) {
                Ok(hotel_basic_info) => HotelGroupItem::BasicInfo { hotel_basic_info },
                Err(e) => {
                    tracing::warn!("Undecodable hotelBasicInfo: {}", e);
                    HotelGroupItem::Other(value)
                }
            };
        }
        if let Some(rooms) = value.get("roomInfo") {
            let Some(entries) = rooms.as_array() else {
                tracing::warn!("roomInfo is not a list: {}", rooms);
                return HotelGroupItem::Other(value);
            };
            let room_info = entries
                .iter()
                .filter_map(|entry| match RoomOffer::deserialize(entry) {
                    Ok(offer) => Some(offer),
                    Err(e) => {
                        tracing::warn!("Skipping undecodable room entry: {}", e);
                        None
                    }
                })
                .collect();
            return HotelGroupItem::RoomInfo { room_info };
        }
        HotelGroupItem::Other(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HotelGroup {
    Items(Vec<HotelGroupItem>),
    /// Older responses wrap the item list as `{"hotel": [...]}`.
    Wrapped { hotel: Vec<HotelGroupItem> },
    Malformed(Value),
}

impl HotelGroup {
    fn into_items(self) -> Vec<HotelGroupItem> {
        match self {
            HotelGroup::Items(items) | HotelGroup::Wrapped { hotel: items } => items,
            HotelGroup::Malformed(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PagingInfo {
    #[serde(deserialize_with = "lenient")]
    pub record_count: u32,
    #[serde(deserialize_with = "lenient")]
    pub page_count: u32,
    #[serde(deserialize_with = "lenient")]
    pub page: u32,
    #[serde(deserialize_with = "lenient")]
    pub first: u32,
    #[serde(deserialize_with = "lenient")]
    pub last: u32,
}

/// A `null` or off-type `pagingInfo`/`hotels` reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VacantHotelSearchResponse {
    #[serde(deserialize_with = "lenient")]
    pub paging_info: PagingInfo,
    #[serde(deserialize_with = "lenient")]
    pub hotels: Vec<HotelGroup>,
}

impl VacantHotelSearchResponse {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn into_records(self) -> (PagingInfo, Vec<HotelRecord>) {
        (self.paging_info, normalize_groups(self.hotels))
    }
}

/// A hotel with every room offer found in its upstream group, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRecord {
    pub hotel_basic_info: HotelBasicInfo,
    #[serde(default)]
    pub room_info_list: Vec<RoomOffer>,
}

impl HotelRecord {
    pub fn name(&self) -> &str {
        &self.hotel_basic_info.hotel_name
    }

    pub fn special(&self) -> &str {
        self.hotel_basic_info.hotel_special.as_deref().unwrap_or("")
    }

    pub fn min_charge(&self) -> Option<f64> {
        self.hotel_basic_info.hotel_min_charge
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (
            self.hotel_basic_info.latitude,
            self.hotel_basic_info.longitude,
        ) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

impl From<&HotelRecord> for HotelGroup {
    fn from(record: &HotelRecord) -> Self {
        HotelGroup::Items(vec![
            HotelGroupItem::BasicInfo {
                hotel_basic_info: record.hotel_basic_info.clone(),
            },
            HotelGroupItem::RoomInfo {
                room_info: record.room_info_list.clone(),
            },
        ])
    }
}

/// Groups without a basic-info item are dropped.
pub fn normalize_groups(groups: Vec<HotelGroup>) -> Vec<HotelRecord> {
    let total = groups.len();
    let records: Vec<HotelRecord> = groups
        .into_iter()
        .filter_map(|g| normalize_group(g.into_items()))
        .collect();
    if records.len() < total {
        tracing::warn!(
            "Dropped {} hotel group(s) without basic info",
            total - records.len()
        );
    }
    records
}

fn normalize_group(items: Vec<HotelGroupItem>) -> Option<HotelRecord> {
    let (basic, rooms) = items.into_iter().fold(
        (None, Vec::new()),
        |(basic, mut rooms), item| match item {
            HotelGroupItem::BasicInfo { hotel_basic_info } => {
                (basic.or(Some(hotel_basic_info)), rooms)
            }
            HotelGroupItem::RoomInfo { room_info } => {
                rooms.extend(room_info);
                (basic, rooms)
            }
            HotelGroupItem::Other(_) => (basic, rooms),
        },
    );
    basic.map(|hotel_basic_info| HotelRecord {
        hotel_basic_info,
        room_info_list: rooms,
    })
}
