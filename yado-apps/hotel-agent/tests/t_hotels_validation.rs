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

//! Validation rules for `getHotels` arguments, checked in their fixed order.

use yado_hotel_agent::{SearchParams, ValidationError};

fn stay() -> SearchParams {
    SearchParams::new("2023-12-01", "2023-12-02")
}

#[test]
fn test_minimal_params_are_valid() {
    let query = stay().validate().expect("dates only should validate");
    assert_eq!(query.nights(), 1);
    assert_eq!(query.latitude, None);
    assert_eq!(query.longitude, None);
    assert_eq!(query.radius_km, None);
    assert_eq!(query.max_price, None);
}

#[test]
fn test_full_params_are_valid() {
    let query = SearchParams::new("2024-02-28", "2024-03-02")
        .origin(-33.8688, 151.2093)
        .radius_km(3.0)
        .max_price(9000.0)
        .validate()
        .expect("full params should validate");
    // 2024 is a leap year.
    assert_eq!(query.nights(), 3);
    assert_eq!(query.radius_km, Some(3.0));
    assert_eq!(query.max_price, Some(9000.0));
}

#[test]
fn test_missing_dates() {
    let none = SearchParams::default();
    assert_eq!(none.validate(), Err(ValidationError::MissingCheckIn));

    let no_checkout = SearchParams {
        check_in: Some("2023-12-01".to_string()),
        ..Default::default()
    };
    assert_eq!(no_checkout.validate(), Err(ValidationError::MissingCheckOut));

    let no_checkin = SearchParams {
        check_out: Some("2023-12-02".to_string()),
        ..Default::default()
    };
    assert_eq!(no_checkin.validate(), Err(ValidationError::MissingCheckIn));
}

#[test]
fn test_empty_date_counts_as_missing() {
    let params = SearchParams::new("", "2023-12-02");
    assert_eq!(params.validate(), Err(ValidationError::MissingCheckIn));

    let params = SearchParams::new("2023-12-01", "");
    assert_eq!(params.validate(), Err(ValidationError::MissingCheckOut));
}

#[test]
fn test_malformed_dates() {
    for bad in [
        "2023/12/01",
        "2023-12-1",
        "23-12-01",
        "20231201",
        "2023-12-01T00:00:00",
        " 2023-12-01",
        "tomorrow",
    ] {
        let params = SearchParams::new(bad, "2023-12-05");
        assert_eq!(
            params.validate(),
            Err(ValidationError::InvalidDateFormat),
            "check-in {:?} should be rejected",
            bad
        );
        let params = SearchParams::new("2023-11-30", bad);
        assert_eq!(
            params.validate(),
            Err(ValidationError::InvalidDateFormat),
            "check-out {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_impossible_calendar_date() {
    let params = SearchParams::new("2023-02-30", "2023-03-02");
    assert_eq!(params.validate(), Err(ValidationError::InvalidDateFormat));

    let params = SearchParams::new("2023-02-28", "2023-02-29");
    assert_eq!(params.validate(), Err(ValidationError::InvalidDateFormat));
}

#[test]
fn test_checkout_must_follow_checkin() {
    let same_day = SearchParams::new("2023-12-01", "2023-12-01");
    assert_eq!(
        same_day.validate(),
        Err(ValidationError::CheckOutNotAfterCheckIn)
    );

    let reversed = SearchParams::new("2023-12-02", "2023-12-01");
    assert_eq!(
        reversed.validate(),
        Err(ValidationError::CheckOutNotAfterCheckIn)
    );
}

#[test]
fn test_coordinate_bounds() {
    assert!(stay().origin(90.0, 180.0).validate().is_ok());
    assert!(stay().origin(-90.0, -180.0).validate().is_ok());

    assert_eq!(
        stay().origin(90.5, 139.0).validate(),
        Err(ValidationError::InvalidLatitude)
    );
    assert_eq!(
        stay().origin(35.0, -180.01).validate(),
        Err(ValidationError::InvalidLongitude)
    );
    assert_eq!(
        stay().origin(f64::NAN, 139.0).validate(),
        Err(ValidationError::InvalidLatitude)
    );
}

#[test]
fn test_radius_bounds() {
    assert!(stay().radius_km(0.1).validate().is_ok());
    assert!(stay().radius_km(3.0).validate().is_ok());

    for bad in [0.0, -1.0, 3.01, 10.0, f64::INFINITY] {
        assert_eq!(
            stay().radius_km(bad).validate(),
            Err(ValidationError::InvalidRadius),
            "radius {} should be rejected",
            bad
        );
    }
}

#[test]
fn test_max_price_must_be_positive() {
    assert!(stay().max_price(1.0).validate().is_ok());
    assert_eq!(
        stay().max_price(-1000.0).validate(),
        Err(ValidationError::InvalidMaxPrice)
    );
    assert_eq!(
        stay().max_price(0.0).validate(),
        Err(ValidationError::InvalidMaxPrice)
    );
}

#[test]
fn test_first_failure_wins() {
    // Every field is wrong, the check-in date is reported.
    let params = SearchParams {
        check_in: None,
        check_out: Some("bad".to_string()),
        latitude: Some(100.0),
        longitude: Some(200.0),
        radius_km: Some(5.0),
        max_price: Some(-1.0),
    };
    assert_eq!(params.validate(), Err(ValidationError::MissingCheckIn));

    let params = SearchParams::new("2023-12-02", "2023-12-01")
        .origin(100.0, 200.0)
        .radius_km(5.0);
    assert_eq!(
        params.validate(),
        Err(ValidationError::CheckOutNotAfterCheckIn)
    );

    let params = stay().origin(35.0, 200.0).radius_km(5.0).max_price(-1.0);
    assert_eq!(params.validate(), Err(ValidationError::InvalidLongitude));

    let params = stay().radius_km(5.0).max_price(-1.0);
    assert_eq!(params.validate(), Err(ValidationError::InvalidRadius));
}

#[test]
fn test_error_messages_are_human_readable() {
    assert_eq!(
        ValidationError::CheckOutNotAfterCheckIn.to_string(),
        "Check-out date must be after the check-in date"
    );
    assert_eq!(
        ValidationError::InvalidMaxPrice.to_string(),
        "Max price must be positive"
    );
    assert_eq!(
        ValidationError::InvalidDateFormat.to_string(),
        "Dates must use the YYYY-MM-DD format"
    );
}

#[test]
fn test_params_deserialize_from_tool_arguments() {
    let params: SearchParams = serde_json::from_value(serde_json::json!({
        "checkIn": "2023-12-01",
        "checkOut": "2023-12-03",
        "latitude": 35.68,
        "longitude": 139.76,
        "radiusKm": 1.5,
        "maxPrice": 12000
    }))
    .expect("tool arguments should deserialize");

    assert_eq!(params.check_in.as_deref(), Some("2023-12-01"));
    assert_eq!(params.radius_km, Some(1.5));
    assert_eq!(params.max_price, Some(12000.0));
    assert_eq!(params.validate().map(|q| q.nights()), Ok(2));
}
