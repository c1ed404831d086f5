//!  Delulu Fare Scraper
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

//! Validation tests for raw search requests.

use chrono::NaiveDate;
use delulu_fare_scraper::{AirportDirectory, CabinClass, Field, SearchOptions, SearchRequest};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
}

fn airports() -> AirportDirectory {
    AirportDirectory::bundled().unwrap()
}

fn valid() -> SearchRequest {
    SearchRequest {
        from_airport: "HAN".to_string(),
        to_airport: "DAD".to_string(),
        departure_date: "2025-06-01".to_string(),
        return_date: Some("2025-06-03".to_string()),
        adults: 1,
        children: 0,
        cabin_class: "economy".to_string(),
        prefer_direct: false,
    }
}

fn failed_fields(request: &SearchRequest) -> Vec<Field> {
    SearchOptions::validate(request, &airports(), today())
        .unwrap_err()
        .fields()
        .collect()
}

#[test]
fn test_valid_request_passes() {
    let options = SearchOptions::validate(&valid(), &airports(), today()).unwrap();
    assert_eq!(options.adults(), 1);
    assert_eq!(options.children(), 0);
    assert_eq!(options.cabin_class(), CabinClass::Economy);
    assert!(!options.prefer_direct());
}

#[test]
fn test_start_date_today_rejected() {
    let request = SearchRequest {
        departure_date: "2025-05-20".to_string(),
        return_date: None,
        ..valid()
    };
    let errors = SearchOptions::validate(&request, &airports(), today()).unwrap_err();
    assert_eq!(errors.len(), 1);
    let error = errors.get(Field::StartDate).unwrap();
    assert!(error.reason.contains("2025-05-21"), "{}", error.reason);
    assert!(errors.to_string().contains("start_date"));
}

#[test]
fn test_end_date_before_start_rejected() {
    for (from, to) in [("HAN", "DAD"), ("han", "dad")] {
        let request = SearchRequest {
            from_airport: from.to_string(),
            to_airport: to.to_string(),
            return_date: Some("2025-05-30".to_string()),
            ..valid()
        };
        assert_eq!(failed_fields(&request), vec![Field::EndDate]);
    }
}

#[test]
fn test_unknown_airports_rejected_case_insensitively() {
    for code in ["xxx", "XXX", "", "  "] {
        let request = SearchRequest {
            from_airport: code.to_string(),
            ..valid()
        };
        assert_eq!(failed_fields(&request), vec![Field::FromAirport], "code {:?}", code);
    }
    for code in ["dad", "DAD", "Dad"] {
        let request = SearchRequest {
            to_airport: code.to_string(),
            ..valid()
        };
        let options = SearchOptions::validate(&request, &airports(), today()).unwrap();
        assert_eq!(options.to_airport().as_str(), "DAD");
    }
}

#[test]
fn test_passenger_ranges() {
    let no_adults = SearchRequest { adults: 0, ..valid() };
    assert_eq!(failed_fields(&no_adults), vec![Field::Adults]);

    let negative_children = SearchRequest { children: -1, ..valid() };
    assert_eq!(failed_fields(&negative_children), vec![Field::Children]);

    let huge = SearchRequest { adults: i64::MAX, ..valid() };
    assert_eq!(failed_fields(&huge), vec![Field::Adults]);

    let family = SearchRequest { adults: 2, children: 3, ..valid() };
    let options = SearchOptions::validate(&family, &airports(), today()).unwrap();
    assert_eq!((options.adults(), options.children()), (2, 3));
}

#[test]
fn test_cabin_class_closed_set() {
    for cabin in ["coach", "premium_economy", ""] {
        let request = SearchRequest {
            cabin_class: cabin.to_string(),
            ..valid()
        };
        assert_eq!(failed_fields(&request), vec![Field::CabinClass], "{:?}", cabin);
    }
}

#[test]
fn test_all_independent_failures_collected() {
    let request = SearchRequest {
        from_airport: "ZZZ".to_string(),
        to_airport: "YYY".to_string(),
        departure_date: "not-a-date".to_string(),
        return_date: Some("also-not-a-date".to_string()),
        adults: 0,
        children: -2,
        cabin_class: "steerage".to_string(),
        prefer_direct: true,
    };
    let errors = SearchOptions::validate(&request, &airports(), today()).unwrap_err();
    for field in [
        Field::FromAirport,
        Field::ToAirport,
        Field::StartDate,
        Field::EndDate,
        Field::Adults,
        Field::Children,
        Field::CabinClass,
    ] {
        assert_eq!(
            errors.fields().filter(|f| *f == field).count(),
            1,
            "{} reported once",
            field
        );
    }
}

#[test]
fn test_cross_field_check_skipped_after_start_failure() {
    let request = SearchRequest {
        departure_date: "garbage".to_string(),
        return_date: Some("2025-05-25".to_string()),
        ..valid()
    };
    assert_eq!(failed_fields(&request), vec![Field::StartDate]);
}

#[test]
fn test_unparsable_end_date_still_checks_start() {
    let request = SearchRequest {
        departure_date: "2025-05-01".to_string(),
        return_date: Some("June 3rd".to_string()),
        ..valid()
    };
    assert_eq!(failed_fields(&request), vec![Field::EndDate, Field::StartDate]);
}

#[test]
fn test_unparsable_end_date_with_valid_start_rejected() {
    for raw in ["June 3rd", "2025-13-01", "03/06/2025"] {
        let request = SearchRequest {
            return_date: Some(raw.to_string()),
            ..valid()
        };
        let errors = SearchOptions::validate(&request, &airports(), today()).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![Field::EndDate], "{:?}", raw);
        assert!(errors.errors()[0].reason.contains(raw), "{}", errors);
    }
}
