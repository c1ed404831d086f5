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

//! Deep-link URL tests: fixed expected URLs plus single-field variations.

use chrono::NaiveDate;
use delulu_fare_scraper::{
    AirportDirectory, CabinClass, SEARCH_BASE_URL, SearchOptions, SearchOptionsBuilder,
    build_search_url,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn airports() -> AirportDirectory {
    AirportDirectory::bundled().unwrap()
}

fn base() -> SearchOptionsBuilder {
    SearchOptions::builder("HAN", "DAD", date(2025, 6, 1)).today(date(2025, 5, 1))
}

/// Split a URL into (path segments after the base, query pairs)
fn split(url: &str) -> (Vec<String>, Vec<(String, String)>) {
    let rest = url.strip_prefix(SEARCH_BASE_URL).expect("base prefix");
    let (path, query) = rest.split_once('?').expect("query string");
    assert!(path.ends_with('/'), "trailing slash missing: {}", path);
    let segments = path
        .trim_end_matches('/')
        .split('/')
        .map(str::to_string)
        .collect();
    let pairs = query
        .split('&')
        .map(|kv| {
            let (k, v) = kv.split_once('=').expect("key=value");
            (k.to_string(), v.to_string())
        })
        .collect();
    (segments, pairs)
}

#[test]
fn test_one_way_example() {
    let url = base().build(&airports()).unwrap().search_url();
    let (segments, _) = split(&url);
    assert_eq!(segments, vec!["han", "dad", "250601"]);
    assert!(url.contains("han/dad/250601/?"));
    assert!(url.ends_with(
        "?adults=1&cabinclass=economy&children=0&ref=home&rtn=0&preferdirects=false"
    ));
}

#[test]
fn test_round_trip_example() {
    let url = base()
        .return_date(date(2025, 6, 3))
        .build(&airports())
        .unwrap()
        .search_url();
    assert!(url.contains("han/dad/250601/250603/?"));
    assert!(url.ends_with(
        "?adults=1&cabinclass=economy&children=0&ref=home&rtn=1&preferdirects=false"
    ));
}

#[test]
fn test_query_parameter_order_is_fixed() {
    let url = base()
        .cabin_class(CabinClass::Business)
        .adults(3)
        .children(2)
        .prefer_direct(true)
        .build(&airports())
        .unwrap()
        .search_url();
    let (_, pairs) = split(&url);
    let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec!["adults", "cabinclass", "children", "ref", "rtn", "preferdirects"]
    );
}

#[test]
fn test_lowercase_input_codes_give_same_url() {
    let upper = base().build(&airports()).unwrap();
    let lower = SearchOptions::builder("han", "dad", date(2025, 6, 1))
        .today(date(2025, 5, 1))
        .build(&airports())
        .unwrap();
    assert_eq!(build_search_url(&upper), build_search_url(&lower));
}

/// Changing exactly one option changes exactly the matching URL part.
#[test]
fn test_single_field_changes_are_local() {
    let reference = split(&base().build(&airports()).unwrap().search_url());

    let cases: Vec<(&str, SearchOptionsBuilder, Option<usize>, Option<&str>)> = vec![
        (
            "from",
            SearchOptions::builder("SGN", "DAD", date(2025, 6, 1)).today(date(2025, 5, 1)),
            Some(0),
            None,
        ),
        (
            "to",
            SearchOptions::builder("HAN", "PQC", date(2025, 6, 1)).today(date(2025, 5, 1)),
            Some(1),
            None,
        ),
        (
            "departure",
            SearchOptions::builder("HAN", "DAD", date(2025, 7, 9)).today(date(2025, 5, 1)),
            Some(2),
            None,
        ),
        ("adults", base().adults(2), None, Some("adults")),
        ("children", base().children(1), None, Some("children")),
        ("cabin", base().cabin_class(CabinClass::First), None, Some("cabinclass")),
        ("direct", base().prefer_direct(true), None, Some("preferdirects")),
    ];

    for (label, builder, segment, param) in cases {
        let (segments, pairs) = split(&builder.build(&airports()).unwrap().search_url());
        assert_eq!(segments.len(), reference.0.len(), "{}", label);

        for (i, (got, want)) in segments.iter().zip(&reference.0).enumerate() {
            assert_eq!(got != want, segment == Some(i), "{}: segment {}", label, i);
        }
        for ((key, got), (_, want)) in pairs.iter().zip(&reference.1) {
            assert_eq!(
                got != want,
                param == Some(key.as_str()),
                "{}: parameter {}",
                label,
                key
            );
        }
    }
}

#[test]
fn test_url_is_stable_across_calls() {
    let options = base().return_date(date(2025, 6, 3)).build(&airports()).unwrap();
    let first = options.search_url();
    for _ in 0..10 {
        assert_eq!(options.search_url(), first);
    }
}
