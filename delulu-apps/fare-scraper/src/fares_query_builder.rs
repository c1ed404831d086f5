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

//! # Fares Query Builder
//!
//! Side-effect free deep-link construction for Skyscanner fare searches.

use chrono::NaiveDate;

use crate::fares_search_options::SearchOptions;

pub const SEARCH_BASE_URL: &str = "https://www.skyscanner.com.vn/transport/flights/";

/// Dates in the URL path are `yymmdd`
fn path_date(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Build the search URL for validated options.
///
/// `<base>/<from>/<to>/<yymmdd>/[<yymmdd>/]?adults=..&cabinclass=..&children=..&ref=home&rtn=..&preferdirects=..`
///
/// Every value is already a URL-safe token, so nothing is escaped.
pub fn build_search_url(options: &SearchOptions) -> String {
    let mut path = format!(
        "{}/{}/{}/",
        options.from_airport().as_str().to_ascii_lowercase(),
        options.to_airport().as_str().to_ascii_lowercase(),
        path_date(options.departure_date()),
    );
    if let Some(return_date) = options.return_date() {
        path.push_str(&path_date(return_date));
        path.push('/');
    }

    let query = [
        ("adults", options.adults().to_string()),
        ("cabinclass", options.cabin_class().as_str().to_string()),
        ("children", options.children().to_string()),
        ("ref", "home".to_string()),
        ("rtn", u8::from(options.return_date().is_some()).to_string()),
        ("preferdirects", options.prefer_direct().to_string()),
    ]
    .iter()
    .map(|(key, value)| format!("{}={}", key, value))
    .collect::<Vec<_>>()
    .join("&");

    format!("{}{}?{}", SEARCH_BASE_URL, path, query)
}

impl SearchOptions {
    pub fn search_url(&self) -> String {
        build_search_url(self)
    }
}
