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

// Library for delulu-fare-scraper
// Skyscanner fare search through a headless browser

mod browser_session;
mod fares_query_builder;
mod fares_results_parser;
mod fares_search;
mod fares_search_options;
mod user_agent;

pub use delulu_airport_codes::{AirportDataError, AirportDirectory};

pub use browser_session::{
    BrowserSession, DEFAULT_WEBDRIVER_URL, DriverLauncher, FetchOutcome, FirefoxLauncher,
    PageDriver, SessionConfig, SessionError, SessionReport, SessionState,
};
pub use fares_query_builder::{SEARCH_BASE_URL, build_search_url};
pub use fares_results_parser::{
    FareTile, RESULTS_CONTAINER_SELECTOR, RESULTS_READY_SELECTOR, parse_fare_tiles,
};
pub use fares_search::{DemoRequest, FareSearchClient, FareSearchResult, SearchRequestSource};
pub use fares_search_options::{
    AirportCode, CabinClass, DateRange, Field, SearchOptions, SearchOptionsBuilder, SearchRequest,
    UnknownAirport, UnknownCabinClass, ValidationError, ValidationErrors, parse_calendar_date,
};
pub use user_agent::{FixedUserAgent, RandomUserAgent, UserAgentSource};
