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

//! # Fare Search Client
//!
//! Ties the pieces together: validated options -> deep link -> browser
//! session -> fare tiles. Callers only decide where the raw request comes
//! from, through [`SearchRequestSource`].

use chrono::{Days, NaiveDate};
use delulu_airport_codes::AirportDirectory;
use serde::Serialize;

use crate::browser_session::{
    BrowserSession, DriverLauncher, FirefoxLauncher, SessionConfig, SessionReport,
};
use crate::fares_results_parser::{FareTile, parse_fare_tiles};
use crate::fares_search_options::{SearchOptions, SearchRequest, ValidationErrors};
use crate::user_agent::{RandomUserAgent, UserAgentSource};

/// Where a search request comes from (command line, fixed values, ...)
pub trait SearchRequestSource {
    fn search_request(&self) -> SearchRequest;
}

impl SearchRequestSource for SearchRequest {
    fn search_request(&self) -> SearchRequest {
        self.clone()
    }
}

/// Fixed sample search: Hanoi to Da Nang, leaving the day after `today`,
/// back two days later, one adult in economy, direct flights preferred.
#[derive(Debug, Clone, Copy)]
pub struct DemoRequest {
    pub today: NaiveDate,
}

impl SearchRequestSource for DemoRequest {
    fn search_request(&self) -> SearchRequest {
        let departure = self.today + Days::new(1);
        let return_date = departure + Days::new(2);
        SearchRequest {
            from_airport: "han".to_string(),
            to_airport: "dad".to_string(),
            departure_date: departure.format("%Y-%m-%d").to_string(),
            return_date: Some(return_date.format("%Y-%m-%d").to_string()),
            adults: 1,
            children: 0,
            cabin_class: "economy".to_string(),
            prefer_direct: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FareSearchResult {
    pub options: SearchOptions,
    pub search_url: String,
    pub tiles: Vec<FareTile>,
    #[serde(skip)]
    pub raw_markup: Option<String>,
}

impl FareSearchResult {
    /// Build a result from markup obtained elsewhere (e.g. a saved page)
    pub fn from_html(html: &str, options: SearchOptions) -> Self {
        let search_url = options.search_url();
        Self {
            tiles: parse_fare_tiles(html),
            options,
            search_url,
            raw_markup: Some(html.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

pub struct FareSearchClient<L = FirefoxLauncher, U = RandomUserAgent> {
    launcher: L,
    user_agents: U,
    config: SessionConfig,
}

impl FareSearchClient {
    /// Firefox with a random user agent per session
    pub fn new(config: SessionConfig) -> Self {
        Self::with_parts(FirefoxLauncher, RandomUserAgent, config)
    }
}

impl<L: DriverLauncher, U: UserAgentSource> FareSearchClient<L, U> {
    pub fn with_parts(launcher: L, user_agents: U, config: SessionConfig) -> Self {
        Self {
            launcher,
            user_agents,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one browser session against `url`
    pub async fn fetch_markup(&self, url: &str) -> SessionReport {
        let user_agent = self.user_agents.user_agent();
        BrowserSession::new(&self.launcher, &self.config)
            .fetch(url, &user_agent)
            .await
    }

    /// Search fares for validated options. An unusable page gives no tiles.
    pub async fn search_fares(&self, options: &SearchOptions) -> FareSearchResult {
        let overall_start = std::time::Instant::now();
        let search_url = options.search_url();
        tracing::info!("🔗 Search URL: {}", search_url);

        let report = self.fetch_markup(&search_url).await;
        let raw_markup = report.outcome.into_markup();
        let tiles = match &raw_markup {
            Some(markup) => {
                let tiles = parse_fare_tiles(markup);
                if tiles.is_empty() {
                    tracing::warn!(
                        "Page loaded but no fare tiles were found. The result markup may have changed."
                    );
                }
                tiles
            }
            None => Vec::new(),
        };

        tracing::info!(
            "Search finished in {:?}: {} fare tiles",
            overall_start.elapsed(),
            tiles.len()
        );
        FareSearchResult {
            options: options.clone(),
            search_url,
            tiles,
            raw_markup,
        }
    }

    /// Validate a request from any source, then search
    pub async fn search_from<S: SearchRequestSource>(
        &self,
        source: &S,
        airports: &AirportDirectory,
    ) -> Result<FareSearchResult, ValidationErrors> {
        let options = SearchOptions::from_request(&source.search_request(), airports)?;
        Ok(self.search_fares(&options).await)
    }
}
