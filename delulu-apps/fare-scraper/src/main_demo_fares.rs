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

//! Fixed-value fare search: Hanoi to Da Nang, leaving tomorrow.
//!
//! Same core as `delulu-fares`, with the request hard-coded. The WebDriver
//! endpoint can still be changed through `DELULU_WEBDRIVER_URL`.

use anyhow::{Context, Result};
use delulu_fare_scraper::{
    AirportDirectory, DEFAULT_WEBDRIVER_URL, DemoRequest, FareSearchClient, SessionConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let airports = AirportDirectory::bundled().context("Failed to load airport dataset")?;
    let source = DemoRequest {
        today: chrono::Local::now().date_naive(),
    };

    let config = SessionConfig {
        webdriver_url: std::env::var("DELULU_WEBDRIVER_URL")
            .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string()),
        ..SessionConfig::default()
    };
    let client = FareSearchClient::new(config);
    let result = client
        .search_from(&source, &airports)
        .await
        .context("Invalid demo search parameters")?;

    println!("{}", serde_json::to_string_pretty(&result.options)?);
    println!("{}", result.search_url);
    let tiles: Vec<&[String]> = result.tiles.iter().map(|tile| tile.fields()).collect();
    println!("{}", serde_json::to_string(&tiles)?);
    Ok(())
}
