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

//! CLI for Skyscanner fare search.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use delulu_fare_scraper::{
    AirportDirectory, DEFAULT_WEBDRIVER_URL, FareSearchClient, FareSearchResult, FirefoxLauncher,
    FixedUserAgent, RandomUserAgent, SearchOptions, SearchRequest, SearchRequestSource,
    SessionConfig, UserAgentSource, parse_calendar_date,
};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "delulu-fares")]
#[command(author, version, about = "Search flight fares on Skyscanner", long_about = None)]
struct CliArgs {
    /// Departure airport code (e.g., HAN, SGN)
    #[arg(short, long)]
    from: String,

    /// Landing airport code (e.g., DAD, BKK)
    #[arg(short, long)]
    to: String,

    /// Departure date (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short, long)]
    date: String,

    /// Return date for round trips (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(short = 'R', long)]
    return_date: Option<String>,

    /// Number of adult passengers
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    adults: i64,

    /// Number of child passengers
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    children: i64,

    /// Cabin class: economy, premiumeconomy, business, first
    #[arg(short, long, default_value = "economy")]
    cabin: String,

    /// Prefer direct flights
    #[arg(long)]
    prefer_direct: bool,

    /// WebDriver (geckodriver) endpoint
    #[arg(long, env = "DELULU_WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,

    /// Seconds to wait for the fare list to render
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Run the browser with a visible window
    #[arg(long)]
    show_browser: bool,

    /// Fixed user agent instead of a random one per session
    #[arg(long)]
    user_agent: Option<String>,

    /// Airport dataset (JSON) replacing the bundled one
    #[arg(long)]
    airports: Option<PathBuf>,

    /// Parse a previously saved results page instead of opening a browser
    #[arg(long)]
    from_html: Option<PathBuf>,

    /// Save rendered HTML to file for debugging
    #[arg(long)]
    save_html: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

impl SearchRequestSource for CliArgs {
    fn search_request(&self) -> SearchRequest {
        SearchRequest {
            from_airport: self.from.clone(),
            to_airport: self.to.clone(),
            departure_date: self.date.clone(),
            return_date: self.return_date.clone(),
            adults: self.adults,
            children: self.children,
            cabin_class: self.cabin.clone(),
            prefer_direct: self.prefer_direct,
        }
    }
}

impl CliArgs {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            webdriver_url: self.webdriver_url.clone(),
            headless: !self.show_browser,
            marker_timeout: Duration::from_secs(self.timeout),
            ..SessionConfig::default()
        }
    }

    /// Day the dates are checked against. A saved page is re-parsed as of the
    /// day before its departure, so captures from earlier days stay readable.
    fn validation_day(&self, today: NaiveDate) -> NaiveDate {
        if self.from_html.is_none() {
            return today;
        }
        parse_calendar_date(&self.date)
            .ok()
            .and_then(|departure| departure.pred_opt())
            .map_or(today, |day_before| day_before.min(today))
    }

    fn user_agents(&self) -> Box<dyn UserAgentSource> {
        match &self.user_agent {
            Some(ua) => Box::new(FixedUserAgent(ua.clone())),
            None => Box::new(RandomUserAgent),
        }
    }
}

/// Logs go to stderr so `--json` output stays clean; RUST_LOG wins when set
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Get terminal width for responsive tables
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
}

fn dash_bar() -> String {
    "-".repeat(get_terminal_width().min(100))
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Render results to stdout
fn render_results(result: &FareSearchResult, airports: &AirportDirectory) {
    let options = &result.options;
    let airport_label = |code: &str| match airports.name(code) {
        Some(name) => format!("{} ({})", code, name),
        None => code.to_string(),
    };

    let trip = match options.return_date() {
        Some(ret) => format!("{} ⇄ {}", options.departure_date(), ret),
        None => options.departure_date().to_string(),
    };
    println!("{}", "=".repeat(96));
    println!(
        "  🛫  {} → {} on {}",
        airport_label(options.from_airport().as_str()),
        airport_label(options.to_airport().as_str()),
        trip
    );
    println!("{}\n", "=".repeat(96));

    println!(
        "👥 Passengers: {} adult(s), {} child(ren) · {} · direct preferred: {}",
        options.adults(),
        options.children(),
        options.cabin_class(),
        options.prefer_direct()
    );
    println!("🔗 Search URL: {}", result.search_url);

    if result.is_empty() {
        println!("\nNo fares found.");
        return;
    }

    let rank_width = 4;
    let text_width = get_terminal_width().min(100).saturating_sub(rank_width + 4).max(20);

    println!("\n🏆 {} Results:", result.len());
    println!("{}", dash_bar());
    for (i, tile) in result.tiles.iter().enumerate() {
        println!(
            "  {:>w$}  {}",
            i + 1,
            truncate(&tile.summary(" · "), text_width),
            w = rank_width
        );
    }
    println!("{}", dash_bar());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose);

    tracing::info!("Starting delulu-fares CLI");
    tracing::debug!("Args: {:?}", args);

    let airports = match &args.airports {
        Some(path) => AirportDirectory::from_path(path),
        None => AirportDirectory::bundled(),
    }
    .context("Failed to load airport dataset")?;

    let today = args.validation_day(chrono::Local::now().date_naive());
    let options = match SearchOptions::validate(&args.search_request(), &airports, today) {
        Ok(options) => options,
        Err(errors) => {
            for error in errors.errors() {
                tracing::error!("Invalid {}: {}", error.field, error.reason);
            }
            return Err(errors).context("Invalid search parameters");
        }
    };
    tracing::info!(
        "Parsed request: {} -> {} on {} ({})",
        options.from_airport(),
        options.to_airport(),
        options.departure_date(),
        options.cabin_class()
    );

    let result = match &args.from_html {
        Some(path) => {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            tracing::info!("Parsing saved page {} ({} KB)", path.display(), html.len() / 1024);
            FareSearchResult::from_html(&html, options)
        }
        None => {
            let user_agents = args.user_agents();
            let client = FareSearchClient::with_parts(
                FirefoxLauncher,
                user_agents.as_ref(),
                args.session_config(),
            );
            tracing::debug!("Session config: {:?}", client.config());
            client.search_fares(&options).await
        }
    };

    if args.save_html {
        match &result.raw_markup {
            Some(html) => {
                let filename = format!(
                    "debug_{}_{}.html",
                    result.options.from_airport().as_str().to_ascii_lowercase(),
                    result.options.to_airport().as_str().to_ascii_lowercase()
                );
                std::fs::write(&filename, html).context("Failed to write HTML file")?;
                tracing::info!("Saved HTML to {}", filename);
            }
            None => tracing::warn!("No page was captured, nothing to save"),
        }
    }

    tracing::info!("Search completed: {} fare tiles found", result.len());

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize results")?;
        println!("{}", json);
    } else {
        render_results(&result, &airports);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["delulu-fares", "-f", "HAN", "-t", "DAD", "-d", "2025-06-01"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn live_search_validates_against_today() {
        let today = day(2026, 1, 10);
        assert_eq!(args(&[]).validation_day(today), today);
    }

    #[test]
    fn saved_page_validates_against_its_departure() {
        let cli = args(&["--from-html", "debug_han_dad.html", "-R", "2025-06-03"]);
        let today = day(2026, 1, 10);
        assert_eq!(cli.validation_day(today), day(2025, 5, 31));

        let airports = AirportDirectory::bundled().unwrap();
        let options =
            SearchOptions::validate(&cli.search_request(), &airports, cli.validation_day(today))
                .unwrap();
        assert_eq!(options.departure_date(), day(2025, 6, 1));
        assert_eq!(options.return_date(), Some(day(2025, 6, 3)));
    }

    #[test]
    fn saved_page_with_bad_date_still_reports_it() {
        let cli = CliArgs::parse_from([
            "delulu-fares",
            "-f",
            "HAN",
            "-t",
            "DAD",
            "-d",
            "someday",
            "--from-html",
            "page.html",
        ]);
        let today = day(2026, 1, 10);
        assert_eq!(cli.validation_day(today), today);

        let airports = AirportDirectory::bundled().unwrap();
        let errors = SearchOptions::validate(&cli.search_request(), &airports, today).unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field.as_str(), "start_date");
    }

    #[test]
    fn session_config_from_flags() {
        let cli = args(&["--timeout", "5", "--show-browser", "--webdriver-url", "http://h:1"]);
        let config = cli.session_config();
        assert_eq!(config.marker_timeout, Duration::from_secs(5));
        assert!(!config.headless);
        assert_eq!(config.webdriver_url, "http://h:1");
    }
}
