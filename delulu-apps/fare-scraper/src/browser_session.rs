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

//! # Browser Session
//!
//! Effectful (browser process, network, time) page fetch through WebDriver.
//!
//! One session owns one browser for one URL:
//!
//! ```text
//! Created -> Navigating -> WaitingForMarker -> Loaded   -> Closed
//!                 |               |          -> TimedOut -> Closed
//!                 +---------------+----------> TimedOut -> Closed
//! ```
//!
//! The browser is quit after the protected block returns, whatever it
//! returned, and panics inside the block are caught at this boundary.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::FutureExt;
use thirtyfour::FirefoxCapabilities;
use thirtyfour::common::capabilities::firefox::FirefoxPreferences;
use thirtyfour::prelude::*;
use thiserror::Error;

use crate::fares_results_parser::RESULTS_READY_SELECTOR;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Extra time granted on top of the marker budget before the wait is
/// abandoned locally, in case the WebDriver round-trip itself stalls.
const MARKER_WAIT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub marker_timeout: Duration,
    pub poll_interval: Duration,
    pub marker_selector: &'static str,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            navigation_timeout: Duration::from_secs(60),
            marker_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            marker_selector: RESULTS_READY_SELECTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Navigating,
    WaitingForMarker,
    Loaded,
    TimedOut,
    Closed,
}

/// Why a session produced no usable markup
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to launch browser: {0:#}")]
    Launch(#[source] anyhow::Error),
    #[error("navigation failed: {0:#}")]
    Navigation(#[source] anyhow::Error),
    #[error("navigation did not finish within {0:?}")]
    NavigationTimeout(Duration),
    #[error("marker {selector} did not appear within {waited:?}")]
    MarkerTimeout {
        selector: &'static str,
        waited: Duration,
    },
    #[error("failed to capture page source: {0:#}")]
    Capture(#[source] anyhow::Error),
    #[error("browser session panicked: {0}")]
    Panicked(String),
}

impl SessionError {
    /// Site was slow rather than broken
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            SessionError::NavigationTimeout(_) | SessionError::MarkerTimeout { .. }
        )
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Loaded { markup: String },
    TimedOut { cause: SessionError },
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchOutcome::Loaded { .. })
    }

    pub fn markup(&self) -> Option<&str> {
        match self {
            FetchOutcome::Loaded { markup } => Some(markup),
            FetchOutcome::TimedOut { .. } => None,
        }
    }

    pub fn into_markup(self) -> Option<String> {
        match self {
            FetchOutcome::Loaded { markup } => Some(markup),
            FetchOutcome::TimedOut { .. } => None,
        }
    }
}

/// Outcome of one session plus the states it went through
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: FetchOutcome,
    pub states: Vec<SessionState>,
    pub elapsed: Duration,
}

impl SessionReport {
    pub fn final_state(&self) -> SessionState {
        self.states.last().copied().unwrap_or(SessionState::Created)
    }
}

// =============================================================================
// Driver seams
// =============================================================================

/// A launched browser, driven for a single page
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// `Ok(false)` when no element matched `selector` within `timeout`
    async fn wait_for_marker(
        &self,
        selector: &'static str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<bool>;

    async fn page_source(&self) -> Result<String>;

    /// Terminate the browser
    async fn shutdown(self) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait DriverLauncher {
    type Driver: PageDriver;

    async fn launch(&self, user_agent: &str, config: &SessionConfig) -> Result<Self::Driver>;
}

/// Firefox through a running geckodriver
#[derive(Debug, Clone, Copy, Default)]
pub struct FirefoxLauncher;

/// Headless (unless disabled) Firefox with the given user agent and the
/// automation flags hidden
fn firefox_capabilities(user_agent: &str, config: &SessionConfig) -> Result<FirefoxCapabilities> {
    let mut caps = DesiredCapabilities::firefox();
    if config.headless {
        caps.set_headless().context("Failed to set headless mode")?;
    }

    let mut prefs = FirefoxPreferences::new();
    prefs
        .set_user_agent(user_agent.to_string())
        .context("Failed to set user agent")?;
    prefs.set("dom.webdriver.enabled", false)?;
    prefs.set("useAutomationExtension", false)?;
    caps.set_preferences(prefs)
        .context("Failed to set Firefox preferences")?;
    Ok(caps)
}

impl DriverLauncher for FirefoxLauncher {
    type Driver = WebDriver;

    async fn launch(&self, user_agent: &str, config: &SessionConfig) -> Result<WebDriver> {
        let caps = firefox_capabilities(user_agent, config)?;
        tracing::debug!("Opening WebDriver session at {}", config.webdriver_url);
        WebDriver::new(config.webdriver_url.as_str(), caps)
            .await
            .with_context(|| format!("WebDriver error at {}", config.webdriver_url))
    }
}

impl PageDriver for WebDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.goto(url).await.context("goto")?;
        Ok(())
    }

    async fn wait_for_marker(
        &self,
        selector: &'static str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<bool> {
        self.query(By::Css(selector))
            .wait(timeout, poll_interval)
            .exists()
            .await
            .context("marker query")
    }

    async fn page_source(&self) -> Result<String> {
        self.source().await.context("page source")
    }

    async fn shutdown(self) -> Result<()> {
        self.quit().await.context("quit")
    }
}

// =============================================================================
// Session
// =============================================================================

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

pub struct BrowserSession<'a, L: DriverLauncher> {
    launcher: &'a L,
    config: &'a SessionConfig,
    states: Vec<SessionState>,
}

impl<'a, L: DriverLauncher> BrowserSession<'a, L> {
    pub fn new(launcher: &'a L, config: &'a SessionConfig) -> Self {
        Self {
            launcher,
            config,
            states: vec![SessionState::Created],
        }
    }

    pub fn state(&self) -> SessionState {
        self.states.last().copied().unwrap_or(SessionState::Created)
    }

    fn enter(&mut self, state: SessionState) {
        tracing::trace!("[browser_session] {:?} -> {:?}", self.state(), state);
        self.states.push(state);
    }

    /// Fetch one page. Never fails: errors become a `TimedOut` outcome, and
    /// the browser is torn down before this returns.
    pub async fn fetch(mut self, url: &str, user_agent: &str) -> SessionReport {
        let started = Instant::now();
        self.enter(SessionState::Navigating);
        tracing::debug!("[browser_session] user agent: {}", user_agent);

        let launched = AssertUnwindSafe(self.launcher.launch(user_agent, self.config))
            .catch_unwind()
            .await;
        let driver = match launched {
            Ok(Ok(driver)) => driver,
            Ok(Err(e)) => return self.finish(SessionError::Launch(e).into(), started),
            Err(panic) => {
                let cause = SessionError::Panicked(panic_message(panic.as_ref()));
                return self.finish(cause.into(), started);
            }
        };

        let driven = AssertUnwindSafe(self.drive(&driver, url)).catch_unwind().await;
        let outcome = match driven {
            Ok(Ok(markup)) => FetchOutcome::Loaded { markup },
            Ok(Err(cause)) => FetchOutcome::TimedOut { cause },
            Err(panic) => FetchOutcome::TimedOut {
                cause: SessionError::Panicked(panic_message(panic.as_ref())),
            },
        };

        match AssertUnwindSafe(driver.shutdown()).catch_unwind().await {
            Ok(Ok(())) => tracing::debug!("[browser_session] browser closed"),
            Ok(Err(e)) => tracing::warn!("Browser teardown failed (ignored): {:#}", e),
            Err(panic) => tracing::warn!(
                "Browser teardown panicked (ignored): {}",
                panic_message(panic.as_ref())
            ),
        }

        self.finish(outcome, started)
    }

    async fn drive(&mut self, driver: &L::Driver, url: &str) -> Result<String, SessionError> {
        let navigation_timeout = self.config.navigation_timeout;
        tracing::info!("Loading {}", url);
        match tokio::time::timeout(navigation_timeout, driver.navigate(url)).await {
            Err(_) => return Err(SessionError::NavigationTimeout(navigation_timeout)),
            Ok(Err(e)) => return Err(SessionError::Navigation(e)),
            Ok(Ok(())) => {}
        }

        self.enter(SessionState::WaitingForMarker);
        let selector = self.config.marker_selector;
        let marker_timeout = self.config.marker_timeout;
        let wait_start = Instant::now();
        let found = tokio::time::timeout(
            marker_timeout.saturating_add(MARKER_WAIT_GRACE),
            driver.wait_for_marker(selector, marker_timeout, self.config.poll_interval),
        )
        .await;
        let timed_out = SessionError::MarkerTimeout {
            selector,
            waited: marker_timeout,
        };
        match found {
            Err(_) | Ok(Ok(false)) => return Err(timed_out),
            Ok(Err(e)) => return Err(SessionError::Navigation(e)),
            Ok(Ok(true)) => {}
        }
        tracing::debug!(
            "[browser_session] marker {} appeared after {:?}",
            selector,
            wait_start.elapsed()
        );

        driver.page_source().await.map_err(SessionError::Capture)
    }

    fn finish(mut self, outcome: FetchOutcome, started: Instant) -> SessionReport {
        match &outcome {
            FetchOutcome::Loaded { markup } => {
                self.enter(SessionState::Loaded);
                tracing::debug!(
                    "[browser_session] captured {} KB of markup",
                    markup.len() / 1024
                );
            }
            FetchOutcome::TimedOut { cause } => {
                self.enter(SessionState::TimedOut);
                if cause.is_timeout() {
                    tracing::warn!("No usable page: {}", cause);
                } else {
                    tracing::warn!("Browser session failed: {}", cause);
                }
            }
        }
        self.enter(SessionState::Closed);

        let elapsed = started.elapsed();
        tracing::debug!("[browser_session] closed after {:?}", elapsed);
        SessionReport {
            outcome,
            states: self.states,
            elapsed,
        }
    }
}

impl From<SessionError> for FetchOutcome {
    fn from(cause: SessionError) -> Self {
        FetchOutcome::TimedOut { cause }
    }
}
