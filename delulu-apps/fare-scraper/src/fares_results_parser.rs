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

//! # Fares Results Parser
//!
//! Side-effect free HTML parsing for rendered Skyscanner search results.
//! Fields are kept as raw text; no price or duration parsing happens here.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Present once the fare list has been rendered client-side
pub const RESULTS_READY_SELECTOR: &str = r#"button[class*="TicketStub"]"#;
/// Wraps the summary tiles (cheapest, best, fastest, ...)
pub const RESULTS_CONTAINER_SELECTOR: &str = r#"div[class*="TabsWithSparkle"]"#;
const TILE_TAG: &str = "button";
const TILE_FIELD_SELECTOR: &str = "div";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One rendered fare option: the text of its nested fields, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FareTile {
    fields: Vec<String>,
}

impl FareTile {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Non-empty fields joined by `sep`, for one-line display
    pub fn summary(&self, sep: &str) -> String {
        self.fields
            .iter()
            .filter(|f| !f.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

struct FareSelectors {
    container: Selector,
    field: Selector,
}

impl FareSelectors {
    fn new() -> Self {
        Self {
            container: Selector::parse(RESULTS_CONTAINER_SELECTOR).unwrap(),
            field: Selector::parse(TILE_FIELD_SELECTOR).unwrap(),
        }
    }
}

static SELECTORS: Lazy<FareSelectors> = Lazy::new(FareSelectors::new);

fn normalize_text(element: ElementRef) -> String {
    let text = element.text().collect::<String>();
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn parse_tile(tile: ElementRef, selectors: &FareSelectors) -> FareTile {
    FareTile {
        fields: tile.select(&selectors.field).map(normalize_text).collect(),
    }
}

/// Extract fare tiles from rendered markup.
///
/// Only the first results container is read, and only its direct `button`
/// children count as tiles. A page without the container yields an empty
/// list: an unrendered or redesigned page is an expected outcome.
pub fn parse_fare_tiles(html: &str) -> Vec<FareTile> {
    let selectors = &*SELECTORS;
    let document = Html::parse_document(html);

    let Some(container) = document.select(&selectors.container).next() else {
        tracing::debug!(
            "No results container ({}) in {} KB of markup",
            RESULTS_CONTAINER_SELECTOR,
            html.len() / 1024
        );
        return Vec::new();
    };

    let tiles: Vec<FareTile> = container
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == TILE_TAG)
        .map(|tile| parse_tile(tile, selectors))
        .collect();

    tracing::debug!("Parsed {} fare tiles", tiles.len());
    tiles
}
