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

//! # Fares Search Options
//!
//! Side-effect free validation of raw fare search parameters.
//!
//! Independent fields are checked first; the date-range ordering check only
//! runs over dates that already passed their own checks, so each field is
//! reported at most once.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use delulu_airport_codes::AirportDirectory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Search option that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FromAirport,
    ToAirport,
    StartDate,
    EndDate,
    Adults,
    Children,
    CabinClass,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FromAirport => "from_airport",
            Field::ToAirport => "to_airport",
            Field::StartDate => "start_date",
            Field::EndDate => "end_date",
            Field::Adults => "adults",
            Field::Children => "children",
            Field::CabinClass => "cabin_class",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

/// Every validation failure of one request, in check order
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid search options: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.iter().map(|e| e.field)
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, field: Field, reason: impl Into<String>) {
        self.errors.push(ValidationError {
            field,
            reason: reason.into(),
        });
    }

    /// Record a failed field check, keeping the value when it passed
    fn check<T, E: fmt::Display>(&mut self, field: Field, result: Result<T, E>) -> Option<T> {
        result.map_err(|e| self.push(field, e.to_string())).ok()
    }

    fn absorb<T>(&mut self, result: Result<T, ValidationErrors>) -> Option<T> {
        result.map_err(|e| self.errors.extend(e.errors)).ok()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

// =============================================================================
// Field types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown airport code {0:?}")]
pub struct UnknownAirport(pub String);

/// Airport code known to the reference dataset, stored upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn new(raw: &str, airports: &AirportDirectory) -> Result<Self, UnknownAirport> {
        let code = raw.trim();
        if code.is_empty() || !airports.contains(code) {
            return Err(UnknownAirport(raw.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cabin class {0:?}, expected one of: economy, premiumeconomy, business, first")]
pub struct UnknownCabinClass(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub const ALL: [CabinClass; 4] = [
        CabinClass::Economy,
        CabinClass::PremiumEconomy,
        CabinClass::Business,
        CabinClass::First,
    ];

    /// Literal value used by the search site
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premiumeconomy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = UnknownCabinClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == wanted)
            .ok_or_else(|| UnknownCabinClass(s.to_string()))
    }
}

/// Travel dates: `start_date` no earlier than tomorrow, `end_date` (if any)
/// no earlier than `start_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl DateRange {
    /// `today` is injected so the range can be checked without the wall clock
    pub fn new(
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let tomorrow = today.succ_opt().unwrap_or(NaiveDate::MAX);

        if start_date < tomorrow {
            errors.push(
                Field::StartDate,
                format!("start date must be at least {}", tomorrow),
            );
        } else if let Some(end) = end_date {
            if end < start_date {
                errors.push(
                    Field::EndDate,
                    "end date must be greater than or equal to the start date",
                );
            }
        }

        errors.into_result(Self {
            start_date,
            end_date,
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

/// Parse `YYYY-MM-DD`, `YYYY/MM/DD` or an ISO date-time (date part kept)
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| format!("invalid date {:?}, expected YYYY-MM-DD", raw))
}

fn passenger_count(value: i64, minimum: i64) -> Result<u32, String> {
    if value < minimum {
        return Err(format!("must be at least {}, got {}", minimum, value));
    }
    u32::try_from(value).map_err(|_| format!("{} passengers is out of range", value))
}

// =============================================================================
// Raw request and validated options
// =============================================================================

/// Unvalidated search parameters as supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub from_airport: String,
    pub to_airport: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub adults: i64,
    pub children: i64,
    pub cabin_class: String,
    pub prefer_direct: bool,
}

/// A validated fare search. Only obtainable through validation, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOptions {
    from_airport: AirportCode,
    to_airport: AirportCode,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    adults: u32,
    children: u32,
    cabin_class: CabinClass,
    prefer_direct: bool,
}

impl SearchOptions {
    /// Validate against the current local date
    pub fn from_request(
        request: &SearchRequest,
        airports: &AirportDirectory,
    ) -> Result<Self, ValidationErrors> {
        Self::validate(request, airports, chrono::Local::now().date_naive())
    }

    pub fn validate(
        request: &SearchRequest,
        airports: &AirportDirectory,
        today: NaiveDate,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let from_airport = errors.check(
            Field::FromAirport,
            AirportCode::new(&request.from_airport, airports),
        );
        let to_airport = errors.check(
            Field::ToAirport,
            AirportCode::new(&request.to_airport, airports),
        );
        let cabin_class = errors.check(
            Field::CabinClass,
            request.cabin_class.parse::<CabinClass>(),
        );
        let adults = errors.check(Field::Adults, passenger_count(request.adults, 1));
        let children = errors.check(Field::Children, passenger_count(request.children, 0));

        let start_date = errors.check(
            Field::StartDate,
            parse_calendar_date(&request.departure_date),
        );
        let end_date = match request
            .return_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            None => Some(None),
            Some(raw) => errors.check(Field::EndDate, parse_calendar_date(raw)).map(Some),
        };

        // An unparsable end date drops out here; the start date is still checked.
        let dates = match start_date {
            Some(start) => errors.absorb(DateRange::new(start, end_date.flatten(), today)),
            None => None,
        };

        match (from_airport, to_airport, dates, adults, children, cabin_class) {
            (
                Some(from_airport),
                Some(to_airport),
                Some(dates),
                Some(adults),
                Some(children),
                Some(cabin_class),
            ) => errors.into_result(Self {
                from_airport,
                to_airport,
                departure_date: dates.start_date(),
                return_date: dates.end_date(),
                adults,
                children,
                cabin_class,
                prefer_direct: request.prefer_direct,
            }),
            _ => Err(errors),
        }
    }

    pub fn builder(
        from_airport: impl Into<String>,
        to_airport: impl Into<String>,
        departure_date: NaiveDate,
    ) -> SearchOptionsBuilder {
        SearchOptionsBuilder {
            request: SearchRequest {
                from_airport: from_airport.into(),
                to_airport: to_airport.into(),
                departure_date: departure_date.format("%Y-%m-%d").to_string(),
                return_date: None,
                adults: 1,
                children: 0,
                cabin_class: CabinClass::Economy.as_str().to_string(),
                prefer_direct: false,
            },
            today: None,
        }
    }

    pub fn from_airport(&self) -> &AirportCode {
        &self.from_airport
    }

    pub fn to_airport(&self) -> &AirportCode {
        &self.to_airport
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn adults(&self) -> u32 {
        self.adults
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn cabin_class(&self) -> CabinClass {
        self.cabin_class
    }

    pub fn prefer_direct(&self) -> bool {
        self.prefer_direct
    }
}

#[derive(Clone)]
pub struct SearchOptionsBuilder {
    request: SearchRequest,
    today: Option<NaiveDate>,
}

impl SearchOptionsBuilder {
    pub fn return_date(mut self, return_date: NaiveDate) -> Self {
        self.request.return_date = Some(return_date.format("%Y-%m-%d").to_string());
        self
    }

    pub fn adults(mut self, adults: u32) -> Self {
        self.request.adults = i64::from(adults);
        self
    }

    pub fn children(mut self, children: u32) -> Self {
        self.request.children = i64::from(children);
        self
    }

    pub fn cabin_class(mut self, cabin_class: CabinClass) -> Self {
        self.request.cabin_class = cabin_class.as_str().to_string();
        self
    }

    pub fn prefer_direct(mut self, prefer_direct: bool) -> Self {
        self.request.prefer_direct = prefer_direct;
        self
    }

    /// Validate relative to a fixed day instead of the local clock
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn build(self, airports: &AirportDirectory) -> Result<SearchOptions, ValidationErrors> {
        match self.today {
            Some(today) => SearchOptions::validate(&self.request, airports, today),
            None => SearchOptions::from_request(&self.request, airports),
        }
    }
}
