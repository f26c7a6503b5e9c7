//! Date ranges selected with the UI date pickers.
//!
//! Bounds are inclusive and optional; a missing bound is unbounded. Dates may
//! be given as `yyyy-MM-dd`, `yyyy-MM` or `yyyy`.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde_json::{Value, json};

use crate::error::Error;
use crate::params::date_field;
use crate::result::Result;

/// Format string handed to Elasticsearch together with range bounds.
pub const DATE_FORMAT: &str = "yyyy-MM-dd||yyyy-MM||yyyy";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub const fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Parse both bounds. A year-only upper bound means the last day of that
    /// year, so `1950` to `1950` covers the whole year.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` when a non-blank bound cannot be parsed.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let from = from.map(|raw| parse_bound(raw, Bound::Lower)).transpose()?.flatten();
        let to = to.map(|raw| parse_bound(raw, Bound::Upper)).transpose()?.flatten();
        Ok(Self { from, to })
    }

    #[must_use]
    pub const fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Both bounds present and `from <= to`.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from <= to)
    }

    /// Both bounds present and `from > to`.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }

    /// A `range` query on `field` using this range's bounds.
    #[must_use]
    pub fn range_query(&self, field: &str) -> Value {
        range_query(field, self.from, self.to)
    }

    /// Filter clauses matching any resource whose dating overlaps this range.
    ///
    /// A resource is dated either by `created` or by the interval
    /// `madeAfter..madeBefore` (assumed `madeAfter <= madeBefore`). It matches
    /// when `created` falls in the range, when either end of its interval
    /// falls in the range, or, for a positive range, when its interval spans
    /// the whole range.
    #[must_use]
    pub fn overlap_clauses(&self) -> Vec<Value> {
        if self.is_unbounded() {
            return Vec::new();
        }
        let mut clauses = vec![
            self.range_query(date_field::CREATED),
            self.range_query(date_field::MADE_AFTER),
            self.range_query(date_field::MADE_BEFORE),
        ];
        if self.is_positive() {
            clauses.push(json!({
                "bool": {
                    "must": [
                        range_query(date_field::MADE_AFTER, None, self.from),
                        range_query(date_field::MADE_BEFORE, self.to, None),
                    ]
                }
            }));
        }
        clauses
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |d: Option<NaiveDate>| d.map_or_else(|| "*".to_string(), |d| d.to_string());
        write!(f, "[{} TO {}]", show(self.from), show(self.to))
    }
}

fn range_query(field: &str, gte: Option<NaiveDate>, lte: Option<NaiveDate>) -> Value {
    let mut bounds = serde_json::Map::new();
    if let Some(gte) = gte {
        bounds.insert("gte".into(), Value::String(gte.to_string()));
    }
    if let Some(lte) = lte {
        bounds.insert("lte".into(), Value::String(lte.to_string()));
    }
    bounds.insert("format".into(), Value::String(DATE_FORMAT.to_string()));
    json!({ "range": { field: bounds } })
}

#[derive(Clone, Copy)]
enum Bound {
    Lower,
    Upper,
}

fn parse_bound(raw: &str, bound: Bound) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Ok(Some(date));
    }
    let year = parse_year(raw).ok_or_else(|| Error::invalid_date(raw))?;
    let date = match bound {
        Bound::Lower => NaiveDate::from_ymd_opt(year, 1, 1),
        Bound::Upper => NaiveDate::from_ymd_opt(year, 12, 31),
    };
    date.filter(|d| d.year() == year)
        .map(Some)
        .ok_or_else(|| Error::invalid_date(raw))
}

/// Years are at most four digits, optionally negative (`-0160` for 160 BC).
fn parse_year(raw: &str) -> Option<i32> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
