use crate::classify::{normalize_extension, normalize_keywords};
use crate::error::{HotspotError, Result};
use crate::model::DateRange;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Unvalidated filter input, as collected from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub since: Option<String>,
    pub until: Option<String>,
    pub extension: Option<String>,
    pub keywords: Vec<String>,
}

/// Validated filters. Only obtainable through [`FilterOptions::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    range: DateRange,
    extension: Option<String>,
    keywords: Vec<String>,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl FilterOptions {
    pub fn validate(&self) -> Result<FilterConfig> {
        let since = self
            .since
            .as_deref()
            .map(|s| parse_date(s, Bound::Start))
            .transpose()?;
        let until = self
            .until
            .as_deref()
            .map(|u| parse_date(u, Bound::End))
            .transpose()?;

        if let (Some(s), Some(u)) = (since, until) {
            if s > u {
                return Err(HotspotError::Configuration(format!(
                    "Invalid range: since ({s}) is after until ({u})"
                )));
            }
        }

        let mut range = DateRange::new();
        if let Some(s) = since {
            range = range.with_since(s);
        }
        if let Some(u) = until {
            range = range.with_until(u);
        }

        Ok(FilterConfig {
            range,
            extension: self.extension.as_deref().and_then(normalize_extension),
            keywords: normalize_keywords(&self.keywords),
        })
    }
}

impl FilterConfig {
    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Accepts RFC 3339 timestamps and `YYYY-MM-DD` calendar dates. A bare date
/// covers the whole UTC day, so an end bound of `2023-12-31` includes
/// commits made on that day.
fn parse_date(input: &str, bound: Bound) -> Result<DateTime<Utc>> {
    let input = input.trim();

    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    // YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let datetime = match bound {
            Bound::Start => date.and_hms_opt(0, 0, 0),
            Bound::End => date.and_hms_opt(23, 59, 59),
        };
        if let Some(datetime) = datetime {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    Err(HotspotError::Configuration(format!(
        "Invalid date '{input}': expected YYYY-MM-DD or RFC 3339"
    )))
}
