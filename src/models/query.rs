//! List filters for `GET /api/entries`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;

use crate::error::{DiaryError, Result};
use crate::models::Entry;

/// Raw query string parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesQuery {
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Typed filter passed to the store. `None` means "not constrained".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    /// Case-insensitive substring matched against title or body.
    pub search: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
enum BoundSide {
    Start,
    End,
}

impl ListEntriesQuery {
    /// Parse into an [`EntryFilter`]. Empty parameters count as absent.
    pub fn into_filter(self) -> Result<EntryFilter> {
        let search = non_empty(self.search);
        let created_from = non_empty(self.start_date)
            .map(|s| parse_bound(&s, BoundSide::Start, "startDate"))
            .transpose()?;
        let created_to = non_empty(self.end_date)
            .map(|s| parse_bound(&s, BoundSide::End, "endDate"))
            .transpose()?;

        Ok(EntryFilter {
            search,
            created_from,
            created_to,
        })
    }
}

impl EntryFilter {
    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            if !entry.title.to_lowercase().contains(&needle)
                && !entry.body.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if entry.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if entry.created_at > to {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Accepts RFC 3339, a naive timestamp (taken as UTC) or a calendar date.
/// A calendar date covers the whole UTC day on either side of the range.
fn parse_bound(raw: &str, side: BoundSide, param: &str) -> Result<DateTime<Utc>> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = match side {
            BoundSide::Start => NaiveTime::MIN,
            BoundSide::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
                .unwrap_or(NaiveTime::MIN),
        };
        return Ok(date.and_time(time).and_utc());
    }

    Err(DiaryError::validation(format!(
        "{param} must be a valid date (YYYY-MM-DD or RFC 3339), got '{raw}'"
    )))
}
