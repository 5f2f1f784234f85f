//! Duty-roster resolution and shift-generation planning.
//!
//! Two sources feed the roster: date-exact `shift` rows and the recurring
//! `weekly_pattern` template. Resolution is priority fallback, not a union:
//! any shift row for a date suppresses the pattern for that date entirely,
//! even when the shift set is smaller than the pattern would provide. The
//! functions here are pure; the db crate feeds them already-fetched rows.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SiagaError;

/// Lookahead window used by the daily generation trigger and the admin
/// automation endpoints.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Monday-first calendar order, matching the weekly roster views.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = SiagaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monday" => Ok(DayOfWeek::Monday),
            "tuesday" => Ok(DayOfWeek::Tuesday),
            "wednesday" => Ok(DayOfWeek::Wednesday),
            "thursday" => Ok(DayOfWeek::Thursday),
            "friday" => Ok(DayOfWeek::Friday),
            "saturday" => Ok(DayOfWeek::Saturday),
            "sunday" => Ok(DayOfWeek::Sunday),
            _ => Err(SiagaError::Validation(format!("Unknown day of week: {s}"))),
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl From<NaiveDate> for DayOfWeek {
    fn from(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

/// Which source produced the effective on-duty set for a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutySource {
    ExactShift,
    WeeklyPattern,
    None,
}

/// The resolved on-duty set for one date: ordered, deduplicated volunteer
/// ids plus the source they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyRoster {
    pub volunteer_ids: Vec<Uuid>,
    pub source: DutySource,
}

impl DutyRoster {
    pub fn is_empty(&self) -> bool {
        self.volunteer_ids.is_empty()
    }

    /// Membership in the resolved set. This is the only correct per-volunteer
    /// check: when any shift row exists for the date, a volunteer is on duty
    /// only if one of those rows is theirs, no matter what the pattern says.
    pub fn contains(&self, volunteer_id: Uuid) -> bool {
        self.volunteer_ids.contains(&volunteer_id)
    }
}

/// Resolves the effective on-duty set from the two already-fetched sources.
///
/// Priority fallback: a non-empty shift set wins outright and the pattern is
/// ignored; only a date with zero shift rows falls back to the weekday's
/// active pattern entries; both empty resolves to an empty roster, which
/// callers must treat as "no one on duty", not as a failure.
pub fn resolve_duty(shift_volunteers: &[Uuid], pattern_volunteers: &[Uuid]) -> DutyRoster {
    if !shift_volunteers.is_empty() {
        DutyRoster {
            volunteer_ids: dedup_preserving_order(shift_volunteers),
            source: DutySource::ExactShift,
        }
    } else if !pattern_volunteers.is_empty() {
        DutyRoster {
            volunteer_ids: dedup_preserving_order(pattern_volunteers),
            source: DutySource::WeeklyPattern,
        }
    } else {
        DutyRoster {
            volunteer_ids: Vec::new(),
            source: DutySource::None,
        }
    }
}

fn dedup_preserving_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ShiftsExist,
    NoPattern,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::ShiftsExist => "shifts already exist",
            SkipReason::NoPattern => "no pattern defined",
        }
    }
}

/// What the generator should do for a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayPlan {
    Skip(SkipReason),
    /// Insert one shift per volunteer; no rows exist for the date.
    Insert(Vec<Uuid>),
    /// Delete all rows for the date, then insert; must run in one
    /// transaction so the date never observes a partial roster.
    Replace(Vec<Uuid>),
}

/// Decides the generator's action for one date.
///
/// Existing rows with overwrite off always skip, before the pattern is even
/// consulted; a weekday without active pattern entries skips even under
/// overwrite (existing rows are left untouched). Re-running with overwrite
/// therefore converges to the same shift set, and re-running without it
/// never duplicates a row.
pub fn plan_generation_day(
    has_existing_shifts: bool,
    pattern_volunteers: &[Uuid],
    overwrite: bool,
) -> DayPlan {
    if has_existing_shifts && !overwrite {
        return DayPlan::Skip(SkipReason::ShiftsExist);
    }
    if pattern_volunteers.is_empty() {
        return DayPlan::Skip(SkipReason::NoPattern);
    }
    let volunteer_ids = dedup_preserving_order(pattern_volunteers);
    if has_existing_shifts {
        DayPlan::Replace(volunteer_ids)
    } else {
        DayPlan::Insert(volunteer_ids)
    }
}

/// One successfully generated date in a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDay {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub volunteer_ids: Vec<Uuid>,
    pub replaced: bool,
}

/// One skipped date in a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedDay {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub reason: SkipReason,
}

/// Outcome of a generation run over a date range, dates ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedDay>,
    pub skipped: Vec<SkippedDay>,
}

impl GenerationReport {
    pub fn total_days(&self) -> usize {
        self.generated.len() + self.skipped.len()
    }
}

/// Ascending iterator over [start, end] inclusive; empty when end < start.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |date| *date <= end)
}

/// Today's calendar date in the roster timezone.
pub fn local_today(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

/// UTC instants bounding one local calendar day: [start, next midnight).
pub fn local_day_bounds(timezone: Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let to_utc = |local: chrono::NaiveDateTime| {
        timezone
            .from_local_datetime(&local)
            .earliest()
            .unwrap_or_else(|| timezone.from_utc_datetime(&local))
            .with_timezone(&Utc)
    };
    let start = date.and_time(NaiveTime::MIN);
    (to_utc(start), to_utc(start + Duration::days(1)))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The generation window used by the daily trigger: starts tomorrow, spans
/// `days` dates.
pub fn lookahead_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let start = today + Duration::days(1);
    let end = start + Duration::days(days.saturating_sub(1) as i64);
    (start, end)
}
