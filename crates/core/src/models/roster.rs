use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserSummary;
use crate::roster::{DayOfWeek, DutySource};

// ---- weekly pattern management ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntryResponse {
    pub id: Uuid,
    pub volunteer: UserSummary,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPatternResponse {
    pub day_of_week: DayOfWeek,
    pub entries: Vec<PatternEntryResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPatternsResponse {
    pub days: Vec<DayPatternResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDayPatternRequest {
    pub volunteer_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPatternMemberRequest {
    pub volunteer_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapPatternMemberRequest {
    pub old_volunteer_id: Uuid,
    pub new_volunteer_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyDayPatternRequest {
    pub from_day: DayOfWeek,
    pub to_day: DayOfWeek,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPatternActiveRequest {
    pub is_active: bool,
}

// ---- shifts ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignShiftsRequest {
    pub volunteer_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDayResponse {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub volunteers: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftWeekResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<ShiftDayResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteShiftsResponse {
    pub date: NaiveDate,
    pub removed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeekViewQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ---- generation ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateShiftsRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDayResponse {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub volunteers: Vec<UserSummary>,
    pub replaced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDayResponse {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub total_days: usize,
    pub generated_days: usize,
    pub skipped_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateShiftsResponse {
    pub generated: Vec<GeneratedDayResponse>,
    pub skipped: Vec<SkippedDayResponse>,
    pub summary: GenerationSummary,
}

// ---- duty views ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnDutyResponse {
    pub date: NaiveDate,
    pub source: DutySource,
    pub volunteers: Vec<UserSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnDutyQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyShiftDay {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub is_today: bool,
    pub is_past: bool,
    pub scheduled: bool,
    /// Present only when scheduled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DutySource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyShiftsResponse {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub on_duty_today: bool,
    pub scheduled_days: usize,
    pub days: Vec<MyShiftDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MyShiftsQuery {
    pub week_offset: Option<i32>,
}

// ---- automation ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationStatusResponse {
    pub enabled: bool,
    pub last_generation_at: Option<DateTime<Utc>>,
    pub schedule: String,
    pub lookahead_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAutomationRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceGenerationRequest {
    #[serde(default = "default_force_days")]
    pub days: u32,
    pub reason: Option<String>,
}

fn default_force_days() -> u32 {
    crate::roster::DEFAULT_LOOKAHEAD_DAYS
}
