use chrono::{DateTime, NaiveDate, Utc};
use mockall::mock;
use uuid::Uuid;

use crate::models::{DbPanicAlert, DbPatternEntry, DbSetting, DbShift, DbShiftWithVolunteer, DbUser};
use siaga_core::roster::{DutyRoster, GenerationReport};

// Mock repositories for testing
mock! {
    pub UserRepo {
        pub async fn get_user_by_id(&self, id: Uuid) -> eyre::Result<Option<DbUser>>;

        pub async fn get_users_by_ids(&self, ids: Vec<Uuid>) -> eyre::Result<Vec<DbUser>>;

        pub async fn list_relawan(&self) -> eyre::Result<Vec<DbUser>>;
    }
}

mock! {
    pub PatternRepo {
        pub async fn list_patterns(&self) -> eyre::Result<Vec<DbPatternEntry>>;

        pub async fn get_day_entries(&self, day: &'static str) -> eyre::Result<Vec<DbPatternEntry>>;

        pub async fn get_active_day_volunteers(
            &self,
            day: &'static str,
        ) -> eyre::Result<Vec<Uuid>>;

        pub async fn replace_day(
            &self,
            day: &'static str,
            volunteer_ids: Vec<Uuid>,
        ) -> eyre::Result<Vec<DbPatternEntry>>;

        pub async fn add_entry(
            &self,
            day: &'static str,
            volunteer_id: Uuid,
        ) -> eyre::Result<DbPatternEntry>;

        pub async fn get_entry(
            &self,
            day: &'static str,
            volunteer_id: Uuid,
        ) -> eyre::Result<Option<DbPatternEntry>>;

        pub async fn get_entry_by_id(&self, id: Uuid) -> eyre::Result<Option<DbPatternEntry>>;

        pub async fn remove_entry(
            &self,
            day: &'static str,
            volunteer_id: Uuid,
        ) -> eyre::Result<u64>;

        pub async fn swap_entry(
            &self,
            day: &'static str,
            old_volunteer_id: Uuid,
            new_volunteer_id: Uuid,
        ) -> eyre::Result<Option<DbPatternEntry>>;

        pub async fn set_entry_active(
            &self,
            id: Uuid,
            is_active: bool,
        ) -> eyre::Result<Option<DbPatternEntry>>;
    }
}

mock! {
    pub ShiftRepo {
        pub async fn get_shifts_for_date(&self, date: NaiveDate) -> eyre::Result<Vec<DbShift>>;

        pub async fn insert_shifts_for_date(
            &self,
            date: NaiveDate,
            volunteer_ids: Vec<Uuid>,
        ) -> eyre::Result<Vec<DbShift>>;

        pub async fn replace_shifts_for_date(
            &self,
            date: NaiveDate,
            volunteer_ids: Vec<Uuid>,
        ) -> eyre::Result<Vec<DbShift>>;

        pub async fn delete_shifts_for_date(&self, date: NaiveDate) -> eyre::Result<u64>;

        pub async fn get_shifts_in_range(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> eyre::Result<Vec<DbShiftWithVolunteer>>;

        pub async fn generate_from_patterns(
            &self,
            start: NaiveDate,
            end: NaiveDate,
            overwrite: bool,
        ) -> eyre::Result<GenerationReport>;
    }
}

mock! {
    pub RosterRepo {
        pub async fn shift_volunteers_for_date(&self, date: NaiveDate) -> eyre::Result<Vec<Uuid>>;

        pub async fn resolve_on_duty(&self, date: NaiveDate) -> eyre::Result<DutyRoster>;

        pub async fn is_on_duty(&self, volunteer_id: Uuid, date: NaiveDate) -> eyre::Result<bool>;
    }
}

mock! {
    pub AlertRepo {
        pub async fn create_alert(
            &self,
            reporter_id: Uuid,
            latitude: f64,
            longitude: f64,
            description: Option<&'static str>,
        ) -> eyre::Result<DbPanicAlert>;

        pub async fn get_alert_by_id(&self, id: Uuid) -> eyre::Result<Option<DbPanicAlert>>;

        pub async fn find_active_alert_for_reporter(
            &self,
            reporter_id: Uuid,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> eyre::Result<Option<DbPanicAlert>>;

        pub async fn get_alerts_between(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> eyre::Result<Vec<DbPanicAlert>>;

        pub async fn list_alerts(
            &self,
            status: Option<&'static str>,
            start: Option<DateTime<Utc>>,
            end: Option<DateTime<Utc>>,
            limit: i64,
            offset: i64,
        ) -> eyre::Result<Vec<DbPanicAlert>>;

        pub async fn count_alerts(
            &self,
            status: Option<&'static str>,
            start: Option<DateTime<Utc>>,
            end: Option<DateTime<Utc>>,
        ) -> eyre::Result<i64>;

        pub async fn update_alert_status(
            &self,
            id: Uuid,
            status: &'static str,
            handled_by: Option<Uuid>,
            handled_at: Option<DateTime<Utc>>,
        ) -> eyre::Result<DbPanicAlert>;

        pub async fn delete_alert(&self, id: Uuid) -> eyre::Result<u64>;
    }
}

mock! {
    pub SettingsRepo {
        pub async fn get_setting(&self, key: &'static str) -> eyre::Result<Option<String>>;

        pub async fn set_setting(
            &self,
            key: &'static str,
            value: &'static str,
        ) -> eyre::Result<DbSetting>;

        pub async fn automation_enabled(&self) -> eyre::Result<bool>;

        pub async fn set_automation_enabled(&self, enabled: bool) -> eyre::Result<DbSetting>;

        pub async fn last_generation_at(&self) -> eyre::Result<Option<DateTime<Utc>>>;

        pub async fn record_generation_run(&self, at: DateTime<Utc>) -> eyre::Result<DbSetting>;
    }
}
