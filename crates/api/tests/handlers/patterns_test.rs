use chrono::Utc;
use mockall::predicate;
use std::collections::HashSet;
use uuid::Uuid;

use siaga_core::{alerts::Role, errors::SiagaError, roster::DayOfWeek};
use siaga_db::models::{DbPatternEntry, DbUser};

use crate::test_utils::TestContext;
use siaga_api::middleware::error_handling::AppError;

fn relawan_row(id: Uuid) -> DbUser {
    DbUser {
        id,
        name: "Volunteer".to_string(),
        email: "volunteer@example.org".to_string(),
        phone: Some("081234567890".to_string()),
        role: "relawan".to_string(),
        created_at: Utc::now(),
    }
}

fn pattern_entry(day: DayOfWeek, volunteer_id: Uuid) -> DbPatternEntry {
    DbPatternEntry {
        id: Uuid::new_v4(),
        day_of_week: day.as_str().to_string(),
        volunteer_id,
        is_active: true,
        created_at: Utc::now(),
    }
}

// Mirrors the relawan existence and role check shared by pattern and shift
// assignment handlers
async fn require_relawan_wrapper(ctx: &mut TestContext, ids: &[Uuid]) -> Result<(), SiagaError> {
    let users = ctx
        .user_repo
        .get_users_by_ids(ids.to_vec())
        .await
        .map_err(SiagaError::Database)?;

    for id in ids {
        let Some(db_user) = users.iter().find(|user| user.id == *id) else {
            return Err(SiagaError::Validation(format!(
                "Volunteer {id} does not exist"
            )));
        };
        if db_user.role != Role::Relawan.as_str() {
            return Err(SiagaError::Validation(format!(
                "User {} is not a relawan",
                db_user.id
            )));
        }
    }
    Ok(())
}

// Mirrors set_day_pattern: dedup, size bounds, role check, then replace
async fn test_set_day_pattern_wrapper(
    ctx: &mut TestContext,
    day: DayOfWeek,
    volunteer_ids: Vec<Uuid>,
) -> Result<Vec<DbPatternEntry>, AppError> {
    let mut seen = HashSet::new();
    let volunteer_ids: Vec<Uuid> = volunteer_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();
    if !(1..=4).contains(&volunteer_ids.len()) {
        return Err(AppError(SiagaError::Validation(
            "volunteer_ids must contain between 1 and 4 volunteers".to_string(),
        )));
    }
    require_relawan_wrapper(ctx, &volunteer_ids).await?;

    Ok(ctx
        .pattern_repo
        .replace_day(day.as_str(), volunteer_ids)
        .await?)
}

// Mirrors add_pattern_member: role check, capacity, duplicate, insert
async fn test_add_pattern_member_wrapper(
    ctx: &mut TestContext,
    day: DayOfWeek,
    volunteer_id: Uuid,
) -> Result<DbPatternEntry, AppError> {
    require_relawan_wrapper(ctx, std::slice::from_ref(&volunteer_id)).await?;

    let entries = ctx.pattern_repo.get_day_entries(day.as_str()).await?;
    if entries.len() >= 4 {
        return Err(AppError(SiagaError::Validation(
            "A day pattern holds at most 4 volunteers".to_string(),
        )));
    }
    if entries
        .iter()
        .any(|entry| entry.volunteer_id == volunteer_id)
    {
        return Err(AppError(SiagaError::Conflict(format!(
            "Volunteer is already in the {day} pattern"
        ))));
    }

    Ok(ctx
        .pattern_repo
        .add_entry(day.as_str(), volunteer_id)
        .await?)
}

async fn test_remove_pattern_member_wrapper(
    ctx: &mut TestContext,
    day: DayOfWeek,
    volunteer_id: Uuid,
) -> Result<u64, AppError> {
    let removed = ctx
        .pattern_repo
        .remove_entry(day.as_str(), volunteer_id)
        .await?;
    if removed == 0 {
        return Err(AppError(SiagaError::NotFound(format!(
            "Volunteer is not in the {day} pattern"
        ))));
    }
    Ok(removed)
}

// Mirrors swap_pattern_member: the replacement must be a relawan not yet in
// the day, the outgoing volunteer must be in it
async fn test_swap_pattern_member_wrapper(
    ctx: &mut TestContext,
    day: DayOfWeek,
    old_volunteer_id: Uuid,
    new_volunteer_id: Uuid,
) -> Result<DbPatternEntry, AppError> {
    require_relawan_wrapper(ctx, std::slice::from_ref(&new_volunteer_id)).await?;

    if ctx
        .pattern_repo
        .get_entry(day.as_str(), new_volunteer_id)
        .await?
        .is_some()
    {
        return Err(AppError(SiagaError::Conflict(format!(
            "Volunteer is already in the {day} pattern"
        ))));
    }

    let swapped = ctx
        .pattern_repo
        .swap_entry(day.as_str(), old_volunteer_id, new_volunteer_id)
        .await?
        .ok_or_else(|| SiagaError::NotFound(format!("Volunteer is not in the {day} pattern")))?;
    Ok(swapped)
}

// Mirrors copy_day_pattern: active source entries replace the target day
async fn test_copy_day_pattern_wrapper(
    ctx: &mut TestContext,
    from_day: DayOfWeek,
    to_day: DayOfWeek,
    overwrite: bool,
) -> Result<Vec<DbPatternEntry>, AppError> {
    if from_day == to_day {
        return Err(AppError(SiagaError::Validation(
            "from_day and to_day must differ".to_string(),
        )));
    }

    let source = ctx
        .pattern_repo
        .get_active_day_volunteers(from_day.as_str())
        .await?;
    if source.is_empty() {
        return Err(AppError(SiagaError::Validation(format!(
            "Day {from_day} has no active pattern entries to copy"
        ))));
    }

    let target = ctx.pattern_repo.get_day_entries(to_day.as_str()).await?;
    if !target.is_empty() && !overwrite {
        return Err(AppError(SiagaError::Conflict(format!(
            "Day {to_day} already has a pattern; set overwrite to replace it"
        ))));
    }

    Ok(ctx.pattern_repo.replace_day(to_day.as_str(), source).await?)
}

#[tokio::test]
async fn test_set_day_pattern_deduplicates_before_writing() {
    let mut ctx = TestContext::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    ctx.user_repo
        .expect_get_users_by_ids()
        .with(predicate::eq(vec![a, b]))
        .returning(|ids| Ok(ids.into_iter().map(relawan_row).collect()));
    ctx.pattern_repo
        .expect_replace_day()
        .with(predicate::eq("monday"), predicate::eq(vec![a, b]))
        .times(1)
        .returning(|day, ids| {
            Ok(ids
                .into_iter()
                .map(|id| DbPatternEntry {
                    id: Uuid::new_v4(),
                    day_of_week: day.to_string(),
                    volunteer_id: id,
                    is_active: true,
                    created_at: Utc::now(),
                })
                .collect())
        });

    // The duplicate id collapses before any validation or write
    let result =
        test_set_day_pattern_wrapper(&mut ctx, DayOfWeek::Monday, vec![a, a, b]).await;

    assert_eq!(result.unwrap().len(), 2);
}

#[tokio::test]
async fn test_set_day_pattern_rejects_empty_roster() {
    let mut ctx = TestContext::new();

    ctx.user_repo.expect_get_users_by_ids().times(0);
    ctx.pattern_repo.expect_replace_day().times(0);

    let result = test_set_day_pattern_wrapper(&mut ctx, DayOfWeek::Monday, Vec::new()).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Validation(message) => {
            assert_eq!(message, "volunteer_ids must contain between 1 and 4 volunteers");
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_set_day_pattern_rejects_oversized_roster() {
    let mut ctx = TestContext::new();
    let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

    ctx.pattern_repo.expect_replace_day().times(0);

    let result = test_set_day_pattern_wrapper(&mut ctx, DayOfWeek::Friday, ids).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Validation(_) => {} // Expected
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_set_day_pattern_rejects_non_relawan() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.user_repo.expect_get_users_by_ids().returning(|ids| {
        Ok(ids
            .into_iter()
            .map(|id| DbUser {
                role: "user".to_string(),
                ..relawan_row(id)
            })
            .collect())
    });
    ctx.pattern_repo.expect_replace_day().times(0);

    let result = test_set_day_pattern_wrapper(&mut ctx, DayOfWeek::Monday, vec![id]).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Validation(message) => {
            assert_eq!(message, format!("User {id} is not a relawan"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_set_day_pattern_rejects_unknown_volunteers() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    // The user lookup comes back empty
    ctx.user_repo
        .expect_get_users_by_ids()
        .returning(|_| Ok(Vec::new()));
    ctx.pattern_repo.expect_replace_day().times(0);

    let result = test_set_day_pattern_wrapper(&mut ctx, DayOfWeek::Monday, vec![id]).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Validation(message) => {
            assert_eq!(message, format!("Volunteer {id} does not exist"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_add_pattern_member_rejects_a_full_day() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.user_repo
        .expect_get_users_by_ids()
        .returning(|ids| Ok(ids.into_iter().map(relawan_row).collect()));
    ctx.pattern_repo.expect_get_day_entries().returning(|_| {
        Ok((0..4)
            .map(|_| pattern_entry(DayOfWeek::Monday, Uuid::new_v4()))
            .collect())
    });
    ctx.pattern_repo.expect_add_entry().times(0);

    let result = test_add_pattern_member_wrapper(&mut ctx, DayOfWeek::Monday, id).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Validation(message) => {
            assert_eq!(message, "A day pattern holds at most 4 volunteers");
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_add_pattern_member_rejects_a_duplicate() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.user_repo
        .expect_get_users_by_ids()
        .returning(|ids| Ok(ids.into_iter().map(relawan_row).collect()));
    ctx.pattern_repo
        .expect_get_day_entries()
        .returning(move |_| Ok(vec![pattern_entry(DayOfWeek::Tuesday, id)]));
    ctx.pattern_repo.expect_add_entry().times(0);

    let result = test_add_pattern_member_wrapper(&mut ctx, DayOfWeek::Tuesday, id).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Conflict(message) => {
            assert_eq!(message, "Volunteer is already in the tuesday pattern");
        }
        e => panic!("Expected Conflict error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_add_pattern_member_success() {
    let mut ctx = TestContext::new();
    let id = Uuid::new_v4();

    ctx.user_repo
        .expect_get_users_by_ids()
        .returning(|ids| Ok(ids.into_iter().map(relawan_row).collect()));
    ctx.pattern_repo
        .expect_get_day_entries()
        .returning(|_| Ok(Vec::new()));
    ctx.pattern_repo
        .expect_add_entry()
        .with(predicate::eq("wednesday"), predicate::eq(id))
        .times(1)
        .returning(|day, volunteer_id| {
            Ok(DbPatternEntry {
                id: Uuid::new_v4(),
                day_of_week: day.to_string(),
                volunteer_id,
                is_active: true,
                created_at: Utc::now(),
            })
        });

    let result = test_add_pattern_member_wrapper(&mut ctx, DayOfWeek::Wednesday, id).await;

    let entry = result.unwrap();
    assert_eq!(entry.volunteer_id, id);
    assert!(entry.is_active);
}

#[tokio::test]
async fn test_remove_pattern_member_not_found() {
    let mut ctx = TestContext::new();

    ctx.pattern_repo.expect_remove_entry().returning(|_, _| Ok(0));

    let result =
        test_remove_pattern_member_wrapper(&mut ctx, DayOfWeek::Sunday, Uuid::new_v4()).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::NotFound(message) => {
            assert_eq!(message, "Volunteer is not in the sunday pattern");
        }
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_swap_rejects_a_replacement_already_in_the_day() {
    let mut ctx = TestContext::new();
    let old_id = Uuid::new_v4();
    let new_id = Uuid::new_v4();

    ctx.user_repo
        .expect_get_users_by_ids()
        .returning(|ids| Ok(ids.into_iter().map(relawan_row).collect()));
    ctx.pattern_repo
        .expect_get_entry()
        .with(predicate::eq("thursday"), predicate::eq(new_id))
        .returning(move |_, volunteer_id| Ok(Some(pattern_entry(DayOfWeek::Thursday, volunteer_id))));
    ctx.pattern_repo.expect_swap_entry().times(0);

    let result =
        test_swap_pattern_member_wrapper(&mut ctx, DayOfWeek::Thursday, old_id, new_id).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Conflict(_) => {} // Expected
        e => panic!("Expected Conflict error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_swap_when_the_outgoing_volunteer_is_missing() {
    let mut ctx = TestContext::new();
    let old_id = Uuid::new_v4();
    let new_id = Uuid::new_v4();

    ctx.user_repo
        .expect_get_users_by_ids()
        .returning(|ids| Ok(ids.into_iter().map(relawan_row).collect()));
    ctx.pattern_repo.expect_get_entry().returning(|_, _| Ok(None));
    ctx.pattern_repo
        .expect_swap_entry()
        .with(
            predicate::eq("thursday"),
            predicate::eq(old_id),
            predicate::eq(new_id),
        )
        .returning(|_, _, _| Ok(None));

    let result =
        test_swap_pattern_member_wrapper(&mut ctx, DayOfWeek::Thursday, old_id, new_id).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::NotFound(_) => {} // Expected
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_copy_rejects_identical_days() {
    let mut ctx = TestContext::new();

    ctx.pattern_repo.expect_get_active_day_volunteers().times(0);

    let result =
        test_copy_day_pattern_wrapper(&mut ctx, DayOfWeek::Monday, DayOfWeek::Monday, false).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Validation(message) => {
            assert_eq!(message, "from_day and to_day must differ");
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_copy_rejects_an_empty_source_day() {
    let mut ctx = TestContext::new();

    ctx.pattern_repo
        .expect_get_active_day_volunteers()
        .with(predicate::eq("monday"))
        .returning(|_| Ok(Vec::new()));
    ctx.pattern_repo.expect_replace_day().times(0);

    let result =
        test_copy_day_pattern_wrapper(&mut ctx, DayOfWeek::Monday, DayOfWeek::Tuesday, false).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Validation(message) => {
            assert_eq!(message, "Day monday has no active pattern entries to copy");
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_copy_refuses_to_clobber_without_overwrite() {
    let mut ctx = TestContext::new();
    let source_id = Uuid::new_v4();

    ctx.pattern_repo
        .expect_get_active_day_volunteers()
        .returning(move |_| Ok(vec![source_id]));
    ctx.pattern_repo
        .expect_get_day_entries()
        .with(predicate::eq("saturday"))
        .returning(|_| Ok(vec![pattern_entry(DayOfWeek::Saturday, Uuid::new_v4())]));
    ctx.pattern_repo.expect_replace_day().times(0);

    let result =
        test_copy_day_pattern_wrapper(&mut ctx, DayOfWeek::Friday, DayOfWeek::Saturday, false)
            .await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        SiagaError::Conflict(message) => {
            assert_eq!(
                message,
                "Day saturday already has a pattern; set overwrite to replace it"
            );
        }
        e => panic!("Expected Conflict error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_copy_with_overwrite_replaces_the_target_day() {
    let mut ctx = TestContext::new();
    let source_ids = vec![Uuid::new_v4(), Uuid::new_v4()];
    let expected = source_ids.clone();

    let returned = source_ids.clone();
    ctx.pattern_repo
        .expect_get_active_day_volunteers()
        .with(predicate::eq("friday"))
        .returning(move |_| Ok(returned.clone()));
    ctx.pattern_repo
        .expect_get_day_entries()
        .returning(|_| Ok(vec![pattern_entry(DayOfWeek::Saturday, Uuid::new_v4())]));
    ctx.pattern_repo
        .expect_replace_day()
        .with(predicate::eq("saturday"), predicate::eq(expected))
        .times(1)
        .returning(|day, ids| {
            Ok(ids
                .into_iter()
                .map(|id| DbPatternEntry {
                    id: Uuid::new_v4(),
                    day_of_week: day.to_string(),
                    volunteer_id: id,
                    is_active: true,
                    created_at: Utc::now(),
                })
                .collect())
        });

    let result =
        test_copy_day_pattern_wrapper(&mut ctx, DayOfWeek::Friday, DayOfWeek::Saturday, true).await;

    let entries = result.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].volunteer_id, source_ids[0]);
}

#[tokio::test]
async fn test_pattern_listing_groups_every_day() {
    let mut ctx = TestContext::new();
    let monday_a = Uuid::new_v4();
    let monday_b = Uuid::new_v4();
    let wednesday = Uuid::new_v4();

    ctx.pattern_repo.expect_list_patterns().returning(move || {
        Ok(vec![
            pattern_entry(DayOfWeek::Monday, monday_a),
            pattern_entry(DayOfWeek::Monday, monday_b),
            pattern_entry(DayOfWeek::Wednesday, wednesday),
        ])
    });

    let entries = ctx.pattern_repo.list_patterns().await.unwrap();

    // Mirror of the listing handler's grouping: one group per weekday, in
    // calendar order, empty days included
    let counts: Vec<usize> = DayOfWeek::ALL
        .into_iter()
        .map(|day| {
            entries
                .iter()
                .filter(|entry| entry.day_of_week == day.as_str())
                .count()
        })
        .collect();

    assert_eq!(counts, vec![2, 0, 1, 0, 0, 0, 0]);
}
