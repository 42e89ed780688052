//! Integration tests for the SQLite adapters against a real database file.

use chrono::{NaiveDate, TimeZone, Utc};
use habitquest_domain::{
    catalog, Habit, HabitCategory, HabitCompletion, Penalty, PenaltyDestination, UserId,
    UserProfile,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::infrastructure::ports::{
    AchievementRepo, CompletionRepo, HabitRepo, PenaltyRepo, ProfileRepo, SkillRepo,
};
use crate::infrastructure::sqlite::{
    self, SqliteAchievementRepo, SqliteCompletionRepo, SqliteHabitRepo, SqlitePenaltyRepo,
    SqliteProfileRepo, SqliteSkillRepo,
};

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test.db");
    let pool = sqlite::connect(path.to_str().expect("utf-8 path"))
        .await
        .expect("connect");
    sqlite::ensure_schema(&pool).await.expect("schema");
    (dir, pool)
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

async fn seeded_user(pool: &SqlitePool) -> UserProfile {
    let profiles = SqliteProfileRepo::new(pool.clone());
    let profile = UserProfile::new(UserId::new(), now());
    profiles.save(&profile).await.expect("save profile");
    profile
}

async fn seeded_habit(pool: &SqlitePool, user_id: UserId) -> Habit {
    let habits = SqliteHabitRepo::new(pool.clone());
    let habit = Habit::new(user_id, "Morning run", HabitCategory::Physical, now());
    habits.save(&habit).await.expect("save habit");
    habit
}

#[tokio::test]
async fn profile_round_trips() {
    let (_dir, pool) = test_pool().await;
    let profiles = SqliteProfileRepo::new(pool.clone());

    let mut profile = UserProfile::new(UserId::new(), now()).with_email("hunter@example.com");
    profile.level = 3;
    profile.experience = 250;
    profile.currency = 40;
    profiles.save(&profile).await.expect("save");

    let loaded = profiles
        .get(profile.id)
        .await
        .expect("get")
        .expect("profile exists");
    assert_eq!(loaded.email.as_deref(), Some("hunter@example.com"));
    assert_eq!(loaded.level, 3);
    assert_eq!(loaded.experience, 250);
    assert_eq!(loaded.currency, 40);
    assert_eq!(loaded.created_at, profile.created_at);
}

#[tokio::test]
async fn duplicate_completion_violates_constraint() {
    let (_dir, pool) = test_pool().await;
    let completions = SqliteCompletionRepo::new(pool.clone());

    let profile = seeded_user(&pool).await;
    let habit = seeded_habit(&pool, profile.id).await;

    let first = HabitCompletion::new(habit.id, profile.id, date(15), 50, now());
    completions
        .record(&first, &habit, &profile)
        .await
        .expect("first completion");

    let second = HabitCompletion::new(habit.id, profile.id, date(15), 50, now());
    let err = completions
        .record(&second, &habit, &profile)
        .await
        .expect_err("duplicate must fail");
    assert!(err.is_constraint_violation(), "got {err:?}");

    // The failed transaction left exactly one completion behind.
    let stored = completions
        .list_for_user(profile.id, Some(date(15)))
        .await
        .expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, first.id);
}

#[tokio::test]
async fn completion_unit_of_work_updates_all_rows() {
    let (_dir, pool) = test_pool().await;
    let completions = SqliteCompletionRepo::new(pool.clone());
    let habits = SqliteHabitRepo::new(pool.clone());
    let profiles = SqliteProfileRepo::new(pool.clone());

    let mut profile = seeded_user(&pool).await;
    let mut habit = seeded_habit(&pool, profile.id).await;

    let completion = HabitCompletion::new(habit.id, profile.id, date(15), 50, now());
    habit.record_completion(false, now());
    profile.apply_progression(profile.progression().apply_completion(50));
    profile.advance_streak(false);

    completions
        .record(&completion, &habit, &profile)
        .await
        .expect("record");

    let stored_habit = habits.get(habit.id).await.expect("get").expect("habit");
    assert_eq!(stored_habit.total_completions, 1);
    assert_eq!(stored_habit.current_streak, 1);

    let stored_profile = profiles
        .get(profile.id)
        .await
        .expect("get")
        .expect("profile");
    assert_eq!(stored_profile.experience, 50);
    assert_eq!(stored_profile.currency, 10);
    assert_eq!(stored_profile.current_streak, 1);
}

#[tokio::test]
async fn soft_deleted_habit_keeps_history() {
    let (_dir, pool) = test_pool().await;
    let completions = SqliteCompletionRepo::new(pool.clone());
    let habits = SqliteHabitRepo::new(pool.clone());

    let profile = seeded_user(&pool).await;
    let mut habit = seeded_habit(&pool, profile.id).await;

    let completion = HabitCompletion::new(habit.id, profile.id, date(14), 50, now());
    completions
        .record(&completion, &habit, &profile)
        .await
        .expect("record");

    habit.deactivate(now());
    habits.save(&habit).await.expect("save");

    let active = habits
        .list_active_for_user(profile.id)
        .await
        .expect("list");
    assert!(active.is_empty(), "soft-deleted habit still listed");

    let history = completions
        .list_for_user(profile.id, None)
        .await
        .expect("list");
    assert_eq!(history.len(), 1, "completion history must survive");
}

#[tokio::test]
async fn deleting_profile_cascades_owned_rows() {
    let (_dir, pool) = test_pool().await;
    let profiles = SqliteProfileRepo::new(pool.clone());
    let habits = SqliteHabitRepo::new(pool.clone());
    let completions = SqliteCompletionRepo::new(pool.clone());
    let penalties = SqlitePenaltyRepo::new(pool.clone());

    let profile = seeded_user(&pool).await;
    let habit = seeded_habit(&pool, profile.id).await;
    let completion = HabitCompletion::new(habit.id, profile.id, date(15), 50, now());
    completions
        .record(&completion, &habit, &profile)
        .await
        .expect("record");
    let penalty = Penalty::new(
        profile.id,
        habit.id,
        1500,
        PenaltyDestination::Cause,
        now(),
    );
    penalties.save(&penalty).await.expect("save penalty");

    profiles.delete(profile.id).await.expect("delete");

    assert!(habits
        .list_active_for_user(profile.id)
        .await
        .expect("list")
        .is_empty());
    assert!(completions
        .list_for_user(profile.id, None)
        .await
        .expect("list")
        .is_empty());
    assert!(penalties
        .list_for_user(profile.id, false)
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn catalog_seeding_is_idempotent() {
    let (_dir, pool) = test_pool().await;
    let achievements = SqliteAchievementRepo::new(pool.clone());
    let skills = SqliteSkillRepo::new(pool.clone());

    let achievement_catalog = catalog::default_achievements();
    let skill_catalog = catalog::default_skills();

    achievements
        .seed_catalog(&achievement_catalog)
        .await
        .expect("seed");
    achievements
        .seed_catalog(&achievement_catalog)
        .await
        .expect("second seed");
    assert_eq!(
        achievements.list_catalog().await.expect("list").len(),
        achievement_catalog.len()
    );

    skills.seed_catalog(&skill_catalog).await.expect("seed");
    skills.seed_catalog(&skill_catalog).await.expect("second seed");
    assert_eq!(
        skills.list_catalog().await.expect("list").len(),
        skill_catalog.len()
    );
}

#[tokio::test]
async fn unpaid_filter_narrows_penalty_list() {
    let (_dir, pool) = test_pool().await;
    let penalties = SqlitePenaltyRepo::new(pool.clone());

    let profile = seeded_user(&pool).await;
    let habit = seeded_habit(&pool, profile.id).await;

    let unpaid = Penalty::new(
        profile.id,
        habit.id,
        1500,
        PenaltyDestination::Political,
        now(),
    );
    let mut paid = Penalty::new(
        profile.id,
        habit.id,
        2000,
        PenaltyDestination::Cause,
        now(),
    );
    paid.settle("pi_123", now());

    penalties.save(&unpaid).await.expect("save");
    penalties.save(&paid).await.expect("save");

    let all = penalties
        .list_for_user(profile.id, false)
        .await
        .expect("list");
    assert_eq!(all.len(), 2);

    let open = penalties
        .list_for_user(profile.id, true)
        .await
        .expect("list");
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, unpaid.id);
}

#[tokio::test]
async fn duplicate_skill_unlock_violates_constraint() {
    let (_dir, pool) = test_pool().await;
    let skills = SqliteSkillRepo::new(pool.clone());

    let profile = seeded_user(&pool).await;
    let skill_catalog = catalog::default_skills();
    skills.seed_catalog(&skill_catalog).await.expect("seed");
    let stored = skills.list_catalog().await.expect("list");
    let skill = &stored[0];

    let first = habitquest_domain::UserSkill::new(profile.id, skill.id, now());
    skills.record_unlock(&first, &profile).await.expect("unlock");
    assert!(skills
        .is_unlocked(profile.id, skill.id)
        .await
        .expect("is_unlocked"));

    let second = habitquest_domain::UserSkill::new(profile.id, skill.id, now());
    let err = skills
        .record_unlock(&second, &profile)
        .await
        .expect_err("duplicate must fail");
    assert!(err.is_constraint_violation(), "got {err:?}");
}
