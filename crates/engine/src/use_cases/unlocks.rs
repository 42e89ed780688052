//! Achievement evaluation and skill unlocking.

use std::collections::HashSet;
use std::sync::Arc;

use habitquest_domain::{
    eligible_achievements, validate_skill_unlock, DomainError, SkillId, UnlockStats,
    UserAchievement, UserId, UserSkill,
};

use crate::infrastructure::ports::{
    AchievementRepo, ClockPort, CompletionRepo, ProfileRepo, SkillRepo,
};
use crate::use_cases::WorkflowError;

/// Compares profile stats against the achievement catalog and records any
/// newly earned unlocks.
///
/// Monotonic and idempotent: nothing is ever revoked, and re-running
/// against unchanged stats records nothing. A concurrent evaluation racing
/// on the same achievement loses to the storage uniqueness constraint and
/// is skipped silently.
pub struct EvaluateUnlocks {
    profiles: Arc<dyn ProfileRepo>,
    completions: Arc<dyn CompletionRepo>,
    achievements: Arc<dyn AchievementRepo>,
    clock: Arc<dyn ClockPort>,
}

impl EvaluateUnlocks {
    pub fn new(
        profiles: Arc<dyn ProfileRepo>,
        completions: Arc<dyn CompletionRepo>,
        achievements: Arc<dyn AchievementRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            profiles,
            completions,
            achievements,
            clock,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<Vec<UserAchievement>, WorkflowError> {
        let mut profile = self
            .profiles
            .get(user_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        let total_completions = self.completions.count_for_user(user_id).await?;
        let catalog = self.achievements.list_catalog().await?;
        let unlocked: HashSet<_> = self
            .achievements
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|u| u.achievement_id)
            .collect();

        let stats = UnlockStats::from_profile(&profile, total_completions);
        let now = self.clock.now();
        let mut newly_unlocked = Vec::new();

        for achievement in eligible_achievements(&stats, &catalog, &unlocked) {
            let unlock =
                UserAchievement::new(user_id, achievement.id, achievement.requirement, now);

            // Grants are staged on a candidate profile so a lost race
            // leaves the running profile untouched.
            let mut candidate = profile.clone();
            candidate.apply_progression(
                candidate
                    .progression()
                    .grant_experience(achievement.exp_reward)
                    .grant_currency(achievement.currency_reward),
            );
            candidate.total_achievements += 1;
            candidate.updated_at = now;

            match self.achievements.record_unlock(&unlock, &candidate).await {
                Ok(()) => {
                    tracing::info!(
                        user_id = %user_id,
                        achievement = %achievement.name,
                        "Achievement unlocked"
                    );
                    profile = candidate;
                    newly_unlocked.push(unlock);
                }
                Err(e) if e.is_constraint_violation() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(newly_unlocked)
    }
}

/// Unlocks a skill after enforcing its level and cost gates, deducting the
/// cost atomically with the unlock record.
pub struct UnlockSkill {
    profiles: Arc<dyn ProfileRepo>,
    skills: Arc<dyn SkillRepo>,
    clock: Arc<dyn ClockPort>,
}

impl UnlockSkill {
    pub fn new(
        profiles: Arc<dyn ProfileRepo>,
        skills: Arc<dyn SkillRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            profiles,
            skills,
            clock,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        skill_id: SkillId,
    ) -> Result<UserSkill, WorkflowError> {
        let skill = self
            .skills
            .get_catalog_entry(skill_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        let mut profile = self
            .profiles
            .get(user_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;

        if self.skills.is_unlocked(user_id, skill_id).await? {
            return Err(DomainError::constraint("skill already unlocked").into());
        }

        validate_skill_unlock(&profile, &skill)?;

        let now = self.clock.now();
        profile.currency -= skill.cost;
        profile.updated_at = now;

        let unlock = UserSkill::new(user_id, skill_id, now);
        self.skills
            .record_unlock(&unlock, &profile)
            .await
            .map_err(|e| {
                if e.is_constraint_violation() {
                    WorkflowError::Domain(DomainError::constraint("skill already unlocked"))
                } else {
                    WorkflowError::Repo(e)
                }
            })?;

        Ok(unlock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockAchievementRepo, MockClockPort, MockCompletionRepo, MockProfileRepo, MockSkillRepo,
        RepoError,
    };
    use chrono::{TimeZone, Utc};
    use habitquest_domain::{
        Achievement, AchievementCategory, Skill, SkillCategory, UserProfile,
    };
    use mockall::predicate::*;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap()
    }

    fn fixed_clock() -> MockClockPort {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(now);
        clock
    }

    fn streak_achievement(requirement: u32) -> Achievement {
        Achievement::new("Week One", AchievementCategory::Streak, requirement)
            .with_rewards(100, 50)
    }

    #[tokio::test]
    async fn unlocks_earned_achievement_and_grants_rewards() {
        let user_id = UserId::new();
        let mut profile = UserProfile::new(user_id, now());
        profile.longest_streak = 7;
        let achievement = streak_achievement(7);
        let achievement_id = achievement.id;

        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get()
            .returning(move |_| Ok(Some(profile.clone())));

        let mut completions = MockCompletionRepo::new();
        completions.expect_count_for_user().returning(|_| Ok(10));

        let mut achievements = MockAchievementRepo::new();
        achievements
            .expect_list_catalog()
            .returning(move || Ok(vec![achievement.clone()]));
        achievements.expect_list_for_user().returning(|_| Ok(vec![]));
        achievements
            .expect_record_unlock()
            .withf(move |unlock, profile| {
                unlock.achievement_id == achievement_id
                    && unlock.progress == 7
                    && profile.experience == 100
                    && profile.currency == 50
                    && profile.total_achievements == 1
            })
            .returning(|_, _| Ok(()));

        let use_case = EvaluateUnlocks::new(
            Arc::new(profiles),
            Arc::new(completions),
            Arc::new(achievements),
            Arc::new(fixed_clock()),
        );

        let unlocked = use_case.execute(user_id).await.expect("evaluate");
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].achievement_id, achievement_id);
    }

    #[tokio::test]
    async fn second_evaluation_records_nothing() {
        let user_id = UserId::new();
        let mut profile = UserProfile::new(user_id, now());
        profile.longest_streak = 7;
        let achievement = streak_achievement(7);
        let achievement_id = achievement.id;

        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get()
            .returning(move |_| Ok(Some(profile.clone())));

        let mut completions = MockCompletionRepo::new();
        completions.expect_count_for_user().returning(|_| Ok(10));

        let mut achievements = MockAchievementRepo::new();
        achievements
            .expect_list_catalog()
            .returning(move || Ok(vec![achievement.clone()]));
        achievements.expect_list_for_user().returning(move |_| {
            Ok(vec![UserAchievement::new(
                user_id,
                achievement_id,
                7,
                now(),
            )])
        });
        // No record_unlock call expected.

        let use_case = EvaluateUnlocks::new(
            Arc::new(profiles),
            Arc::new(completions),
            Arc::new(achievements),
            Arc::new(fixed_clock()),
        );

        let unlocked = use_case.execute(user_id).await.expect("evaluate");
        assert!(unlocked.is_empty());
    }

    #[tokio::test]
    async fn lost_unlock_race_is_skipped() {
        let user_id = UserId::new();
        let mut profile = UserProfile::new(user_id, now());
        profile.longest_streak = 7;
        let achievement = streak_achievement(7);

        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get()
            .returning(move |_| Ok(Some(profile.clone())));

        let mut completions = MockCompletionRepo::new();
        completions.expect_count_for_user().returning(|_| Ok(0));

        let mut achievements = MockAchievementRepo::new();
        achievements
            .expect_list_catalog()
            .returning(move || Ok(vec![achievement.clone()]));
        achievements.expect_list_for_user().returning(|_| Ok(vec![]));
        achievements
            .expect_record_unlock()
            .returning(|_, _| Err(RepoError::constraint("UNIQUE constraint failed")));

        let use_case = EvaluateUnlocks::new(
            Arc::new(profiles),
            Arc::new(completions),
            Arc::new(achievements),
            Arc::new(fixed_clock()),
        );

        let unlocked = use_case.execute(user_id).await.expect("evaluate");
        assert!(unlocked.is_empty());
    }

    fn priced_skill() -> Skill {
        Skill::new("Streak Shield", SkillCategory::Passive, 1)
            .with_cost(500)
            .with_required_level(5)
    }

    #[tokio::test]
    async fn skill_unlock_enforces_level() {
        let user_id = UserId::new();
        let profile = UserProfile::new(user_id, now());
        let skill = priced_skill();
        let skill_id = skill.id;

        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get()
            .returning(move |_| Ok(Some(profile.clone())));

        let mut skills = MockSkillRepo::new();
        skills
            .expect_get_catalog_entry()
            .returning(move |_| Ok(Some(skill.clone())));
        skills.expect_is_unlocked().returning(|_, _| Ok(false));

        let use_case = UnlockSkill::new(
            Arc::new(profiles),
            Arc::new(skills),
            Arc::new(fixed_clock()),
        );

        let result = use_case.execute(user_id, skill_id).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Domain(DomainError::InsufficientLevel { .. }))
        ));
    }

    #[tokio::test]
    async fn skill_unlock_enforces_currency() {
        let user_id = UserId::new();
        let mut profile = UserProfile::new(user_id, now());
        profile.level = 5;
        profile.currency = 120;
        let skill = priced_skill();
        let skill_id = skill.id;

        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get()
            .returning(move |_| Ok(Some(profile.clone())));

        let mut skills = MockSkillRepo::new();
        skills
            .expect_get_catalog_entry()
            .returning(move |_| Ok(Some(skill.clone())));
        skills.expect_is_unlocked().returning(|_, _| Ok(false));

        let use_case = UnlockSkill::new(
            Arc::new(profiles),
            Arc::new(skills),
            Arc::new(fixed_clock()),
        );

        let result = use_case.execute(user_id, skill_id).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Domain(
                DomainError::InsufficientCurrency { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn skill_unlock_deducts_cost() {
        let user_id = UserId::new();
        let mut profile = UserProfile::new(user_id, now());
        profile.level = 5;
        profile.currency = 600;
        let skill = priced_skill();
        let skill_id = skill.id;

        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get()
            .returning(move |_| Ok(Some(profile.clone())));

        let mut skills = MockSkillRepo::new();
        skills
            .expect_get_catalog_entry()
            .returning(move |_| Ok(Some(skill.clone())));
        skills.expect_is_unlocked().returning(|_, _| Ok(false));
        skills
            .expect_record_unlock()
            .withf(move |unlock, profile| {
                unlock.skill_id == skill_id && profile.currency == 100
            })
            .returning(|_, _| Ok(()));

        let use_case = UnlockSkill::new(
            Arc::new(profiles),
            Arc::new(skills),
            Arc::new(fixed_clock()),
        );

        let unlock = use_case.execute(user_id, skill_id).await.expect("unlock");
        assert_eq!(unlock.skill_id, skill_id);
    }

    #[tokio::test]
    async fn repeated_skill_unlock_conflicts() {
        let user_id = UserId::new();
        let mut profile = UserProfile::new(user_id, now());
        profile.level = 10;
        profile.currency = 1000;
        let skill = priced_skill();
        let skill_id = skill.id;

        let mut profiles = MockProfileRepo::new();
        profiles
            .expect_get()
            .returning(move |_| Ok(Some(profile.clone())));

        let mut skills = MockSkillRepo::new();
        skills
            .expect_get_catalog_entry()
            .returning(move |_| Ok(Some(skill.clone())));
        skills.expect_is_unlocked().returning(|_, _| Ok(true));

        let use_case = UnlockSkill::new(
            Arc::new(profiles),
            Arc::new(skills),
            Arc::new(fixed_clock()),
        );

        let result = use_case.execute(user_id, skill_id).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Domain(DomainError::Constraint(_)))
        ));
    }
}
