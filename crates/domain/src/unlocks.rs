//! Unlock evaluation - pure eligibility rules for achievements and skills.
//!
//! Evaluation is monotonic: it only ever reports entries the user has not
//! unlocked yet, and re-running it against unchanged stats reports nothing
//! new. Recording the unlock (and racing duplicates) is the storage
//! layer's concern.

use std::collections::HashSet;

use crate::entities::{Achievement, AchievementCategory, Skill, UserProfile};
use crate::error::DomainError;
use crate::ids::AchievementId;

/// The profile counters achievement requirements are checked against.
#[derive(Debug, Clone, Copy)]
pub struct UnlockStats {
    pub level: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
}

impl UnlockStats {
    pub fn from_profile(profile: &UserProfile, total_completions: u32) -> Self {
        Self {
            level: profile.level,
            longest_streak: profile.longest_streak,
            total_completions,
        }
    }
}

/// Progress toward an achievement, capped at its requirement.
pub fn achievement_progress(stats: &UnlockStats, achievement: &Achievement) -> u32 {
    let counter = match achievement.category {
        AchievementCategory::Streak => stats.longest_streak,
        AchievementCategory::Level => stats.level,
        AchievementCategory::Habit => stats.total_completions,
        AchievementCategory::Special => 0,
    };
    counter.min(achievement.requirement)
}

/// Catalog entries the user now qualifies for but has not unlocked.
///
/// Secret and Special achievements are never auto-unlocked.
pub fn eligible_achievements<'a>(
    stats: &UnlockStats,
    catalog: &'a [Achievement],
    unlocked: &HashSet<AchievementId>,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| !a.is_secret && a.category != AchievementCategory::Special)
        .filter(|a| !unlocked.contains(&a.id))
        .filter(|a| achievement_progress(stats, a) >= a.requirement)
        .collect()
}

/// Check a skill unlock's preconditions: required level and cost.
pub fn validate_skill_unlock(profile: &UserProfile, skill: &Skill) -> Result<(), DomainError> {
    if profile.level < skill.required_level {
        return Err(DomainError::InsufficientLevel {
            required: skill.required_level,
            actual: profile.level,
        });
    }
    if profile.currency < skill.cost {
        return Err(DomainError::InsufficientCurrency {
            required: skill.cost,
            available: profile.currency,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SkillCategory;
    use crate::ids::UserId;
    use chrono::{TimeZone, Utc};

    fn stats(level: u32, longest_streak: u32, total_completions: u32) -> UnlockStats {
        UnlockStats {
            level,
            longest_streak,
            total_completions,
        }
    }

    fn catalog() -> Vec<Achievement> {
        vec![
            Achievement::new("Week One", AchievementCategory::Streak, 7),
            Achievement::new("Shadow Lord", AchievementCategory::Level, 25),
            Achievement::new("Iron Will", AchievementCategory::Habit, 100),
            Achievement::new("Hidden", AchievementCategory::Streak, 1).secret(),
            Achievement::new("Founder", AchievementCategory::Special, 1),
        ]
    }

    #[test]
    fn reports_only_entries_at_or_past_requirement() {
        let catalog = catalog();
        let eligible = eligible_achievements(&stats(3, 9, 40), &catalog, &HashSet::new());
        let names: Vec<_> = eligible.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Week One"]);
    }

    #[test]
    fn skips_already_unlocked_entries() {
        let catalog = catalog();
        let unlocked: HashSet<_> = [catalog[0].id].into_iter().collect();
        let eligible = eligible_achievements(&stats(30, 9, 40), &catalog, &unlocked);
        let names: Vec<_> = eligible.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Shadow Lord"]);
    }

    #[test]
    fn never_reports_secret_or_special_entries() {
        let catalog = catalog();
        let eligible = eligible_achievements(&stats(100, 100, 1000), &catalog, &HashSet::new());
        assert!(eligible.iter().all(|a| !a.is_secret));
        assert!(eligible
            .iter()
            .all(|a| a.category != AchievementCategory::Special));
    }

    #[test]
    fn progress_caps_at_requirement() {
        let achievement = Achievement::new("Iron Will", AchievementCategory::Habit, 100);
        assert_eq!(achievement_progress(&stats(1, 0, 73), &achievement), 73);
        assert_eq!(achievement_progress(&stats(1, 0, 250), &achievement), 100);
    }

    #[test]
    fn skill_unlock_checks_level_then_cost() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let mut profile = UserProfile::new(UserId::new(), now);
        let skill = Skill::new("Streak Shield", SkillCategory::Passive, 1)
            .with_cost(500)
            .with_required_level(5);

        assert!(matches!(
            validate_skill_unlock(&profile, &skill),
            Err(DomainError::InsufficientLevel {
                required: 5,
                actual: 1
            })
        ));

        profile.level = 5;
        profile.currency = 120;
        assert!(matches!(
            validate_skill_unlock(&profile, &skill),
            Err(DomainError::InsufficientCurrency {
                required: 500,
                available: 120
            })
        ));

        profile.currency = 500;
        assert!(validate_skill_unlock(&profile, &skill).is_ok());
    }
}
