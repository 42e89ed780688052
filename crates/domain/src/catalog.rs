//! Authoritative catalog data for achievements and skills.
//!
//! The server seeds these into storage at startup; the UI renders whatever
//! the API returns and embeds no fallback copies.

use crate::entities::{
    Achievement, AchievementCategory, Rarity, Skill, SkillCategory,
};

/// The built-in achievement catalog, ordered by category and requirement.
pub fn default_achievements() -> Vec<Achievement> {
    vec![
        // Streak achievements
        Achievement::new("First Spark", AchievementCategory::Streak, 3)
            .with_description("Hold a 3 day streak")
            .with_icon("fas fa-bolt")
            .with_rewards(50, 25)
            .with_rarity(Rarity::Common),
        Achievement::new("Week One", AchievementCategory::Streak, 7)
            .with_description("Hold a 7 day streak")
            .with_icon("fas fa-calendar-week")
            .with_rewards(100, 50)
            .with_rarity(Rarity::Rare),
        Achievement::new("Streak Master", AchievementCategory::Streak, 14)
            .with_description("Complete 14 days streak")
            .with_icon("fas fa-fire")
            .with_rewards(200, 100)
            .with_rarity(Rarity::Epic),
        Achievement::new("Perfect Month", AchievementCategory::Streak, 30)
            .with_description("30 days no missed habits")
            .with_icon("fas fa-star")
            .with_rewards(2000, 1000)
            .with_rarity(Rarity::Legendary),
        // Level achievements
        Achievement::new("Rising Hunter", AchievementCategory::Level, 10)
            .with_description("Reach level 10")
            .with_icon("fas fa-arrow-up")
            .with_rewards(300, 150)
            .with_rarity(Rarity::Rare),
        Achievement::new("Shadow Lord", AchievementCategory::Level, 25)
            .with_description("Reach level 25")
            .with_icon("fas fa-crown")
            .with_rewards(1000, 500)
            .with_rarity(Rarity::Legendary),
        // Completion-count achievements
        Achievement::new("First Blood", AchievementCategory::Habit, 1)
            .with_description("Complete your first habit")
            .with_icon("fas fa-check")
            .with_rewards(50, 25)
            .with_rarity(Rarity::Common),
        Achievement::new("Iron Will", AchievementCategory::Habit, 100)
            .with_description("Complete 100 workouts")
            .with_icon("fas fa-dumbbell")
            .with_rewards(500, 250)
            .with_rarity(Rarity::Rare),
    ]
}

/// The built-in skill tree, ordered by tier.
pub fn default_skills() -> Vec<Skill> {
    vec![
        Skill::new("Streak Shield", SkillCategory::Passive, 1)
            .with_description("Protect one missed day per week")
            .with_icon("fas fa-shield-alt")
            .with_cost(500)
            .with_required_level(5)
            .with_effect(r#"{"type":"streak_shield","usesPerWeek":1}"#),
        Skill::new("Time Warp", SkillCategory::Active, 2)
            .with_description("Complete yesterday's missed habit")
            .with_icon("fas fa-clock")
            .with_cost(800)
            .with_required_level(10)
            .with_effect(r#"{"type":"backfill_completion","windowDays":1}"#),
        Skill::new("EXP Multiplier", SkillCategory::Passive, 3)
            .with_description("2x EXP for perfect weeks")
            .with_icon("fas fa-bolt")
            .with_cost(1200)
            .with_required_level(15)
            .with_effect(r#"{"type":"exp_multiplier","factor":2}"#),
        Skill::new("Penalty Reduction", SkillCategory::Ultimate, 3)
            .with_description("50% off financial penalties")
            .with_icon("fas fa-coins")
            .with_cost(2000)
            .with_required_level(25)
            .with_effect(r#"{"type":"penalty_discount","percent":50}"#),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn achievement_catalog_covers_every_auto_category() {
        let catalog = default_achievements();
        for category in [
            AchievementCategory::Streak,
            AchievementCategory::Level,
            AchievementCategory::Habit,
        ] {
            assert!(
                catalog.iter().any(|a| a.category == category),
                "missing {:?} achievements",
                category
            );
        }
        assert!(catalog.iter().all(|a| a.requirement > 0));
    }

    #[test]
    fn skill_tree_tiers_gate_by_level_and_cost() {
        let skills = default_skills();
        assert_eq!(skills.len(), 4);
        // Higher tiers never get cheaper or lower-level than tier 1.
        let tier1 = &skills[0];
        for skill in &skills[1..] {
            assert!(skill.tier >= tier1.tier);
            assert!(skill.cost >= tier1.cost);
            assert!(skill.required_level >= tier1.required_level);
        }
    }
}
