//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{
    AchievementRepo, ClockPort, CompletionRepo, HabitRepo, PaymentGatewayPort, PenaltyRepo,
    ProfileRepo, RewardRepo, SkillRepo,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the repository container and use cases. Passed to HTTP handlers
/// via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
pub struct Repositories {
    pub profile: Arc<dyn ProfileRepo>,
    pub habit: Arc<dyn HabitRepo>,
    pub completion: Arc<dyn CompletionRepo>,
    pub achievement: Arc<dyn AchievementRepo>,
    pub skill: Arc<dyn SkillRepo>,
    pub penalty: Arc<dyn PenaltyRepo>,
    pub reward: Arc<dyn RewardRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub habits: use_cases::HabitCrud,
    pub completion: use_cases::CompleteHabit,
    pub profile: use_cases::ProfileOps,
    pub achievements: use_cases::EvaluateUnlocks,
    pub skills: use_cases::UnlockSkill,
    pub penalties: Arc<use_cases::PenaltyLedger>,
    pub rewards: use_cases::RewardLedger,
    pub payments: use_cases::PaymentFlows,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        repositories: Repositories,
        gateway: Arc<dyn PaymentGatewayPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let habits = use_cases::HabitCrud::new(repositories.habit.clone(), clock.clone());
        let completion = use_cases::CompleteHabit::new(
            repositories.habit.clone(),
            repositories.completion.clone(),
            repositories.profile.clone(),
            clock.clone(),
        );
        let profile = use_cases::ProfileOps::new(
            repositories.profile.clone(),
            repositories.completion.clone(),
            clock.clone(),
        );
        let achievements = use_cases::EvaluateUnlocks::new(
            repositories.profile.clone(),
            repositories.completion.clone(),
            repositories.achievement.clone(),
            clock.clone(),
        );
        let skills = use_cases::UnlockSkill::new(
            repositories.profile.clone(),
            repositories.skill.clone(),
            clock.clone(),
        );
        let penalties = Arc::new(use_cases::PenaltyLedger::new(
            repositories.penalty.clone(),
            clock.clone(),
        ));
        let rewards = use_cases::RewardLedger::new(repositories.reward.clone(), clock);
        let payments = use_cases::PaymentFlows::new(
            repositories.penalty.clone(),
            penalties.clone(),
            gateway,
        );

        Self {
            repositories,
            use_cases: UseCases {
                habits,
                completion,
                profile,
                achievements,
                skills,
                penalties,
                rewards,
                payments,
            },
        }
    }
}
