//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is
//! concrete types. Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - The payment gateway (could swap Stripe -> other)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{GatewayError, RepoError};
pub use external::{PaymentGatewayPort, PaymentIntent, PaymentMetadata};
pub use repos::{
    AchievementRepo, CompletionRepo, DailyCount, HabitRepo, PenaltyRepo, ProfileRepo, RewardRepo,
    SkillRepo,
};
pub use testing::ClockPort;

#[cfg(test)]
pub use external::MockPaymentGatewayPort;
#[cfg(test)]
pub use repos::{
    MockAchievementRepo, MockCompletionRepo, MockHabitRepo, MockPenaltyRepo, MockProfileRepo,
    MockRewardRepo, MockSkillRepo,
};
#[cfg(test)]
pub use testing::MockClockPort;
