//! Habit CRUD operations.

use std::sync::Arc;

use habitquest_domain::{Habit, HabitCategory, HabitId, PenaltyDestination, UserId};

use crate::infrastructure::ports::{ClockPort, HabitRepo};
use crate::use_cases::validation::{
    require_non_empty, require_non_empty_if_present, require_non_negative,
};
use crate::use_cases::WorkflowError;

/// Fields accepted when creating a habit.
#[derive(Debug, Default)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub icon: Option<String>,
    pub exp_reward: Option<i64>,
    pub penalty_minor: Option<i64>,
    pub penalty_destination: Option<String>,
}

/// Fields accepted when updating a habit; None leaves a field untouched.
#[derive(Debug, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub exp_reward: Option<i64>,
    pub penalty_minor: Option<i64>,
    pub penalty_destination: Option<String>,
}

pub struct HabitCrud {
    habits: Arc<dyn HabitRepo>,
    clock: Arc<dyn ClockPort>,
}

impl HabitCrud {
    pub fn new(habits: Arc<dyn HabitRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { habits, clock }
    }

    /// Active habits for the user, newest first.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Habit>, WorkflowError> {
        Ok(self.habits.list_active_for_user(user_id).await?)
    }

    pub async fn create(&self, user_id: UserId, new: NewHabit) -> Result<Habit, WorkflowError> {
        require_non_empty(&new.name, "Habit name")?;
        require_non_empty_if_present(&new.description, "Habit description")?;

        let category = new.category.parse::<HabitCategory>()?;

        let mut habit = Habit::new(user_id, new.name, category, self.clock.now());
        if let Some(description) = new.description {
            habit = habit.with_description(description);
        }
        if let Some(icon) = new.icon {
            habit = habit.with_icon(icon);
        }
        if let Some(exp_reward) = new.exp_reward {
            require_non_negative(exp_reward, "Experience reward")?;
            habit = habit.with_exp_reward(exp_reward);
        }
        if let Some(amount) = new.penalty_minor {
            require_non_negative(amount, "Penalty amount")?;
            habit.penalty_minor = amount;
        }
        if let Some(destination) = new.penalty_destination {
            habit.penalty_destination = Some(destination.parse::<PenaltyDestination>()?);
        }

        self.habits.save(&habit).await?;
        Ok(habit)
    }

    pub async fn update(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        update: HabitUpdate,
    ) -> Result<Habit, WorkflowError> {
        let mut habit = self.owned_habit(user_id, habit_id).await?;

        if let Some(name) = update.name {
            require_non_empty(&name, "Habit name")?;
            habit.name = name;
        }
        if let Some(description) = update.description {
            habit.description = Some(description);
        }
        if let Some(category) = update.category {
            habit.category = category.parse::<HabitCategory>()?;
        }
        if let Some(icon) = update.icon {
            habit.icon = icon;
        }
        if let Some(exp_reward) = update.exp_reward {
            require_non_negative(exp_reward, "Experience reward")?;
            habit.exp_reward = exp_reward;
        }
        if let Some(amount) = update.penalty_minor {
            require_non_negative(amount, "Penalty amount")?;
            habit.penalty_minor = amount;
        }
        if let Some(destination) = update.penalty_destination {
            habit.penalty_destination = Some(destination.parse::<PenaltyDestination>()?);
        }
        habit.updated_at = self.clock.now();

        self.habits.save(&habit).await?;
        Ok(habit)
    }

    /// Soft delete: the habit drops out of active lists, its completion
    /// history stays.
    pub async fn delete(&self, user_id: UserId, habit_id: HabitId) -> Result<(), WorkflowError> {
        let mut habit = self.owned_habit(user_id, habit_id).await?;
        habit.deactivate(self.clock.now());
        self.habits.save(&habit).await?;
        Ok(())
    }

    async fn owned_habit(
        &self,
        user_id: UserId,
        habit_id: HabitId,
    ) -> Result<Habit, WorkflowError> {
        let habit = self
            .habits
            .get(habit_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        if habit.user_id != user_id {
            return Err(WorkflowError::NotFound);
        }
        Ok(habit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, MockHabitRepo};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;

    fn fixed_clock() -> MockClockPort {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap());
        clock
    }

    #[tokio::test]
    async fn create_applies_defaults_and_saves() {
        let mut habits = MockHabitRepo::new();
        habits.expect_save().returning(|_| Ok(()));

        let crud = HabitCrud::new(Arc::new(habits), Arc::new(fixed_clock()));
        let habit = crud
            .create(
                UserId::new(),
                NewHabit {
                    name: "Morning run".into(),
                    category: "physical".into(),
                    ..NewHabit::default()
                },
            )
            .await
            .expect("create should succeed");

        assert_eq!(habit.category, HabitCategory::Physical);
        assert_eq!(habit.exp_reward, 50);
        assert!(habit.is_active);
    }

    #[tokio::test]
    async fn create_rejects_empty_name_without_saving() {
        let habits = MockHabitRepo::new();
        let crud = HabitCrud::new(Arc::new(habits), Arc::new(fixed_clock()));

        let result = crud
            .create(
                UserId::new(),
                NewHabit {
                    name: "  ".into(),
                    category: "mental".into(),
                    ..NewHabit::default()
                },
            )
            .await;

        assert!(matches!(result, Err(WorkflowError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let habits = MockHabitRepo::new();
        let crud = HabitCrud::new(Arc::new(habits), Arc::new(fixed_clock()));

        let result = crud
            .create(
                UserId::new(),
                NewHabit {
                    name: "Stretch".into(),
                    category: "weekly".into(),
                    ..NewHabit::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(WorkflowError::Domain(
                habitquest_domain::DomainError::Parse(_)
            ))
        ));
    }

    #[tokio::test]
    async fn delete_refuses_foreign_habit() {
        let owner = UserId::new();
        let intruder = UserId::new();
        let habit = Habit::new(
            owner,
            "Read",
            HabitCategory::Knowledge,
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        );
        let habit_id = habit.id;

        let mut habits = MockHabitRepo::new();
        habits
            .expect_get()
            .with(eq(habit_id))
            .returning(move |_| Ok(Some(habit.clone())));

        let crud = HabitCrud::new(Arc::new(habits), Arc::new(fixed_clock()));
        let result = crud.delete(intruder, habit_id).await;

        assert!(matches!(result, Err(WorkflowError::NotFound)));
    }

    #[tokio::test]
    async fn delete_soft_deletes() {
        let owner = UserId::new();
        let habit = Habit::new(
            owner,
            "Read",
            HabitCategory::Knowledge,
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        );
        let habit_id = habit.id;

        let mut habits = MockHabitRepo::new();
        habits
            .expect_get()
            .with(eq(habit_id))
            .returning(move |_| Ok(Some(habit.clone())));
        habits
            .expect_save()
            .withf(|h| !h.is_active)
            .returning(|_| Ok(()));

        let crud = HabitCrud::new(Arc::new(habits), Arc::new(fixed_clock()));
        crud.delete(owner, habit_id).await.expect("delete");
    }
}
