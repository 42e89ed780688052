//! HTTP routes.
//!
//! Request/response bodies are camelCase JSON matching the entity shapes
//! the UI consumes. The user id is an explicit path parameter on every
//! per-user route; there is no ambient session.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use habitquest_domain::{
    Achievement, DomainError, Habit, HabitCompletion, HabitId, Penalty, PenaltyId, Reward,
    RewardId, Skill, SkillId, UserAchievement, UserId, UserProfile, UserSkill,
};

use crate::app::App;
use crate::infrastructure::ports::{DailyCount, GatewayError};
use crate::use_cases::{habits, WorkflowError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/users", post(create_profile))
        .route("/api/users/{user_id}", get(get_profile))
        .route(
            "/api/users/{user_id}/habits",
            get(list_habits).post(create_habit),
        )
        .route(
            "/api/users/{user_id}/habits/{habit_id}",
            axum::routing::put(update_habit).delete(delete_habit),
        )
        .route(
            "/api/users/{user_id}/habits/{habit_id}/complete",
            post(complete_habit),
        )
        .route("/api/users/{user_id}/completions", get(list_completions))
        .route("/api/users/{user_id}/progress/weekly", get(weekly_progress))
        .route("/api/achievements", get(list_achievements))
        .route(
            "/api/users/{user_id}/achievements",
            get(list_user_achievements),
        )
        .route(
            "/api/users/{user_id}/achievements/evaluate",
            post(evaluate_achievements),
        )
        .route("/api/skills", get(list_skills))
        .route("/api/users/{user_id}/skills", get(list_user_skills))
        .route(
            "/api/users/{user_id}/skills/{skill_id}/unlock",
            post(unlock_skill),
        )
        .route("/api/users/{user_id}/penalties", get(list_penalties))
        .route("/api/users/{user_id}/rewards", get(list_rewards))
        .route(
            "/api/users/{user_id}/rewards/{reward_id}/claim",
            post(claim_reward),
        )
        .route(
            "/api/users/{user_id}/payment-intents",
            post(create_payment_intent),
        )
        .route("/api/users/{user_id}/payments/confirm", post(confirm_payment))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CreateProfileRequest {
    email: Option<String>,
    display_name: Option<String>,
}

async fn create_profile(
    State(app): State<Arc<App>>,
    body: Option<Json<CreateProfileRequest>>,
) -> Result<Json<UserProfile>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let profile = app
        .use_cases
        .profile
        .create(body.email, body.display_name)
        .await?;
    Ok(Json(profile))
}

async fn get_profile(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = app
        .use_cases
        .profile
        .get(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(profile))
}

// =============================================================================
// Habits
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateHabitRequest {
    name: String,
    description: Option<String>,
    category: String,
    icon: Option<String>,
    exp_reward: Option<i64>,
    penalty_minor: Option<i64>,
    penalty_destination: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateHabitRequest {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    icon: Option<String>,
    exp_reward: Option<i64>,
    penalty_minor: Option<i64>,
    penalty_destination: Option<String>,
}

async fn list_habits(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Habit>>, ApiError> {
    let habits = app
        .use_cases
        .habits
        .list(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(habits))
}

async fn create_habit(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<CreateHabitRequest>,
) -> Result<Json<Habit>, ApiError> {
    let habit = app
        .use_cases
        .habits
        .create(
            UserId::from_uuid(user_id),
            habits::NewHabit {
                name: body.name,
                description: body.description,
                category: body.category,
                icon: body.icon,
                exp_reward: body.exp_reward,
                penalty_minor: body.penalty_minor,
                penalty_destination: body.penalty_destination,
            },
        )
        .await?;
    Ok(Json(habit))
}

async fn update_habit(
    State(app): State<Arc<App>>,
    Path((user_id, habit_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, ApiError> {
    let habit = app
        .use_cases
        .habits
        .update(
            UserId::from_uuid(user_id),
            HabitId::from_uuid(habit_id),
            habits::HabitUpdate {
                name: body.name,
                description: body.description,
                category: body.category,
                icon: body.icon,
                exp_reward: body.exp_reward,
                penalty_minor: body.penalty_minor,
                penalty_destination: body.penalty_destination,
            },
        )
        .await?;
    Ok(Json(habit))
}

async fn delete_habit(
    State(app): State<Arc<App>>,
    Path((user_id, habit_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    app.use_cases
        .habits
        .delete(UserId::from_uuid(user_id), HabitId::from_uuid(habit_id))
        .await?;
    Ok(Json(MessageResponse {
        message: "Habit deleted successfully".to_string(),
    }))
}

// =============================================================================
// Completions
// =============================================================================

#[derive(Debug, Deserialize)]
struct CompleteHabitRequest {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct CompletionsQuery {
    date: Option<NaiveDate>,
}

async fn complete_habit(
    State(app): State<Arc<App>>,
    Path((user_id, habit_id)): Path<(Uuid, Uuid)>,
    body: Option<Json<CompleteHabitRequest>>,
) -> Result<Json<HabitCompletion>, ApiError> {
    let date = body.and_then(|Json(b)| b.date);
    let completion = app
        .use_cases
        .completion
        .execute(UserId::from_uuid(user_id), HabitId::from_uuid(habit_id), date)
        .await?;
    Ok(Json(completion))
}

async fn list_completions(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<CompletionsQuery>,
) -> Result<Json<Vec<HabitCompletion>>, ApiError> {
    let completions = app
        .use_cases
        .profile
        .completions(UserId::from_uuid(user_id), query.date)
        .await?;
    Ok(Json(completions))
}

async fn weekly_progress(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<DailyCount>>, ApiError> {
    let progress = app
        .use_cases
        .profile
        .weekly_progress(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(progress))
}

// =============================================================================
// Achievements
// =============================================================================

async fn list_achievements(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<Achievement>>, ApiError> {
    let achievements = app.repositories.achievement.list_catalog().await?;
    Ok(Json(achievements))
}

async fn list_user_achievements(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<UserAchievement>>, ApiError> {
    let unlocks = app
        .repositories
        .achievement
        .list_for_user(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(unlocks))
}

async fn evaluate_achievements(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<UserAchievement>>, ApiError> {
    let unlocked = app
        .use_cases
        .achievements
        .execute(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(unlocked))
}

// =============================================================================
// Skills
// =============================================================================

async fn list_skills(State(app): State<Arc<App>>) -> Result<Json<Vec<Skill>>, ApiError> {
    let skills = app.repositories.skill.list_catalog().await?;
    Ok(Json(skills))
}

async fn list_user_skills(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<UserSkill>>, ApiError> {
    let unlocks = app
        .repositories
        .skill
        .list_for_user(UserId::from_uuid(user_id))
        .await?;
    Ok(Json(unlocks))
}

async fn unlock_skill(
    State(app): State<Arc<App>>,
    Path((user_id, skill_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UserSkill>, ApiError> {
    let unlock = app
        .use_cases
        .skills
        .execute(UserId::from_uuid(user_id), SkillId::from_uuid(skill_id))
        .await?;
    Ok(Json(unlock))
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Deserialize)]
struct PenaltiesQuery {
    #[serde(default)]
    unpaid: bool,
}

#[derive(Debug, Deserialize)]
struct RewardsQuery {
    #[serde(default)]
    unclaimed: bool,
}

async fn list_penalties(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PenaltiesQuery>,
) -> Result<Json<Vec<Penalty>>, ApiError> {
    let penalties = app
        .use_cases
        .penalties
        .list(UserId::from_uuid(user_id), query.unpaid)
        .await?;
    Ok(Json(penalties))
}

async fn list_rewards(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RewardsQuery>,
) -> Result<Json<Vec<Reward>>, ApiError> {
    let rewards = app
        .use_cases
        .rewards
        .list(UserId::from_uuid(user_id), query.unclaimed)
        .await?;
    Ok(Json(rewards))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRewardRequest {
    transfer_ref: Option<String>,
}

async fn claim_reward(
    State(app): State<Arc<App>>,
    Path((user_id, reward_id)): Path<(Uuid, Uuid)>,
    body: Option<Json<ClaimRewardRequest>>,
) -> Result<Json<Reward>, ApiError> {
    let transfer_ref = body.and_then(|Json(b)| b.transfer_ref);
    let reward = app
        .use_cases
        .rewards
        .mark_claimed(
            UserId::from_uuid(user_id),
            RewardId::from_uuid(reward_id),
            transfer_ref,
        )
        .await?;
    Ok(Json(reward))
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentIntentRequest {
    penalty_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentResponse {
    client_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmPaymentRequest {
    payment_intent_id: String,
    penalty_ids: Vec<Uuid>,
}

async fn create_payment_intent(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let penalty_ids = body
        .penalty_ids
        .into_iter()
        .map(PenaltyId::from_uuid)
        .collect();
    let intent = app
        .use_cases
        .payments
        .create_intent(UserId::from_uuid(user_id), penalty_ids)
        .await?;
    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

async fn confirm_payment(
    State(app): State<Arc<App>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ConfirmPaymentRequest>,
) -> Result<Json<Vec<Penalty>>, ApiError> {
    let penalty_ids = body
        .penalty_ids
        .into_iter()
        .map(PenaltyId::from_uuid)
        .collect();
    let settled = app
        .use_cases
        .payments
        .confirm(
            UserId::from_uuid(user_id),
            &body.payment_intent_id,
            penalty_ids,
        )
        .await?;
    Ok(Json(settled))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    /// Domain-level conflict (already completed, already unlocked,
    /// insufficient level/currency) - distinct from validation failures so
    /// the UI can show a friendly message.
    Conflict(String),
    /// Payments are not configured; the feature is unavailable, not broken.
    NotConfigured,
    BadGateway(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::NotConfigured => (
                StatusCode::NOT_IMPLEMENTED,
                "Payment processing is not configured".to_string(),
            ),
            ApiError::BadGateway(msg) => {
                tracing::error!(error = %msg, "Payment gateway failure");
                (StatusCode::BAD_GATEWAY, "Payment gateway failure".to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotFound => ApiError::NotFound,
            WorkflowError::InvalidInput(msg) => ApiError::BadRequest(msg),
            WorkflowError::Domain(domain) => match domain {
                DomainError::Validation(_) | DomainError::Parse(_) | DomainError::InvalidId(_) => {
                    ApiError::BadRequest(domain.to_string())
                }
                DomainError::NotFound { .. } => ApiError::NotFound,
                DomainError::Constraint(_)
                | DomainError::AlreadyCompleted { .. }
                | DomainError::InsufficientLevel { .. }
                | DomainError::InsufficientCurrency { .. } => {
                    ApiError::Conflict(domain.to_string())
                }
            },
            WorkflowError::Repo(repo) => {
                if repo.is_not_found() {
                    ApiError::NotFound
                } else {
                    ApiError::Internal(repo.to_string())
                }
            }
            WorkflowError::Gateway(GatewayError::NotConfigured) => ApiError::NotConfigured,
            WorkflowError::Gateway(gateway) => ApiError::BadGateway(gateway.to_string()),
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}
