/// Habit endpoints
///
/// Habit CRUD plus per-day logs and derived analytics. Streaks are computed
/// from the logs on every read rather than stored, so deleting a log entry
/// immediately corrects the streak.
///
/// # Endpoints
///
/// - `GET    /api/v1/habits` - List with streak info
/// - `POST   /api/v1/habits` - Create (name required) → 201
/// - `GET    /api/v1/habits/:id` - Fetch one with streak info
/// - `PATCH  /api/v1/habits/:id` - Partial update
/// - `DELETE /api/v1/habits/:id` - Delete (logs cascade)
/// - `POST   /api/v1/habits/:id/logs` - Log a day (upsert on date)
/// - `GET    /api/v1/habits/:id/logs` - List logs (optional from/to)
/// - `DELETE /api/v1/habits/:id/logs/:date` - Remove a day's log
/// - `GET    /api/v1/habits/analytics/summary` - Aggregate statistics
/// - `GET    /api/v1/habits/analytics/heatmap` - Per-day completion counts

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::habit::{
        bucket_heatmap, compute_streaks, CreateHabit, Habit, HabitLog, HeatmapDay, LogHabit,
        StreakInfo, UpdateHabit,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create habit request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    /// Habit name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[serde(default)]
    pub description: Option<String>,

    /// Category (default: other)
    #[serde(default)]
    pub category: Option<taskflow_shared::models::habit::HabitCategory>,

    /// Frequency (default: daily)
    #[serde(default)]
    pub frequency: Option<taskflow_shared::models::habit::HabitFrequency>,

    /// Optional goal count
    #[serde(default)]
    pub goal: Option<i32>,

    /// Optional reminder time ("HH:MM")
    #[serde(default)]
    pub reminder_time: Option<String>,

    /// Display color
    #[serde(default)]
    pub color: Option<String>,
}

/// A habit with its derived streak information
#[derive(Debug, Serialize)]
pub struct HabitWithStreaks {
    /// The habit itself
    #[serde(flatten)]
    pub habit: Habit,

    /// Derived streak info
    #[serde(flatten)]
    pub streaks: StreakInfo,
}

/// Habit list response
#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    /// Habits with streak info
    pub habits: Vec<HabitWithStreaks>,

    /// Total count
    pub total: usize,
}

/// Log list response
#[derive(Debug, Serialize)]
pub struct LogListResponse {
    /// Habit the logs belong to
    pub habit_id: Uuid,

    /// Log entries, oldest-first
    pub logs: Vec<HabitLog>,

    /// Total count
    pub total: usize,
}

/// Date-range query for logs and the heatmap
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    /// Inclusive lower bound
    pub from: Option<NaiveDate>,

    /// Inclusive upper bound
    pub to: Option<NaiveDate>,
}

/// Aggregate statistics across all habits
#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    /// Total number of habits
    pub total_habits: usize,

    /// Habits currently being tracked
    pub active_habits: usize,

    /// Share of possible completions achieved this month (0.0 - 1.0)
    pub completion_rate: f64,

    /// Completions recorded this calendar month
    pub current_month_completions: usize,

    /// All-time completions
    pub total_completions: u32,

    /// Mean current streak across habits
    pub average_streak: f64,

    /// Top habits by current streak (at most 5)
    pub top_streaks: Vec<TopStreak>,
}

/// One entry in the top-streaks leaderboard
#[derive(Debug, Serialize)]
pub struct TopStreak {
    /// Habit ID
    pub habit_id: Uuid,

    /// Habit name
    pub habit_name: String,

    /// Current streak length
    pub current_streak: u32,

    /// Longest streak length
    pub longest_streak: u32,
}

/// Heatmap response
#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    /// Inclusive range start
    pub start_date: NaiveDate,

    /// Inclusive range end
    pub end_date: NaiveDate,

    /// Days with at least one completion
    pub data: Vec<HeatmapDay>,
}

/// Loads a habit and checks the caller owns it
async fn load_owned_habit(state: &AppState, auth: &AuthContext, id: Uuid) -> ApiResult<Habit> {
    let habit = Habit::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    if habit.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not have access to this habit".to_string(),
        ));
    }

    Ok(habit)
}

/// Attaches derived streak info to a habit
async fn with_streaks(state: &AppState, habit: Habit) -> ApiResult<HabitWithStreaks> {
    let dates = HabitLog::completed_dates(&state.db, habit.id).await?;
    let streaks = compute_streaks(&dates, Utc::now().date_naive());

    Ok(HabitWithStreaks { habit, streaks })
}

/// Lists the caller's habits with streak info
pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<HabitListResponse>> {
    let habits = Habit::list(&state.db, auth.user_id).await?;

    let mut enriched = Vec::with_capacity(habits.len());
    for habit in habits {
        enriched.push(with_streaks(&state, habit).await?);
    }
    let total = enriched.len();

    Ok(Json(HabitListResponse {
        habits: enriched,
        total,
    }))
}

/// Creates a habit owned by the caller
pub async fn create_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateHabitRequest>,
) -> ApiResult<(StatusCode, Json<Habit>)> {
    req.validate().map_err(ApiError::from)?;

    if let Some(ref reminder) = req.reminder_time {
        if !is_valid_reminder_time(reminder) {
            return Err(ApiError::ValidationError(vec![
                crate::error::ValidationErrorDetail {
                    field: "reminder_time".to_string(),
                    message: "Reminder time must be HH:MM".to_string(),
                },
            ]));
        }
    }

    let habit = Habit::create(
        &state.db,
        auth.user_id,
        CreateHabit {
            name: req.name,
            description: req.description,
            category: req
                .category
                .unwrap_or(taskflow_shared::models::habit::HabitCategory::Other),
            frequency: req
                .frequency
                .unwrap_or(taskflow_shared::models::habit::HabitFrequency::Daily),
            goal: req.goal,
            reminder_time: req.reminder_time,
            color: req.color,
        },
    )
    .await?;

    tracing::info!(habit_id = %habit.id, user_id = %auth.user_id, "Habit created");

    Ok((StatusCode::CREATED, Json(habit)))
}

/// Checks "HH:MM" reminder format
fn is_valid_reminder_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };

    matches!(hours.parse::<u8>(), Ok(h) if h < 24)
        && hours.len() == 2
        && matches!(minutes.parse::<u8>(), Ok(m) if m < 60)
        && minutes.len() == 2
}

/// Fetches a habit with streak info
pub async fn get_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<HabitWithStreaks>> {
    let habit = load_owned_habit(&state, &auth, id).await?;
    let enriched = with_streaks(&state, habit).await?;

    Ok(Json(enriched))
}

/// Applies a partial update to an owned habit
pub async fn update_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHabit>,
) -> ApiResult<Json<Habit>> {
    if let Some(ref name) = req.name {
        if name.is_empty() || name.len() > 100 {
            return Err(ApiError::ValidationError(vec![
                crate::error::ValidationErrorDetail {
                    field: "name".to_string(),
                    message: "Name must be 1-100 characters".to_string(),
                },
            ]));
        }
    }

    load_owned_habit(&state, &auth, id).await?;

    let habit = Habit::update(&state.db, id, req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    Ok(Json(habit))
}

/// Deletes an owned habit and its logs
pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_owned_habit(&state, &auth, id).await?;

    Habit::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Logs a day for an owned habit (upserts on date)
pub async fn log_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<LogHabit>,
) -> ApiResult<Json<HabitLog>> {
    load_owned_habit(&state, &auth, id).await?;

    let log = HabitLog::upsert(&state.db, id, req).await?;

    Ok(Json(log))
}

/// Lists an owned habit's logs
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<LogListResponse>> {
    load_owned_habit(&state, &auth, id).await?;

    let logs = HabitLog::list(&state.db, id, range.from, range.to).await?;
    let total = logs.len();

    Ok(Json(LogListResponse {
        habit_id: id,
        logs,
        total,
    }))
}

/// Removes a day's log entry
pub async fn delete_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, date)): Path<(Uuid, NaiveDate)>,
) -> ApiResult<StatusCode> {
    load_owned_habit(&state, &auth, id).await?;

    let removed = HabitLog::delete(&state.db, id, date).await?;
    if !removed {
        return Err(ApiError::NotFound("Log entry not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Aggregate statistics across the caller's habits
pub async fn analytics_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AnalyticsSummary>> {
    let habits = Habit::list(&state.db, auth.user_id).await?;
    let today = Utc::now().date_naive();
    let month_start = today.with_day(1).expect("first of month");

    let total_habits = habits.len();
    let active_habits = habits.iter().filter(|h| h.is_active).count();

    let mut total_completions = 0u32;
    let mut current_month_completions = 0usize;
    let mut streak_sum = 0u64;
    let mut top_streaks: Vec<TopStreak> = Vec::new();

    for habit in &habits {
        let dates = HabitLog::completed_dates(&state.db, habit.id).await?;
        let info = compute_streaks(&dates, today);

        total_completions += info.total_completions;
        current_month_completions += dates.iter().filter(|d| **d >= month_start).count();
        streak_sum += u64::from(info.current_streak);

        top_streaks.push(TopStreak {
            habit_id: habit.id,
            habit_name: habit.name.clone(),
            current_streak: info.current_streak,
            longest_streak: info.longest_streak,
        });
    }

    top_streaks.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));
    top_streaks.truncate(5);

    // Possible completions this month: one per active habit per elapsed day
    let possible = active_habits as f64 * f64::from(today.day());
    let completion_rate = if possible > 0.0 {
        (current_month_completions as f64 / possible).min(1.0)
    } else {
        0.0
    };

    let average_streak = if total_habits > 0 {
        streak_sum as f64 / total_habits as f64
    } else {
        0.0
    };

    Ok(Json(AnalyticsSummary {
        total_habits,
        active_habits,
        completion_rate,
        current_month_completions,
        total_completions,
        average_streak,
        top_streaks,
    }))
}

/// Per-day completion counts across all the caller's habits
///
/// Defaults to the trailing 365 days.
pub async fn analytics_heatmap(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<HeatmapResponse>> {
    let end_date = range.to.unwrap_or_else(|| Utc::now().date_naive());
    let start_date = range.from.unwrap_or(end_date - Duration::days(365));

    let rows: Vec<(NaiveDate, String)> = sqlx::query_as(
        r#"
        SELECT hl.date, h.name
        FROM habit_logs hl
        JOIN habits h ON h.id = hl.habit_id
        WHERE h.user_id = $1 AND hl.completed AND hl.date BETWEEN $2 AND $3
        ORDER BY hl.date
        "#,
    )
    .bind(auth.user_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(&state.db)
    .await?;

    let data = bucket_heatmap(&rows);

    Ok(Json(HeatmapResponse {
        start_date,
        end_date,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_habit_request_validation() {
        let valid: CreateHabitRequest = serde_json::from_str(r#"{"name": "Meditate"}"#).unwrap();
        assert!(valid.validate().is_ok());

        let empty: CreateHabitRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_reminder_time_format() {
        assert!(is_valid_reminder_time("07:30"));
        assert!(is_valid_reminder_time("23:59"));
        assert!(!is_valid_reminder_time("24:00"));
        assert!(!is_valid_reminder_time("7:30"));
        assert!(!is_valid_reminder_time("07:60"));
        assert!(!is_valid_reminder_time("0730"));
    }
}
