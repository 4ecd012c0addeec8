/// Habit endpoints

use crate::client::ApiClient;
use crate::error::ClientResult;
use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use taskflow_shared::models::habit::{CreateHabit, Habit, HabitLog, HeatmapDay, StreakInfo};
use uuid::Uuid;

/// Habit API wrapper
pub struct HabitsApi<'a> {
    client: &'a ApiClient,
}

/// A habit with its derived streak info
#[derive(Debug, Deserialize)]
pub struct HabitWithStreaks {
    /// The habit itself
    #[serde(flatten)]
    pub habit: Habit,

    /// Derived streak info
    #[serde(flatten)]
    pub streaks: StreakInfo,
}

/// Habit list response
#[derive(Debug, Deserialize)]
pub struct HabitList {
    /// Habits with streak info
    pub habits: Vec<HabitWithStreaks>,

    /// Total count
    pub total: usize,
}

/// Log list response
#[derive(Debug, Deserialize)]
pub struct LogList {
    /// Habit the logs belong to
    pub habit_id: Uuid,

    /// Log entries, oldest-first
    pub logs: Vec<HabitLog>,

    /// Total count
    pub total: usize,
}

/// Aggregate statistics response
#[derive(Debug, Deserialize)]
pub struct AnalyticsSummary {
    /// Total number of habits
    pub total_habits: usize,

    /// Habits currently being tracked
    pub active_habits: usize,

    /// Share of possible completions achieved this month
    pub completion_rate: f64,

    /// Completions recorded this calendar month
    pub current_month_completions: usize,

    /// All-time completions
    pub total_completions: u32,

    /// Mean current streak across habits
    pub average_streak: f64,
}

/// Heatmap response
#[derive(Debug, Deserialize)]
pub struct Heatmap {
    /// Inclusive range start
    pub start_date: NaiveDate,

    /// Inclusive range end
    pub end_date: NaiveDate,

    /// Days with at least one completion
    pub data: Vec<HeatmapDay>,
}

impl<'a> HabitsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Lists habits with streak info
    pub async fn list(&self) -> ClientResult<HabitList> {
        self.client
            .request_json(Method::GET, "/habits", &[], None)
            .await
    }

    /// Creates a habit
    pub async fn create(&self, data: &CreateHabit) -> ClientResult<Habit> {
        self.client
            .request_json(
                Method::POST,
                "/habits",
                &[],
                Some(serde_json::to_value(data).expect("serializable input")),
            )
            .await
    }

    /// Fetches a habit with streak info
    pub async fn get(&self, id: Uuid) -> ClientResult<HabitWithStreaks> {
        self.client
            .request_json(Method::GET, &format!("/habits/{}", id), &[], None)
            .await
    }

    /// Partially updates a habit
    pub async fn update(&self, id: Uuid, patch: serde_json::Value) -> ClientResult<Habit> {
        self.client
            .request_json(Method::PATCH, &format!("/habits/{}", id), &[], Some(patch))
            .await
    }

    /// Deletes a habit and its logs
    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.client
            .request_no_content(Method::DELETE, &format!("/habits/{}", id), None)
            .await
    }

    /// Logs a day (upserts on date)
    pub async fn log(
        &self,
        id: Uuid,
        date: NaiveDate,
        completed: bool,
        notes: Option<&str>,
    ) -> ClientResult<HabitLog> {
        self.client
            .request_json(
                Method::POST,
                &format!("/habits/{}/logs", id),
                &[],
                Some(json!({ "date": date, "completed": completed, "notes": notes })),
            )
            .await
    }

    /// Lists a habit's logs, optionally bounded by date
    pub async fn logs(
        &self,
        id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ClientResult<LogList> {
        let mut query = Vec::new();
        if let Some(from) = from {
            query.push(("from".to_string(), from.to_string()));
        }
        if let Some(to) = to {
            query.push(("to".to_string(), to.to_string()));
        }

        self.client
            .request_json(Method::GET, &format!("/habits/{}/logs", id), &query, None)
            .await
    }

    /// Removes a day's log entry
    pub async fn delete_log(&self, id: Uuid, date: NaiveDate) -> ClientResult<()> {
        self.client
            .request_no_content(
                Method::DELETE,
                &format!("/habits/{}/logs/{}", id, date),
                None,
            )
            .await
    }

    /// Aggregate statistics across all habits
    pub async fn analytics_summary(&self) -> ClientResult<AnalyticsSummary> {
        self.client
            .request_json(Method::GET, "/habits/analytics/summary", &[], None)
            .await
    }

    /// Per-day completion heatmap
    pub async fn heatmap(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ClientResult<Heatmap> {
        let mut query = Vec::new();
        if let Some(from) = from {
            query.push(("from".to_string(), from.to_string()));
        }
        if let Some(to) = to {
            query.push(("to".to_string(), to.to_string()));
        }

        self.client
            .request_json(Method::GET, "/habits/analytics/heatmap", &query, None)
            .await
    }
}
