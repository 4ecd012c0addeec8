/// Habit model, daily logs, and streak derivation
///
/// A habit is a recurring activity tracked by per-day log entries. Logging
/// the same day twice upserts (the unique key is `(habit_id, date)`).
/// Streaks are derived from the logs, never stored: the current streak is
/// the run of consecutive completed days ending today or yesterday, the
/// longest streak is the longest consecutive run anywhere in the history.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE habit_frequency AS ENUM ('daily', 'weekly', 'custom');
/// CREATE TYPE habit_category AS ENUM (
///     'health', 'fitness', 'productivity', 'mindfulness', 'learning', 'social', 'other'
/// );
///
/// CREATE TABLE habits (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(100) NOT NULL,
///     description VARCHAR(500),
///     category habit_category NOT NULL DEFAULT 'other',
///     frequency habit_frequency NOT NULL DEFAULT 'daily',
///     goal INTEGER,
///     reminder_time VARCHAR(5),
///     color VARCHAR(20),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE habit_logs (
///     habit_id UUID NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
///     date DATE NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT TRUE,
///     notes VARCHAR(500),
///     logged_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (habit_id, date)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// How often a habit is meant to be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "habit_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    Daily,
    Weekly,
    Custom,
}

/// Habit category for grouping and visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "habit_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Health,
    Fitness,
    Productivity,
    Mindfulness,
    Learning,
    Social,
    Other,
}

/// Habit model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Habit {
    /// Unique habit ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Habit name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Category
    pub category: HabitCategory,

    /// Frequency
    pub frequency: HabitFrequency,

    /// Optional daily/weekly goal count
    pub goal: Option<i32>,

    /// Optional reminder time in "HH:MM" format
    pub reminder_time: Option<String>,

    /// Display color
    pub color: Option<String>,

    /// Whether the habit is currently tracked
    pub is_active: bool,

    /// When the habit was created
    pub created_at: DateTime<Utc>,

    /// When the habit was last updated
    pub updated_at: DateTime<Utc>,
}

/// A single day's log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HabitLog {
    /// Habit this entry belongs to
    pub habit_id: Uuid,

    /// Day of the entry
    pub date: NaiveDate,

    /// Whether the habit was completed that day
    pub completed: bool,

    /// Optional notes
    pub notes: Option<String>,

    /// When the entry was recorded
    pub logged_at: DateTime<Utc>,
}

/// Input for creating a habit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabit {
    /// Habit name (required)
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Category (default: other)
    #[serde(default = "default_category")]
    pub category: HabitCategory,

    /// Frequency (default: daily)
    #[serde(default = "default_frequency")]
    pub frequency: HabitFrequency,

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

fn default_category() -> HabitCategory {
    HabitCategory::Other
}

fn default_frequency() -> HabitFrequency {
    HabitFrequency::Daily
}

/// Input for partially updating a habit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHabit {
    /// New name
    #[serde(default)]
    pub name: Option<String>,

    /// New description (null clears)
    #[serde(default)]
    pub description: Option<Option<String>>,

    /// New category
    #[serde(default)]
    pub category: Option<HabitCategory>,

    /// New frequency
    #[serde(default)]
    pub frequency: Option<HabitFrequency>,

    /// New goal (null clears)
    #[serde(default)]
    pub goal: Option<Option<i32>>,

    /// New reminder time (null clears)
    #[serde(default)]
    pub reminder_time: Option<Option<String>>,

    /// New color (null clears)
    #[serde(default)]
    pub color: Option<Option<String>>,

    /// Activate/deactivate
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Input for logging a day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogHabit {
    /// Day being logged (YYYY-MM-DD)
    pub date: NaiveDate,

    /// Whether the habit was completed (default: true)
    #[serde(default = "default_completed")]
    pub completed: bool,

    /// Optional notes
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_completed() -> bool {
    true
}

impl Habit {
    /// Creates a new habit owned by `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateHabit,
    ) -> Result<Self, sqlx::Error> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (user_id, name, description, category, frequency, goal, reminder_time, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, name, description, category, frequency, goal,
                      reminder_time, color, is_active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.category)
        .bind(data.frequency)
        .bind(data.goal)
        .bind(data.reminder_time)
        .bind(data.color)
        .fetch_one(pool)
        .await?;

        Ok(habit)
    }

    /// Finds a habit by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, category, frequency, goal,
                   reminder_time, color, is_active, created_at, updated_at
            FROM habits
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(habit)
    }

    /// Lists a user's habits, newest-first
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, category, frequency, goal,
                   reminder_time, color, is_active, created_at, updated_at
            FROM habits
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(habits)
    }

    /// Applies a partial update
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateHabit,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE habits SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category = ${}", bind_count));
        }
        if data.frequency.is_some() {
            bind_count += 1;
            query.push_str(&format!(", frequency = ${}", bind_count));
        }
        if data.goal.is_some() {
            bind_count += 1;
            query.push_str(&format!(", goal = ${}", bind_count));
        }
        if data.reminder_time.is_some() {
            bind_count += 1;
            query.push_str(&format!(", reminder_time = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, user_id, name, description, category, frequency, \
             goal, reminder_time, color, is_active, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Habit>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(category) = data.category {
            q = q.bind(category);
        }
        if let Some(frequency) = data.frequency {
            q = q.bind(frequency);
        }
        if let Some(goal) = data.goal {
            q = q.bind(goal);
        }
        if let Some(reminder_time) = data.reminder_time {
            q = q.bind(reminder_time);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let habit = q.fetch_optional(pool).await?;

        Ok(habit)
    }

    /// Deletes a habit (logs cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl HabitLog {
    /// Records (or re-records) a day's log entry
    ///
    /// Logging the same day twice updates the existing entry.
    pub async fn upsert(
        pool: &PgPool,
        habit_id: Uuid,
        data: LogHabit,
    ) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, HabitLog>(
            r#"
            INSERT INTO habit_logs (habit_id, date, completed, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (habit_id, date)
            DO UPDATE SET completed = EXCLUDED.completed,
                          notes = EXCLUDED.notes,
                          logged_at = NOW()
            RETURNING habit_id, date, completed, notes, logged_at
            "#,
        )
        .bind(habit_id)
        .bind(data.date)
        .bind(data.completed)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Lists a habit's log entries, oldest-first, optionally bounded
    pub async fn list(
        pool: &PgPool,
        habit_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT habit_id, date, completed, notes, logged_at \
             FROM habit_logs WHERE habit_id = $1",
        );

        let mut bind_count = 1;
        if from.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND date >= ${}", bind_count));
        }
        if to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND date <= ${}", bind_count));
        }

        query.push_str(" ORDER BY date");

        let mut q = sqlx::query_as::<_, HabitLog>(&query).bind(habit_id);

        if let Some(from) = from {
            q = q.bind(from);
        }
        if let Some(to) = to {
            q = q.bind(to);
        }

        let logs = q.fetch_all(pool).await?;

        Ok(logs)
    }

    /// Dates on which the habit was completed, oldest-first
    pub async fn completed_dates(
        pool: &PgPool,
        habit_id: Uuid,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT date FROM habit_logs WHERE habit_id = $1 AND completed ORDER BY date",
        )
        .bind(habit_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    /// Removes a day's log entry
    ///
    /// Returns true if an entry existed.
    pub async fn delete(
        pool: &PgPool,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habit_logs WHERE habit_id = $1 AND date = $2")
            .bind(habit_id)
            .bind(date)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Computed streak information for a habit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakInfo {
    /// Consecutive completed days ending today or yesterday
    pub current_streak: u32,

    /// Longest consecutive run in the habit's history
    pub longest_streak: u32,

    /// Total completed days
    pub total_completions: u32,

    /// Most recent completed day
    pub last_completed: Option<NaiveDate>,
}

/// Derives streak information from completed-day dates
///
/// `dates` need not be sorted or deduplicated. A streak is unbroken as long
/// as the most recent completion is today or yesterday; a habit completed
/// two days ago has a current streak of zero.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use taskflow_shared::models::habit::compute_streaks;
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
/// let dates = vec![
///     NaiveDate::from_ymd_opt(2025, 6, 8).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
/// ];
///
/// let info = compute_streaks(&dates, today);
/// assert_eq!(info.current_streak, 3);
/// assert_eq!(info.longest_streak, 3);
/// ```
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> StreakInfo {
    let set: HashSet<NaiveDate> = dates.iter().copied().collect();

    if set.is_empty() {
        return StreakInfo::default();
    }

    // Current streak: walk back from today (or yesterday, if today isn't
    // logged yet)
    let mut current_streak = 0u32;
    let start = if set.contains(&today) {
        Some(today)
    } else {
        let yesterday = today.pred_opt().expect("date arithmetic");
        set.contains(&yesterday).then_some(yesterday)
    };

    if let Some(mut day) = start {
        while set.contains(&day) {
            current_streak += 1;
            day = match day.pred_opt() {
                Some(prev) => prev,
                None => break,
            };
        }
    }

    // Longest streak: longest consecutive run over the sorted history
    let mut sorted: Vec<NaiveDate> = set.iter().copied().collect();
    sorted.sort();

    let mut longest_streak = 1u32;
    let mut run = 1u32;
    for pair in sorted.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 1;
        }
    }

    StreakInfo {
        current_streak,
        longest_streak,
        total_completions: set.len() as u32,
        last_completed: sorted.last().copied(),
    }
}

/// A single day's bucket in the completion heatmap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapDay {
    /// Day of the bucket
    pub date: NaiveDate,

    /// Number of habits completed that day
    pub completions: u32,

    /// Names of the completed habits
    pub habits: Vec<String>,
}

/// Buckets completed logs into per-day heatmap entries
///
/// Input rows are `(date, habit name)` pairs for completed logs; output is
/// sorted by date and only contains days with at least one completion.
pub fn bucket_heatmap(rows: &[(NaiveDate, String)]) -> Vec<HeatmapDay> {
    use std::collections::BTreeMap;

    let mut days: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for (date, name) in rows {
        days.entry(*date).or_default().push(name.clone());
    }

    days.into_iter()
        .map(|(date, habits)| HeatmapDay {
            date,
            completions: habits.len() as u32,
            habits,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_streaks_empty() {
        let info = compute_streaks(&[], d(2025, 6, 10));
        assert_eq!(info.current_streak, 0);
        assert_eq!(info.longest_streak, 0);
        assert_eq!(info.total_completions, 0);
        assert!(info.last_completed.is_none());
    }

    #[test]
    fn test_current_streak_ending_today() {
        let dates = vec![d(2025, 6, 8), d(2025, 6, 9), d(2025, 6, 10)];
        let info = compute_streaks(&dates, d(2025, 6, 10));
        assert_eq!(info.current_streak, 3);
    }

    #[test]
    fn test_current_streak_ending_yesterday() {
        // Not yet logged today; streak still alive from yesterday
        let dates = vec![d(2025, 6, 8), d(2025, 6, 9)];
        let info = compute_streaks(&dates, d(2025, 6, 10));
        assert_eq!(info.current_streak, 2);
    }

    #[test]
    fn test_current_streak_broken() {
        // Last completion two days ago: streak is over
        let dates = vec![d(2025, 6, 7), d(2025, 6, 8)];
        let info = compute_streaks(&dates, d(2025, 6, 10));
        assert_eq!(info.current_streak, 0);
        assert_eq!(info.longest_streak, 2);
    }

    #[test]
    fn test_longest_streak_in_history() {
        // 5-day run in the past, 2-day current run
        let dates = vec![
            d(2025, 5, 1),
            d(2025, 5, 2),
            d(2025, 5, 3),
            d(2025, 5, 4),
            d(2025, 5, 5),
            d(2025, 6, 9),
            d(2025, 6, 10),
        ];
        let info = compute_streaks(&dates, d(2025, 6, 10));
        assert_eq!(info.current_streak, 2);
        assert_eq!(info.longest_streak, 5);
        assert_eq!(info.total_completions, 7);
        assert_eq!(info.last_completed, Some(d(2025, 6, 10)));
    }

    #[test]
    fn test_streaks_unsorted_with_duplicates() {
        let dates = vec![d(2025, 6, 10), d(2025, 6, 8), d(2025, 6, 9), d(2025, 6, 9)];
        let info = compute_streaks(&dates, d(2025, 6, 10));
        assert_eq!(info.current_streak, 3);
        assert_eq!(info.total_completions, 3);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let dates = vec![d(2025, 5, 30), d(2025, 5, 31), d(2025, 6, 1)];
        let info = compute_streaks(&dates, d(2025, 6, 1));
        assert_eq!(info.current_streak, 3);
    }

    #[test]
    fn test_bucket_heatmap() {
        let rows = vec![
            (d(2025, 6, 9), "Run".to_string()),
            (d(2025, 6, 10), "Run".to_string()),
            (d(2025, 6, 10), "Read".to_string()),
        ];

        let heatmap = bucket_heatmap(&rows);
        assert_eq!(heatmap.len(), 2);
        assert_eq!(heatmap[0].date, d(2025, 6, 9));
        assert_eq!(heatmap[0].completions, 1);
        assert_eq!(heatmap[1].completions, 2);
        assert!(heatmap[1].habits.contains(&"Read".to_string()));
    }

    #[test]
    fn test_create_habit_defaults() {
        let create: CreateHabit = serde_json::from_str(r#"{"name": "Meditate"}"#).unwrap();
        assert_eq!(create.category, HabitCategory::Other);
        assert_eq!(create.frequency, HabitFrequency::Daily);
    }

    #[test]
    fn test_log_habit_defaults_completed() {
        let log: LogHabit = serde_json::from_str(r#"{"date": "2025-06-10"}"#).unwrap();
        assert!(log.completed);
    }
}
