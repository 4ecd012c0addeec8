/// Optimistic cache reconciliation tests
///
/// Exercises the cache with real task values: a failed status toggle must
/// leave the cached list exactly equal to the pre-toggle snapshot, and a
/// refetch that lost the race against an optimistic write must be
/// discarded.

use chrono::Utc;
use taskflow_client::cache::{CacheKey, QueryCache};
use taskflow_client::error::ClientError;
use taskflow_shared::models::task::{Task, TaskPriority, TaskStatus};
use uuid::Uuid;

fn task(title: &str, status: TaskStatus) -> Task {
    let now = Utc::now();
    Task {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        status,
        priority: TaskPriority::Medium,
        due_date: None,
        folder_id: None,
        team_id: None,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_failed_toggle_restores_exact_snapshot() {
    let cache: QueryCache<Task> = QueryCache::new();
    let key = CacheKey::new("tasks", "");

    let tasks = vec![
        task("Buy milk", TaskStatus::Todo),
        task("Ship release", TaskStatus::Doing),
    ];
    let toggle_id = tasks[0].id;
    cache.complete_refetch(&key, 0, tasks.clone());

    // Toggle the first task to done, then have the server call fail
    let result: Result<(), ClientError> = cache
        .optimistic_update(
            &key,
            |items| {
                for item in items.iter_mut() {
                    if item.id == toggle_id {
                        item.status = TaskStatus::Done;
                    }
                }
            },
            async {
                Err(ClientError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            },
        )
        .await;

    assert!(result.is_err());

    // The cache must equal the pre-toggle snapshot exactly
    let restored = cache.get(&key).unwrap();
    assert_eq!(restored, tasks);
    assert_eq!(restored[0].status, TaskStatus::Todo);
}

#[tokio::test]
async fn test_successful_toggle_applies_and_marks_stale() {
    let cache: QueryCache<Task> = QueryCache::new();
    let key = CacheKey::new("tasks", "");

    let tasks = vec![task("Buy milk", TaskStatus::Todo)];
    let toggle_id = tasks[0].id;
    cache.complete_refetch(&key, 0, tasks);

    let result: Result<(), ClientError> = cache
        .optimistic_update(
            &key,
            |items| {
                for item in items.iter_mut() {
                    if item.id == toggle_id {
                        item.status = TaskStatus::Done;
                    }
                }
            },
            async { Ok(()) },
        )
        .await;

    assert!(result.is_ok());

    // The optimistic value is visible immediately
    let cached = cache.get(&key).unwrap();
    assert_eq!(cached[0].status, TaskStatus::Done);

    // And the key is flagged for reconciliation with server truth
    assert!(cache.is_stale(&key));
}

#[tokio::test]
async fn test_optimistic_soft_delete_flow() {
    let cache: QueryCache<Task> = QueryCache::new();
    let key = CacheKey::new("tasks", "");

    let tasks = vec![
        task("Buy milk", TaskStatus::Todo),
        task("Ship release", TaskStatus::Doing),
    ];
    let delete_id = tasks[1].id;
    cache.complete_refetch(&key, 0, tasks);

    // Optimistically mark the task deleted so it vanishes from the list view
    let result: Result<(), ClientError> = cache
        .optimistic_update(
            &key,
            |items| {
                for item in items.iter_mut() {
                    if item.id == delete_id {
                        item.deleted_at = Some(Utc::now());
                    }
                }
            },
            async { Ok(()) },
        )
        .await;

    assert!(result.is_ok());

    let cached = cache.get(&key).unwrap();
    assert!(cached.iter().find(|t| t.id == delete_id).unwrap().is_deleted());
}

#[tokio::test]
async fn test_stale_refetch_cannot_clobber_optimistic_write() {
    let cache: QueryCache<Task> = QueryCache::new();
    let key = CacheKey::new("tasks", "");

    let tasks = vec![task("Buy milk", TaskStatus::Todo)];
    let toggle_id = tasks[0].id;
    cache.complete_refetch(&key, 0, tasks.clone());

    // A background refetch begins with the pre-toggle state...
    let refetch_generation = cache.begin_refetch(&key);

    // ...then the user toggles while it is in flight
    let _: Result<(), ClientError> = cache
        .optimistic_update(
            &key,
            |items| {
                for item in items.iter_mut() {
                    if item.id == toggle_id {
                        item.status = TaskStatus::Done;
                    }
                }
            },
            async { Ok(()) },
        )
        .await;

    // The refetch lands with stale (pre-toggle) data and must be discarded
    assert!(!cache.complete_refetch(&key, refetch_generation, tasks));
    assert_eq!(cache.get(&key).unwrap()[0].status, TaskStatus::Done);
}
