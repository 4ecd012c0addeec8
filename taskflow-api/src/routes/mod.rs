/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, logout)
/// - `users`: Profile endpoints
/// - `tasks`: Task CRUD with trash/restore
/// - `notes`: Note CRUD with trash/restore and collaborators
/// - `folders`: Folder CRUD
/// - `teams`: Team CRUD with member management
/// - `habits`: Habit CRUD with logs and analytics

pub mod auth;
pub mod folders;
pub mod habits;
pub mod health;
pub mod notes;
pub mod tasks;
pub mod teams;
pub mod users;
