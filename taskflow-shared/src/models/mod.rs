/// Database models
///
/// This module contains all TaskFlow database models and their CRUD
/// operations:
///
/// - `user`: User accounts
/// - `session`: Refresh token sessions (rotation + revocation)
/// - `task`: Tasks with status/priority and a trash flow
/// - `note`: Notes with tags, pin/favorite flags, and collaborators
/// - `folder`: Folders for organizing tasks and notes
/// - `team`: Teams and role-based memberships
/// - `habit`: Habits, daily logs, and streak derivation

pub mod folder;
pub mod habit;
pub mod note;
pub mod session;
pub mod task;
pub mod team;
pub mod user;
