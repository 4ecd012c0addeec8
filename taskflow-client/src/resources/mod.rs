/// Typed per-resource API wrappers
///
/// One thin wrapper per REST resource, sharing DTO types with the server
/// via `taskflow_shared::models`:
///
/// - `auth`: login/register/refresh/logout (manages the token store)
/// - `tasks`: task CRUD, trash/restore, duplicate
/// - `notes`: note CRUD, trash/restore, collaborators
/// - `folders`: folder CRUD
/// - `teams`: team CRUD and member management
/// - `habits`: habit CRUD, logs, analytics

pub mod auth;
pub mod folders;
pub mod habits;
pub mod notes;
pub mod tasks;
pub mod teams;
