/// Authentication utilities
///
/// This module groups the pieces of the authentication system:
///
/// - `jwt`: Access/refresh token creation and validation
/// - `password`: Argon2id password hashing and strength checks
/// - `middleware`: Axum middleware that authenticates incoming requests

pub mod jwt;
pub mod middleware;
pub mod password;
