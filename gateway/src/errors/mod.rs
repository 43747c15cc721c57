//! HTTP-boundary error types.
//!
//! Core errors are converted into these at the handler layer so that every
//! failure reaches the caller as a JSON body with a stable `kind` label.

pub mod app_error;
pub mod auth_error;

pub use app_error::{AppError, AppResult};
pub use auth_error::{AuthError, AuthResult};
