//! HTTP request handlers
//!
//! - `api` - Service info and health check endpoints
//! - `synthesize` - Speech synthesis (`/synthesize`) and its diagnostic twin (`/test`)

pub mod api;
pub mod synthesize;

pub use api::{health_check, root_info};
pub use synthesize::{synthesize_handler, test_handler};
