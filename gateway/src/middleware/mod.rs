pub mod auth;

pub use auth::{VAPI_SECRET_HEADER, vapi_secret_middleware};
