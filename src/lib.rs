//! Registration and login over HTTP, backed by Postgres, issuing JWT bearer tokens.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use app::{build_app, serve};
pub use error::{AppError, AppResult};
pub use state::AppState;
