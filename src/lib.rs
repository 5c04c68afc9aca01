//! Client library for the campus management backend.
//!
//! The pieces, leaf first:
//! - [`api`]: the HTTP seam ([`api::ApiClient`]) and the error type
//! - [`storage`]: the persisted session token
//! - [`models`]: records exchanged with the backend
//! - [`session`]: login state derived from the token
//! - [`dashboard`]: the faculty and student dashboards
//! - [`library`]: issuing and revoking library books
//! - [`cli`]: the `campus` command-line front-end

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod library;
pub mod models;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ClientError, HttpApiClient, Result};
pub use config::Config;
pub use session::{Readiness, SessionState, SessionStore};
