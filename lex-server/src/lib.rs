//! # lex-server
//!
//! HTTP surface for Lex.
//!
//! - `POST /ask` takes `{"question": "..."}` and returns `{answer, sources}`
//!   or `{"error": "..."}` with a 400, 401, 429, 500 or 504 status
//! - `GET /health` is a liveness check
//!
//! ```rust,ignore
//! use lex_server::{AppState, ServerConfig, run_server};
//!
//! run_server(ServerConfig::default(), AppState::new(Arc::new(pipeline))).await?;
//! ```

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, DEFAULT_REQUEST_TIMEOUT, ServerConfig, app_router, run_server};
