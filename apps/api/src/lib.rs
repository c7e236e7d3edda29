//! # Carlot API
//!
//! HTTP backend for car listings: CRUD over a SQLite document store, JWT
//! user accounts, and picture hosting through an external media service.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Carlot API Server                              │
//! │                                                                         │
//! │  Browser ───► HTTP (8000) ───► Handlers ───► carlot-core (validation)  │
//! │                                    │                                    │
//! │                                    ├───► carlot-db (SQLite)            │
//! │                                    │                                    │
//! │                                    └───► Media host (picture upload)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - listen port (default 8000)
//! - `DATABASE_PATH` - SQLite file path (default carlot.db)
//! - `JWT_SECRET` - token signing secret
//! - `JWT_LIFETIME_SECS` - token lifetime (default 21600, six hours)
//! - `MEDIA_UPLOAD_URL` - media host upload endpoint (required)
//! - `MEDIA_API_KEY` - optional media host bearer key

pub mod auth;
pub mod config;
pub mod error;
pub mod media;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
