//! Shared application state.
//!
//! Everything a handler depends on is constructed once at startup and
//! passed in here; there is no process-wide mutable state. Substituting a
//! test database or a mock media store is just building a different state.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::media::MediaStore;
use carlot_db::Database;

/// Dependencies handed to every request handler.
pub struct AppState {
    /// Database handle (pool + repositories).
    pub db: Database,

    /// Media upload host client.
    pub media: Arc<dyn MediaStore>,

    /// Token issuer/verifier.
    pub jwt: JwtManager,
}
