use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::Connection;
use serde::Deserialize;

/// Shared handler state: one SQLite connection, used from the blocking pool.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against the connection on tokio's blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            // A panicking request leaves the connection itself usable.
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            f(&conn)
        })
        .await?
    }
}

// Query parameters stay strings so that malformed values fall back to
// defaults instead of rejecting the request.

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub filter: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}
