use std::path::PathBuf;

use lenderoo_core::status::{StatusConfig, DEFAULT_DUE_SOON_DAYS};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Items due within this many days count as due soon (default: `3`).
    pub due_soon_days: i64,
    /// Directory uploaded item images are written to and served from.
    pub files_dir: PathBuf,
    /// Public URL of the `/files` mount, used to build image URLs.
    pub files_base_url: String,
    /// Account the server acts for. Unset means every request is
    /// unauthenticated.
    pub user_id: Option<String>,
    pub user_email: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                        |
    /// |------------------------|--------------------------------|
    /// | `HOST`                 | `0.0.0.0`                      |
    /// | `PORT`                 | `3000`                         |
    /// | `CORS_ORIGINS`         | `http://localhost:8081`        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                           |
    /// | `DUE_SOON_DAYS`        | `3`                            |
    /// | `FILES_DIR`            | `./data/files`                 |
    /// | `FILES_BASE_URL`       | `http://localhost:3000/files`  |
    /// | `LENDEROO_USER_ID`     | unset                          |
    /// | `LENDEROO_USER_EMAIL`  | unset                          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8081".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let due_soon_days: i64 = std::env::var("DUE_SOON_DAYS")
            .unwrap_or_else(|_| DEFAULT_DUE_SOON_DAYS.to_string())
            .parse()
            .expect("DUE_SOON_DAYS must be a valid integer");

        let files_dir = PathBuf::from(
            std::env::var("FILES_DIR").unwrap_or_else(|_| "./data/files".into()),
        );

        let files_base_url = std::env::var("FILES_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/files".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            due_soon_days,
            files_dir,
            files_base_url,
            user_id: non_empty_var("LENDEROO_USER_ID"),
            user_email: non_empty_var("LENDEROO_USER_EMAIL"),
        }
    }

    pub fn status_config(&self) -> StatusConfig {
        StatusConfig {
            due_soon_days: self.due_soon_days,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
