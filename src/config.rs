use std::env;

/// AppConfig
///
/// The immutable application configuration, loaded once at startup and shared
/// through the application state. Tests construct it via `Default` instead of
/// reading the environment.
#[derive(Clone)]
pub struct AppConfig {
    /// Postgres connection string. Only required for the relational backend.
    pub db_url: Option<String>,
    /// Which repository backend to construct at startup.
    pub backend: StorageBackend,
    /// Runtime environment marker; selects log format and fail-fast rules.
    pub env: Env,
    /// Secret for signing and validating identity tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Operator-configured admin allow-list (lowercased emails). A user whose
    /// email appears here is an admin regardless of the stored flag.
    pub admin_emails: Vec<String>,
    /// Listen address for the HTTP server.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: development conveniences in `Local`, hardened settings in
/// `Production`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// StorageBackend
///
/// The two interchangeable repository backends. The in-memory variant keeps
/// everything in process-local maps with no persistence; the Postgres variant
/// is the transactional store.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl Default for AppConfig {
    /// Non-panicking configuration for test scaffolding: in-memory backend,
    /// fixed secret, no admin allow-list.
    fn default() -> Self {
        Self {
            db_url: None,
            backend: StorageBackend::Memory,
            env: Env::Local,
            jwt_secret: "insecure-test-secret-do-not-deploy".to_string(),
            token_ttl_secs: 3600,
            admin_emails: vec![],
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment, failing fast when a value
    /// required for the selected environment/backend is missing.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is unset in production, or if the Postgres
    /// backend is selected without `DATABASE_URL`.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            _ => env::var("JWT_SECRET")
                .unwrap_or_else(|_| "insecure-local-secret-do-not-deploy".to_string()),
        };

        let db_url = env::var("DATABASE_URL").ok();

        // Backend selection: explicit STORAGE_BACKEND wins; otherwise the
        // relational store in production and the in-memory one locally.
        let backend = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("postgres") => StorageBackend::Postgres,
            Ok(other) => panic!("FATAL: unknown STORAGE_BACKEND {other:?}"),
            Err(_) => match env {
                Env::Production => StorageBackend::Postgres,
                Env::Local => StorageBackend::Memory,
            },
        };

        if backend == StorageBackend::Postgres && db_url.is_none() {
            panic!("FATAL: DATABASE_URL required for the postgres backend");
        }

        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let admin_emails = env::var("ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            db_url,
            backend,
            env,
            jwt_secret,
            token_ttl_secs,
            admin_emails,
            bind_addr,
        }
    }

    /// Whether this (already lowercased) email is on the admin allow-list.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}
