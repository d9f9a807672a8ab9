//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for docchat-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://docchat.db"`).
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory for daily-rolling log files. Logs go to stdout when unset.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins; wildcard when unset.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,

    /// Model identifier handed to the provider client, e.g. `"gpt-4o-mini"`.
    pub model: String,

    /// How many document chunks to attach to each question.
    pub context_chunks: usize,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("DOCCHAT_BIND", "0.0.0.0:3000"),
            database_url: env_or("DOCCHAT_DATABASE_URL", "sqlite://docchat.db"),
            log_level: env_or("DOCCHAT_LOG", "info"),
            log_json: env_flag("DOCCHAT_LOG_JSON", false),
            log_dir: std::env::var("DOCCHAT_LOG_DIR").ok().filter(|v| !v.is_empty()),
            cors_allowed_origins: std::env::var("DOCCHAT_CORS_ORIGINS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            enable_swagger: env_flag("DOCCHAT_ENABLE_SWAGGER", true),
            model: env_or("DOCCHAT_MODEL", "gpt-4o-mini"),
            context_chunks: parse_env("DOCCHAT_CONTEXT_CHUNKS", 10),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
