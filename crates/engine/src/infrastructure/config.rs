//! Runtime configuration from environment variables.
//!
//! `.env.local` and `.env` at the repository root are loaded first (local
//! overrides win because variables already set are never overwritten).

use std::net::SocketAddr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CLIENT_QUEUE_CAPACITY: usize = 8;
const DEFAULT_CODE_GENERATION_ATTEMPTS: usize = 32;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Bound of each client's outbound queue; a client that fills it is disconnected.
    pub client_queue_capacity: usize,
    /// Generated codes tried before giving up with `CodeSpaceExhausted`.
    pub code_generation_attempts: usize,
    /// `*` or a comma-separated origin list; CORS is off when unset.
    pub cors_allowed_origins: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            client_queue_capacity: DEFAULT_CLIENT_QUEUE_CAPACITY,
            code_generation_attempts: DEFAULT_CODE_GENERATION_ATTEMPTS,
            cors_allowed_origins: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_port = var("SERVER_PORT")
            .or_else(|| var("PORT"))
            .map(|raw| parse_or_default("SERVER_PORT", &raw, defaults.server_port))
            .unwrap_or(defaults.server_port);

        let client_queue_capacity = var("CLIENT_QUEUE_CAPACITY")
            .map(|raw| {
                parse_or_default(
                    "CLIENT_QUEUE_CAPACITY",
                    &raw,
                    defaults.client_queue_capacity,
                )
            })
            .unwrap_or(defaults.client_queue_capacity)
            .max(1);

        let code_generation_attempts = var("CODE_GENERATION_ATTEMPTS")
            .map(|raw| {
                parse_or_default(
                    "CODE_GENERATION_ATTEMPTS",
                    &raw,
                    defaults.code_generation_attempts,
                )
            })
            .unwrap_or(defaults.code_generation_attempts)
            .max(1);

        Self {
            server_host: var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            client_queue_capacity,
            code_generation_attempts,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
        }
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.server_host, self.server_port).parse()?)
    }
}

fn parse_or_default<T>(key: &str, raw: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = raw, default = %default, "Invalid config value, using default");
            default
        }
    }
}

/// Load `.env.local` then `.env` from the repository root, if present.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
