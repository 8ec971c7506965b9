use serde::Deserialize;
use std::net::IpAddr;
use std::path::PathBuf;

/// Per-IP request rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub db_max_connections: u32,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// `None` disables rate limiting.
    pub rate_limit: Option<RateLimitConfig>,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Logs the loaded configuration (without sensitive values). Called once
    /// tracing is initialized, since the log level itself comes from here.
    pub fn log_summary(&self) {
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database: {}", redact_database_url(&self.database_url));
        tracing::debug!("Server: {}:{}", self.host, self.port);
        match self.rate_limit {
            Some(limit) => tracing::debug!(
                "Rate limit: {}/s per IP, burst {}",
                limit.per_second,
                limit.burst_size
            ),
            None => tracing::warn!("Rate limiting disabled"),
        }
        if let Some(ref path) = self.log_file {
            tracing::info!("Also logging to {}", path.display());
        }
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => compose_database_url(&var)?,
        };
        if !database_url.starts_with("postgresql://") && !database_url.starts_with("postgres://") {
            anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
        }

        let host: IpAddr = var("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("HOST must be a valid IP address"))?;

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let db_max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", 10u32)?;
        if db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        let log_level = var("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase();
        if !matches!(
            log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            anyhow::bail!("LOG_LEVEL must be one of trace, debug, info, warn, error");
        }

        let per_second = parse_or(&var, "RATE_LIMIT_PER_SECOND", 10u64)?;
        let burst_size = parse_or(&var, "RATE_LIMIT_BURST", 20u32)?;
        let rate_limit = if per_second == 0 {
            None
        } else {
            if burst_size == 0 {
                anyhow::bail!("RATE_LIMIT_BURST must be at least 1");
            }
            Some(RateLimitConfig {
                per_second,
                burst_size,
            })
        };

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            log_level,
            log_file: var("LOG_FILE").map(PathBuf::from),
            rate_limit,
            max_body_bytes: parse_or(&var, "MAX_BODY_BYTES", 64 * 1024usize)?,
        })
    }
}

/// Builds a Postgres URL from `DB_USERNAME`, `DB_PASSWORD`, `DB_HOST`,
/// `DB_PORT` and `DB_NAME`.
fn compose_database_url<F>(var: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        var(key).ok_or_else(|| {
            anyhow::anyhow!("DATABASE_URL or {} environment variable required", key)
        })
    };

    let user = required("DB_USERNAME")?;
    let password = var("DB_PASSWORD");
    let host = required("DB_HOST")?;
    let port: u16 = parse_or(var, "DB_PORT", 5432)?;
    let name = required("DB_NAME")?;

    let credentials = match password {
        Some(password) => format!("{}:{}", user, password),
        None => user,
    };

    Ok(format!(
        "postgres://{}@{}:{}/{}",
        credentials, host, port, name
    ))
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

/// Strips the password from a database URL for logging.
pub fn redact_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((credentials, location)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, location)
        }
        None => url.to_string(),
    }
}
