use crate::config::Config;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives when `RUST_LOG` is not set.
pub fn default_directives(log_level: &str) -> String {
    format!("rmbs_rating_api={level},tower_http={level}", level = log_level)
}

/// Initializes tracing: `RUST_LOG` (or `LOG_LEVEL`) filtering, stdout output,
/// and an additional plain-text file sink when `LOG_FILE` is set.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(&config.log_level).into());

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("Cannot open LOG_FILE {}: {}", path.display(), e))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives("warn"),
            "rmbs_rating_api=warn,tower_http=warn"
        );
        assert!(EnvFilter::try_new(default_directives("debug")).is_ok());
    }
}
