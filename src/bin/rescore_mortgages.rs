//! Recomputes and persists the risk score of every stored mortgage.
//!
//! Run after changing the scoring rules. Pass `--dry-run` to only report
//! which scores would change.

use rmbs_rating_api::config::Config;
use rmbs_rating_api::data::db::Database;
use rmbs_rating_api::data::db_storage::MortgageStorage;
use rmbs_rating_api::rating::{
    risk_score, summarize_pool, MortgageApplication, PoolSummary, RatingBand, RatingError,
};
use rmbs_rating_api::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config)?;

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");

    let db = Database::new(&config.database_url, 5).await?;
    let storage = MortgageStorage::new(db.pool.clone());

    let mortgages = storage.list().await?;
    let total = mortgages.len();
    tracing::info!("Rescoring {} mortgages (dry run: {})", total, dry_run);

    let mut changed = 0;
    let mut error_count = 0;
    let mut unscored = 0;
    let mut pool = Vec::with_capacity(total);

    for mortgage in mortgages {
        let application = match mortgage.application() {
            Ok(application) => application,
            Err(e) => {
                tracing::error!("Skipping mortgage {}: {}", mortgage.id, e);
                error_count += 1;
                unscored += 1;
                continue;
            }
        };

        let score = match risk_score(&application) {
            Ok(score) => score,
            Err(e) => {
                tracing::error!("Cannot score mortgage {}: {}", mortgage.id, e);
                error_count += 1;
                unscored += 1;
                continue;
            }
        };
        pool.push(application);

        if score == mortgage.risk_score {
            continue;
        }

        tracing::info!(
            "Mortgage {}: {} ({}) -> {} ({})",
            mortgage.id,
            mortgage.risk_score,
            mortgage.rating(),
            score,
            RatingBand::from_score(score)
        );
        changed += 1;

        if !dry_run {
            if let Err(e) = storage.update_risk_score(mortgage.id, score).await {
                tracing::error!("Failed to update mortgage {}: {}", mortgage.id, e);
                error_count += 1;
            }
        }
    }

    tracing::info!(
        "Rescore complete. Total: {}, Changed: {}, Errors: {}",
        total,
        changed,
        error_count
    );

    match pool_summary(&pool, unscored)? {
        Some(summary) => tracing::info!("Pool rating: {}", summary.rating),
        None => tracing::error!(
            "Pool rating unavailable: {} of {} mortgages could not be scored",
            unscored,
            total
        ),
    }

    Ok(())
}

/// Rates the pool only when every stored mortgage was scored; a single
/// unscorable mortgage leaves the whole pool without a rating.
fn pool_summary(
    scored: &[MortgageApplication],
    unscored: usize,
) -> Result<Option<PoolSummary>, RatingError> {
    if unscored > 0 {
        return Ok(None);
    }
    summarize_pool(scored).map(Some)
}
