//! `jobreview-cachectl` -- inspect and discard locally cached draft reviews.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default            | Description                    |
//! |-----------------------|----------|--------------------|--------------------------------|
//! | `JOBREVIEW_CACHE_DIR` | no       | `.jobreview/cache` | Directory of cached drafts     |
//! | `RUST_LOG`            | no       | `jobreview_cachectl=info` | Log filter, written to stderr |

use jobreview_cachectl::{execute, Command};
use jobreview_store::{CacheConfig, FileReviewCache};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobreview_cachectl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = Command::parse(std::env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    let config = CacheConfig::from_env();
    tracing::debug!(cache_dir = %config.cache_dir.display(), ?command, "Running");
    let cache = FileReviewCache::from_config(&config);

    match execute(&cache, command).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!(error = %e, "Cache command failed");
            std::process::exit(1);
        }
    }
}
