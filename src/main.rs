//! Level migration binary
//!
//! Usage:
//!   level-migrator complete [--dry-run]   # Fill missing en/ja translations and language profiles
//!   level-migrator upgrade [--dry-run]    # Rewrite legacy levels into the four-language schema
//!
//! Required environment variables:
//! - OPENAI_API_KEY
//!
//! Optional:
//! - LEVELS_DIR (defaults to public/levels)
//! - OVERRIDES_FILE (defaults to the bundled data/overrides.json)
//! - UPGRADE_LEVELS (defaults to 2-20)
//! - OPENAI_MODEL (defaults to gpt-4o-mini)

use anyhow::{bail, Context, Result};
use level_migrator::completion::CompletionJob;
use level_migrator::config::Config;
use level_migrator::overrides::OverrideTables;
use level_migrator::translation::OpenAiTranslator;
use level_migrator::upgrade::UpgradeJob;
use tracing::info;

const USAGE: &str = "usage: level-migrator <complete|upgrade> [--dry-run]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("level_migrator=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let Some(command) = args.iter().find(|a| !a.starts_with("--")) else {
        bail!(USAGE);
    };

    let config = Config::from_env()?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;
    let translator = OpenAiTranslator::new(client, &config);

    let report = match command.as_str() {
        "complete" => {
            info!("Starting translation completion in {}", config.levels_dir.display());
            CompletionJob::new(&translator)
                .with_dry_run(dry_run)
                .run(&config.levels_dir)
                .await
                .context("Translation completion failed")?
        }
        "upgrade" => {
            info!("Starting schema upgrade in {}", config.levels_dir.display());
            let overrides = OverrideTables::load(config.overrides_file.as_deref())
                .context("Failed to load override tables")?;
            UpgradeJob::new(&translator, overrides)
                .with_dry_run(dry_run)
                .run(&config.levels_dir, &config.upgrade_targets())
                .await
                .context("Schema upgrade failed")?
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    };

    info!("Done: {}", report);
    Ok(())
}
