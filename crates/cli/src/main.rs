//! siteforge entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use siteforge_aws::{CliEnv, CliRunner};
use siteforge_bootstrap::Bootstrap;
use siteforge_config::{CONFIG_FILE, SiteConfig};
use siteforge_deploy::Deployer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siteforge", version, about = "Deploy static sites to AWS")]
struct Cli {
    /// Path to the site configuration file.
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload the build output and invalidate the CDN cache.
    Deploy {
        /// Build output directory to upload.
        #[arg(long, default_value = "dist")]
        root: PathBuf,
    },
    /// Provision the AWS infrastructure (bucket, DNS, certificate, CDN).
    Setup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting siteforge");

    let config = SiteConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let aws = config.deploy.aws.clone().unwrap_or_default();
    let runner = Arc::new(CliRunner::new(CliEnv {
        profile: aws.profile,
        access_key_id: aws.access_key_id,
        secret_access_key: aws.secret_access_key,
        region: Some(config.deploy.region.clone()),
    }));

    match cli.command {
        Commands::Deploy { root } => {
            let outcome = Deployer::new(runner, config).run(&root).await?;
            println!(
                "Deployed {} files ({} gzipped).",
                outcome.summary.succeeded, outcome.summary.gzipped
            );
            if let Some(id) = &outcome.invalidation_id {
                println!("Cache invalidation submitted: {id}");
            }
            println!("Live at {}", outcome.live_url);
        }
        Commands::Setup => {
            let outcome = Bootstrap::new(runner, config, cli.config.clone()).run().await?;
            println!("Distribution: {}", outcome.distribution_id);
            if let Some(nameservers) = &outcome.nameservers {
                println!("Hosted zone created. Set these nameservers at your registrar:");
                for ns in nameservers {
                    println!("  {ns}");
                }
            }
            println!("Live at {} once the distribution finishes rolling out.", outcome.live_url);
        }
    }

    Ok(())
}
