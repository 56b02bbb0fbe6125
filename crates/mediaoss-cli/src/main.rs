//! mediaoss CLI: drive a storage driver from the shell.
//!
//! Configuration comes from OSS_* environment variables (a `.env` file is
//! honoured). No provider backend client is linked in, so operations that
//! need one fail unless the mount path is available.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediaoss_cli::{exit_code, init_tracing, render_outcome};
use mediaoss_core::{Outcome, StorageConfig};
use mediaoss_storage::{DriverFactory, StorageDriver};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mediaoss", about = "Merchant media object storage CLI")]
struct Cli {
    /// Provider name (aliYun or qiNiu); defaults to OSS_PROVIDER
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file under the driver prefix
    Upload {
        file: PathBuf,
        /// Store under this name instead of the file's own
        #[arg(long)]
        name: Option<String>,
        /// Remove the local file after upload
        #[arg(long = "move")]
        move_file: bool,
    },
    /// Download a URL and store it
    Fetch {
        url: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Upload a local file under a custom base path
    Special {
        file: PathBuf,
        base: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete an object by key or URL
    Delete { file: String },
    /// Issue a direct-upload authorization
    Sign,
    /// Temporary signed download URL
    Url {
        file: String,
        /// Lifetime in seconds
        #[arg(long, default_value = "300")]
        ttl: u64,
    },
}

fn report<T: Serialize>(outcome: Outcome<T>) -> anyhow::Result<i32> {
    println!("{}", render_outcome(&outcome).context("Serialize outcome")?);
    Ok(exit_code(&outcome))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = StorageConfig::from_env().context("Failed to load OSS_* configuration")?;
    let provider = match cli.provider.as_deref() {
        Some(name) => name.to_string(),
        None => config
            .provider
            .map(|p| p.to_string())
            .context("Set OSS_PROVIDER or pass --provider")?,
    };

    let driver = DriverFactory::new()
        .create(config, &provider)
        .await
        .context("Failed to build storage driver")?;

    let code = match cli.command {
        Commands::Upload {
            file,
            name,
            move_file,
        } => report(
            driver
                .upload_local_file(&file, name.as_deref(), !move_file)
                .await,
        )?,
        Commands::Fetch { url, name } => {
            report(driver.upload_remote_file(&url, name.as_deref()).await)?
        }
        Commands::Special { file, base, name } => report(
            driver
                .upload_local_special_file(&file, &base, name.as_deref())
                .await,
        )?,
        Commands::Delete { file } => report(driver.del_file(&file).await)?,
        Commands::Sign => report(driver.get_sign().await)?,
        Commands::Url { file, ttl } => {
            report(driver.get_url(&file, Duration::from_secs(ttl)).await)?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
