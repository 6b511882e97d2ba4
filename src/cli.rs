//! Command-line interface: argument parsing and dispatch to the publisher.
//!
//! Kept thin; all publishing logic lives in [`crate::publisher`] and [`crate::policy`].
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::PublishConfig;
use crate::load_config::load_config;
use crate::policy::PolicyFormat;
use crate::publisher::{RepositoryPublisher, DEFAULT_BUNDLE_ARCHIVE, DEFAULT_INDEX_FILE};

/// CLI for satis-publish: push a Satis build to its web server.
#[derive(Parser)]
#[clap(
    name = "satis-publish",
    version,
    about = "Publish a statically generated Satis repository to a remote web server over HTTP"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, global = true, default_value = "satis-publish.yml")]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a file from the repository and print it
    Get {
        #[clap(long, default_value = DEFAULT_INDEX_FILE)]
        file: String,
    },
    /// Upload a single local file to the given repository path
    Put {
        /// Path below the repository url
        #[clap(long)]
        file: String,
        /// Local file to send
        #[clap(long)]
        source: PathBuf,
    },
    /// Upload a zip of the whole repository, unpacked by the server
    Bundle {
        #[clap(long, default_value = DEFAULT_BUNDLE_ARCHIVE)]
        archive: PathBuf,
    },
    /// Upload every allowed file of a local build directory
    Dir {
        #[clap(long)]
        path: PathBuf,
    },
    /// Print the effective access policy document
    DumpPolicy {
        #[clap(long, default_value = "yaml")]
        format: PolicyFormat,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::DumpPolicy { format } => {
            print!("{}", config.policy.dump(format)?);
        }
        Commands::Get { file } => {
            let mut publisher = connect(config)?;
            publisher.get_file(&file).await?;
            report(&publisher);
        }
        Commands::Put { file, source } => {
            let content = fs::read(&source)
                .with_context(|| format!("Failed to read {}", source.display()))?;
            let mut publisher = connect(config)?;
            publisher.put_file(&file, content, &[]).await?;
            report(&publisher);
        }
        Commands::Bundle { archive } => {
            let mut publisher = connect(config)?;
            publisher.put_bundle_zip(&archive).await?;
            report(&publisher);
        }
        Commands::Dir { path } => {
            let mut publisher = connect(config)?;
            publisher.put_dir(&path).await?;
            report(&publisher);
        }
    }
    Ok(())
}

fn connect(config: PublishConfig) -> Result<RepositoryPublisher> {
    RepositoryPublisher::new(&config.url, config.credentials, Some(config.policy))
        .context("Failed to initialise publisher")
}

fn report(publisher: &RepositoryPublisher) {
    match publisher.status() {
        Some(status) => println!("status: {status}"),
        None => println!("status: none"),
    }
    if !publisher.body().is_empty() {
        println!("{}", publisher.body());
    }
    match publisher.status() {
        Some(status) if !status.is_success() => {
            tracing::warn!(%status, "Command complete, server refused the request")
        }
        status => tracing::info!(?status, "Command complete"),
    }
}
