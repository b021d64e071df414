use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use release_fetch::config::{self, DEFAULT_CONFIG_FILE};
use release_fetch::downloader::DEFAULT_API_URL;
use release_fetch::{Api, Error};

mod exit_code {
    pub const SUCCESS: u8 = 0;
    /// Configuration missing or invalid, or the run could not start.
    pub const CONFIG: u8 = 1;
    /// Download directory missing or not writable.
    pub const DESTINATION: u8 = 2;
    /// The run finished but some items or assets failed.
    pub const PARTIAL_FAILURE: u8 = 3;
}

/// Download GitHub release assets specified in a YAML file.
#[derive(Parser)]
#[command(name = "release-fetch")]
#[command(author, version, about)]
#[command(after_help = "EXAMPLES:
    # Download into ./downloads using ./github-releases.yaml
    release-fetch -d downloads

    # GitHub Enterprise, with progress bars
    release-fetch -u https://github.example.com/api/v3 -c tools.yaml -p
")]
struct Cli {
    /// Path to the YAML file
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory to download the files to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Base URL of the GitHub API server
    #[arg(short, long, value_name = "URL", default_value = DEFAULT_API_URL)]
    url: String,

    /// Show download progress bars
    #[arg(short, long)]
    progress: bool,

    /// Suppress all stdout output
    #[arg(short, long)]
    quiet: bool,

    /// GitHub personal access token for API authentication
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// HTTP/HTTPS proxy URL (defaults to HTTP_PROXY / HTTPS_PROXY)
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = categorize_error(&e);
            if !cli.quiet && find_error(&e).is_some_and(|err| matches!(err, Error::ConfigMissing(_))) {
                let _ = Cli::command().print_help();
            }
            ExitCode::from(code)
        }
    }
}

async fn run(cli: &Cli) -> Result<u8> {
    // Both checks happen before any network activity.
    if !cli.config.exists() {
        return Err(Error::ConfigMissing(cli.config.clone()).into());
    }
    config::validate_download_dir(&cli.dir)?;

    let mut api = Api::new()
        .set_download_dir(cli.dir.clone())
        .set_base_url(&cli.url)
        .set_token(cli.token.clone())
        .quiet(cli.quiet);
    if let Some(proxy) = &cli.proxy {
        api = api.set_proxy(proxy);
    }
    if cli.progress {
        api = api.show_progress();
    }

    let summary = api
        .run_config(&cli.config)
        .await
        .with_context(|| format!("Failed to run {}", cli.config.display()))?;
    tracing::info!(
        downloaded = summary.downloaded.len(),
        skipped = summary.skipped.len(),
        failed = summary.failures.len(),
        "run finished"
    );

    Ok(if summary.is_success() {
        exit_code::SUCCESS
    } else {
        exit_code::PARTIAL_FAILURE
    })
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

fn find_error(e: &anyhow::Error) -> Option<&Error> {
    e.chain().find_map(|cause| cause.downcast_ref::<Error>())
}

fn categorize_error(e: &anyhow::Error) -> u8 {
    match find_error(e) {
        Some(Error::DestinationInvalid(_)) => exit_code::DESTINATION,
        _ => exit_code::CONFIG,
    }
}
