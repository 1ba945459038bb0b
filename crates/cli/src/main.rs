// jobpoll CLI
//
// Design Decision: Use clap derive for argument parsing; poll options fall back to JOBPOLL_* env vars.
// Design Decision: Without --base-url, start an embedded status source on an ephemeral port.
// Design Decision: Ctrl-C cancels the poll instead of killing the process mid-sleep.

mod output;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use jobpoll::{HttpTransport, PollConfig, Poller, StatusObserver, StatusResult, StatusTrace};
use jobpoll_source::{SourceConfig, StatusSource};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::output::{OutputFormat, PollReport};

#[derive(Parser, Debug)]
#[command(name = "jobpoll")]
#[command(about = "Poll a job status endpoint until it completes, fails, or times out")]
#[command(version)]
pub struct Cli {
    /// Status service base URL (omit to start an embedded status source)
    #[arg(long, env = "JOBPOLL_BASE_URL")]
    pub base_url: Option<String>,

    /// Maximum number of poll rounds [default: 10]
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Maximum accumulated backoff time in seconds [default: 60]
    #[arg(long)]
    pub max_wait: Option<f64>,

    /// Initial backoff in seconds [default: 1.0]
    #[arg(long)]
    pub initial_wait: Option<f64>,

    /// Backoff multiplier [default: 2.0]
    #[arg(long)]
    pub backoff_factor: Option<f64>,

    /// Symmetric jitter bound in seconds [default: 0.5]
    #[arg(long)]
    pub jitter: Option<f64>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long)]
    pub request_timeout: Option<f64>,

    /// Shortest completion delay of the embedded source, in seconds [default: 5]
    #[arg(long)]
    pub min_delay: Option<f64>,

    /// Longest completion delay of the embedded source, in seconds [default: 15]
    #[arg(long)]
    pub max_delay: Option<f64>,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json"])]
    pub output: String,

    /// Suppress per-update lines
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    /// Poll configuration: environment first, then flags on top
    pub fn poll_config(&self) -> Result<PollConfig> {
        let mut config = PollConfig::from_env();

        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(secs) = self.max_wait {
            config.max_wait_time = seconds("--max-wait", secs)?;
        }
        if let Some(secs) = self.initial_wait {
            config.initial_wait_time = seconds("--initial-wait", secs)?;
        }
        if let Some(factor) = self.backoff_factor {
            config.backoff_factor = factor;
        }
        if let Some(secs) = self.jitter {
            config.jitter = seconds("--jitter", secs)?;
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout = seconds("--request-timeout", secs)?;
        }

        config.validate().context("Invalid poll configuration")?;
        Ok(config)
    }

    /// Embedded source configuration: environment first, then flags on top
    pub fn source_config(&self) -> Result<SourceConfig> {
        let mut config = SourceConfig::from_env();

        if let Some(secs) = self.min_delay {
            config.min_delay = seconds("--min-delay", secs)?;
        }
        if let Some(secs) = self.max_delay {
            config.max_delay = seconds("--max-delay", secs)?;
        }

        config.validate().context("Invalid source configuration")?;
        Ok(config)
    }
}

fn seconds(flag: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{} must be a non-negative number of seconds, got {}", flag, secs))
}

/// Start an embedded status source and return its base URL
async fn start_embedded_source(config: &SourceConfig) -> Result<String> {
    let source = Arc::new(StatusSource::new(config).context("Failed to create status source")?);
    tracing::info!(
        delay_ms = source.delay().as_millis() as u64,
        "Starting embedded status source"
    );

    let (addr, _handle) = jobpoll_source::spawn("127.0.0.1:0", source)
        .await
        .context("Failed to start status source")?;

    Ok(format!("http://{}", addr))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobpoll=info,jobpoll_cli=info,jobpoll_source=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_str(&cli.output);
    let config = cli.poll_config()?;

    let base_url = match &cli.base_url {
        Some(url) => url.clone(),
        None => start_embedded_source(&cli.source_config()?).await?,
    };

    let poller = Poller::new(config, HttpTransport::new(&base_url))
        .context("Invalid poll configuration")?;

    tracing::info!(
        base_url = %base_url,
        max_attempts = poller.config().max_attempts,
        max_wait_ms = poller.config().max_wait_time.as_millis() as u64,
        "Polling job status"
    );

    let trace = StatusTrace::new();
    let print_updates = format.is_text() && !cli.quiet;
    let observer = |status: &str| {
        trace.notify(status);
        if print_updates {
            println!("{}", output::update_line(status));
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received shutdown signal");
                cancel.cancel();
            }
        })
    };

    let result = poller.run_until_cancelled(Some(&observer), &cancel).await;
    ctrl_c.abort();

    let updates = trace.statuses();
    let report = PollReport {
        base_url: &base_url,
        result: &result,
        updates: &updates,
    };
    println!("{}", report.render(format)?);

    Ok(if result == StatusResult::Completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
