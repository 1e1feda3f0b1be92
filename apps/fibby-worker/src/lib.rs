use std::{future::Future, path::PathBuf, time::Duration};

use clap::Parser;
use tokio::time::{self, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

use fibby_service::RetrievalService;

#[derive(Debug, Parser)]
#[command(
	version = fibby_cli::VERSION,
	rename_all = "kebab",
	styles = fibby_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Run one bulk refresh, print the report and exit.
	#[arg(long)]
	pub once: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = fibby_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let service = RetrievalService::connect(&config).await?;

	if args.once {
		println!("{}", run_once(&service).await);

		return Ok(());
	}

	run_scheduled(&service, Duration::from_secs(config.worker.interval_seconds), ctrl_c()).await;

	Ok(())
}

async fn ctrl_c() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for Ctrl-C.");

		std::future::pending::<()>().await;
	}
}

/// One bulk refresh followed by the resulting report.
pub async fn run_once(service: &RetrievalService) -> fibby_service::RefreshReport {
	service.refresh_all().await;

	service.report().await
}

/// Runs a bulk refresh immediately and then every `interval` until `shutdown` resolves.
///
/// A batch in flight when `shutdown` resolves is abandoned between steps. The next run cleans
/// up any stale chunks it leaves behind.
pub async fn run_scheduled<F>(service: &RetrievalService, interval: Duration, shutdown: F)
where
	F: Future<Output = ()>,
{
	let mut ticker = time::interval(interval);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	tokio::pin!(shutdown);

	loop {
		tokio::select! {
			_ = ticker.tick() => {},
			_ = &mut shutdown => {
				tracing::info!("Shutdown requested.");

				break;
			},
		}

		tracing::info!("Starting scheduled bulk refresh.");

		tokio::select! {
			_ = service.refresh_all() => {},
			_ = &mut shutdown => {
				tracing::info!("Shutdown requested during bulk refresh.");

				break;
			},
		}
	}
}
