use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = fibby_worker::Args::parse();

	fibby_worker::run(args).await
}
