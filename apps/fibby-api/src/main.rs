use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = fibby_api::Args::parse();

	fibby_api::run(args).await
}
