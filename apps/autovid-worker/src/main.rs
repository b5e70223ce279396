use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = autovid_worker::Args::parse();

	autovid_worker::run(args).await
}
