use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = autovid_api::Args::parse();

	autovid_api::run(args).await
}
