use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = scrapjobs_api::Args::parse();
	scrapjobs_api::run(args).await
}
