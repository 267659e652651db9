use clap::Parser;

use scrapjobs_import::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	scrapjobs_import::run(args).await
}
