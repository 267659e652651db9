use std::{
	env,
	io::{self, Read},
	path::PathBuf,
};

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use scrapjobs_config::Config;
use scrapjobs_service::{
	BatchSource, DirectorySource, IngestOptions, IngestionReport, PayloadSource, ScrapjobsService,
};
use scrapjobs_storage::db::Db;

/// Loads scraped job records into the search database.
///
/// Records come from `--from DIR` (one JSON record per `*.json` file) or, without it, from a
/// JSON array on stdin holding record objects or paths of record files.
#[derive(Debug, Parser)]
#[command(
	version = scrapjobs_cli::VERSION,
	rename_all = "kebab",
	styles = scrapjobs_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, value_name = "DIR")]
	pub from: Option<PathBuf>,
	/// Delete every stored job before loading.
	#[arg(long)]
	pub truncate: bool,
	/// Remove the freshness tag from stored jobs before loading.
	#[arg(long)]
	pub strip_freshness_tag: bool,
	/// Report what would change without writing anything.
	#[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
	pub dry_run: bool,
}
impl Args {
	pub fn options(&self) -> IngestOptions {
		IngestOptions {
			truncate: self.truncate,
			strip_freshness_tag: self.strip_freshness_tag,
			dry_run: self.dry_run,
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = scrapjobs_config::load(&args.config)?;
	init_tracing(&config);
	let source = batch_source(&args, io::stdin().lock())?;
	let db = Db::connect(&config.storage.postgres).await?;
	let version = db.server_version().await?;

	tracing::info!(%version, "Connected to Postgres.");

	if !args.dry_run {
		db.ensure_schema().await?;
	}

	let service = ScrapjobsService::new(config, db);

	match service.ingest(source.as_ref(), args.options()).await {
		Ok(report) => print_report(&report),
		Err(failure) => {
			print_report(&failure.report)?;

			Err(failure.into())
		},
	}
}

/// Picks the record source for `args`, reading the whole stdin payload up front when no
/// directory is given.
pub fn batch_source(args: &Args, mut stdin: impl Read) -> color_eyre::Result<Box<dyn BatchSource>> {
	if let Some(dir) = &args.from {
		return Ok(Box::new(DirectorySource::new(dir)));
	}

	let mut payload = Vec::new();

	stdin.read_to_end(&mut payload)?;

	Ok(Box::new(PayloadSource::new(payload, env::current_dir()?)))
}

fn print_report(report: &IngestionReport) -> color_eyre::Result<()> {
	let json = serde_json::to_string_pretty(report)?;

	println!("{json}");

	Ok(())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	// Stdout carries the report.
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
