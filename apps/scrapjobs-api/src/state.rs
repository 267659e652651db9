use std::sync::Arc;

use scrapjobs_service::ScrapjobsService;
use scrapjobs_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ScrapjobsService>,
}
impl AppState {
	/// Connects to Postgres and prepares the schema. Any failure here is fatal to startup.
	pub async fn new(config: scrapjobs_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;
		let version = db.server_version().await?;

		tracing::info!(%version, "Connected to Postgres.");

		db.ensure_schema().await?;

		Ok(Self::from_service(ScrapjobsService::new(config, db)))
	}

	pub fn from_service(service: ScrapjobsService) -> Self {
		Self { service: Arc::new(service) }
	}
}
