use std::sync::Arc;

use autovid_service::VideoService;
use autovid_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<VideoService>,
}
impl AppState {
	pub async fn new(config: autovid_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = VideoService::new(config, db)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: VideoService) -> Self {
		Self { service: Arc::new(service) }
	}

	/// Configured admin token, if any. Blank tokens are dropped at config load.
	pub fn admin_token(&self) -> Option<&str> {
		self.service.cfg.security.admin_auth_token.as_deref()
	}
}
