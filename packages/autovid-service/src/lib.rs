pub mod jobs;
pub mod listing;
pub mod quota;
pub mod refresh;
pub mod sync;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use jobs::{JobKind, JobReport};
pub use listing::{ListingItem, ListingRequest, ListingResponse};
pub use quota::{CostMeter, QuotaBudget, RunContext};
pub use refresh::{RefreshRequest, RefreshResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use autovid_config::Config;
use autovid_domain::policy::TitlePolicy;
use autovid_providers::youtube::{VideoSummary, YoutubeClient};
use autovid_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The two video endpoints the pipeline consumes.
///
/// Cost accounting stays with the caller. Implementations only perform the calls.
pub trait VideoSearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<String>>>;

	fn videos<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<VideoSummary>>>;
}

pub struct VideoService {
	pub cfg: Config,
	pub db: Db,
	provider: Option<Arc<dyn VideoSearchProvider>>,
	policy: TitlePolicy,
}
impl VideoService {
	/// Builds the service with the YouTube client. Without an API key the service still serves
	/// listings, but every job is a no-op.
	pub fn new(cfg: Config, db: Db) -> Result<Self> {
		let provider = match cfg.providers.youtube.api_key {
			Some(_) => {
				let client = YoutubeClient::new(&cfg.providers.youtube)?;

				Some(Arc::new(client) as Arc<dyn VideoSearchProvider>)
			},
			None => None,
		};

		Ok(Self { cfg, db, provider, policy: TitlePolicy::default() })
	}

	pub fn with_provider(cfg: Config, db: Db, provider: Arc<dyn VideoSearchProvider>) -> Self {
		Self { cfg, db, provider: Some(provider), policy: TitlePolicy::default() }
	}

	pub fn policy(&self) -> &TitlePolicy {
		&self.policy
	}

	pub(crate) fn provider(&self) -> Option<Arc<dyn VideoSearchProvider>> {
		self.provider.clone()
	}
}

impl VideoSearchProvider for YoutubeClient {
	fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move { Ok(YoutubeClient::search(self, query).await?) })
	}

	fn videos<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<VideoSummary>>> {
		Box::pin(async move { Ok(YoutubeClient::videos(self, ids).await?) })
	}
}
