use std::sync::Arc;

use fibby_service::RetrievalService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RetrievalService>,
}
impl AppState {
	pub async fn new(config: &fibby_config::Config) -> color_eyre::Result<Self> {
		let service = RetrievalService::connect(config).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: RetrievalService) -> Self {
		Self { service: Arc::new(service) }
	}
}
