use crate::application::TrackingService;
use crate::domain::error::TrackError;
use crate::infrastructure::config::Config;
use crate::infrastructure::network::http::create_client;
use crate::infrastructure::network::HttpTrackingBackend;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracking: TrackingService<HttpTrackingBackend>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, TrackError> {
        let http_client = create_client(&config.api)?;
        let backend = HttpTrackingBackend::new(http_client, &config.api)?;
        let tracking = TrackingService::new(backend, &config.cache);

        Ok(Self {
            config: Arc::new(config),
            tracking,
        })
    }
}
