//! Application state shared across handlers

use std::sync::Arc;

use config::ConfigError;

use crate::{
    accounts::AccountService, images::ImageIngestor, middleware::Authenticator,
    repositories::ProfileRepository, service::ProfileService, settings::ProfileConfig,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub profiles: ProfileService,
    pub accounts: AccountService,
    pub authenticator: Authenticator,
}

impl AppState {
    /// Wire the services over one repository
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        config: &ProfileConfig,
        authenticator: Authenticator,
    ) -> Result<Self, ConfigError> {
        let images = ImageIngestor::new(config.upload_dir.clone(), config.public_prefix.clone());
        let profiles = ProfileService::new(
            repository.clone(),
            images,
            config.timezone()?,
            config.max_daily_generations,
        );

        Ok(Self {
            profiles,
            accounts: AccountService::new(repository),
            authenticator,
        })
    }
}
