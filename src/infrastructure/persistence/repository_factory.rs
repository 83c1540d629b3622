use std::sync::Arc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::presentation::config::{DatabaseSettings, RepositoryProviderSetting};

use super::pg_pool::create_pool;
use super::repositories::{InMemoryJobRepository, PgJobRepository};

pub struct JobRepositoryFactory;

impl JobRepositoryFactory {
    pub async fn create(
        settings: &DatabaseSettings,
    ) -> Result<Arc<dyn JobRepository>, RepositoryError> {
        match settings.provider {
            RepositoryProviderSetting::Memory => {
                tracing::warn!("Using in-memory job repository; jobs are lost on restart");
                Ok(Arc::new(InMemoryJobRepository::new()))
            }
            RepositoryProviderSetting::Postgres => {
                let url = settings.url.as_deref().ok_or_else(|| {
                    RepositoryError::ConnectionFailed("database.url required".into())
                })?;
                let pool = create_pool(url, settings.max_connections).await?;
                Ok(Arc::new(PgJobRepository::new(pool)))
            }
        }
    }
}
