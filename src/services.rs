//! Service container wiring configuration, catalog and lucky number generator
//!
//! Collaborators are injected here so tests can swap the AI client.

use crate::{
    catalog::PoolCatalog,
    config::{BolaoConfig, ConfigLoader},
    errors::BolaoResult,
    lucky::{LuckyNumberGenerator, TextGenerator},
    pools::User,
};
use std::sync::Arc;

/// Everything a front-end needs for one session
pub struct ServiceContainer {
    config: BolaoConfig,
    catalog: PoolCatalog,
    lucky: Arc<LuckyNumberGenerator>,
    organizer: User,
}

impl ServiceContainer {
    pub fn new(config: BolaoConfig) -> Self {
        let lucky = Arc::new(LuckyNumberGenerator::from_config(&config));
        Self::with_generator(config, lucky)
    }

    fn with_generator(config: BolaoConfig, lucky: Arc<LuckyNumberGenerator>) -> Self {
        let catalog = if config.catalog.seed_demo_data {
            PoolCatalog::with_demo_data()
        } else {
            PoolCatalog::new()
        };

        let mut organizer = User::demo_organizer();
        organizer.id = config.catalog.organizer_id.clone();

        Self {
            config,
            catalog,
            lucky,
            organizer,
        }
    }

    pub fn config(&self) -> &BolaoConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PoolCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut PoolCatalog {
        &mut self.catalog
    }

    pub fn lucky(&self) -> Arc<LuckyNumberGenerator> {
        Arc::clone(&self.lucky)
    }

    /// The acting organizer for this session
    pub fn organizer(&self) -> &User {
        &self.organizer
    }
}

/// Builder for configured service containers
#[derive(Default)]
pub struct ServiceBuilder {
    config_path: Option<String>,
    config: Option<BolaoConfig>,
    text_generator: Option<Arc<dyn TextGenerator>>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from this TOML file (plus env overrides)
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Use this configuration as-is, skipping file and environment
    pub fn with_config(mut self, config: BolaoConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the AI client (useful for testing)
    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text_generator = Some(generator);
        self
    }

    pub fn build(self) -> BolaoResult<ServiceContainer> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => ConfigLoader::new().with_path(path).load()?,
            (None, None) => ConfigLoader::new().load()?,
        };

        let container = match self.text_generator {
            Some(client) => {
                let lucky = Arc::new(LuckyNumberGenerator::new(client, &config));
                ServiceContainer::with_generator(config, lucky)
            }
            None => ServiceContainer::new(config),
        };

        Ok(container)
    }
}
