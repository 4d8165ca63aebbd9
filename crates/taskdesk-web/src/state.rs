use std::sync::Arc;

use anyhow::{Context, Result};
use taskdesk_core::Config;
use taskdesk_services::{CreateStatusPolicy, SqliteTaskStore, TaskService};
use taskdesk_weather::WeatherProvider;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub weather: WeatherProvider,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state around an already opened store.
    pub fn new(config: Config, store: SqliteTaskStore) -> Result<Self> {
        let policy = CreateStatusPolicy::from_allow_completed(config.tasks.allow_completed_on_create);
        let weather =
            WeatherProvider::from_config(&config.weather).context("Failed to build weather client")?;

        if !weather.is_configured() {
            tracing::warn!("No weather API key configured; /weather will answer 500");
        }

        Ok(Self {
            tasks: TaskService::new(store, policy),
            weather,
            config: Arc::new(config),
        })
    }

    /// Open the task database named in `config` and build state around it.
    pub fn from_config(config: Config) -> Result<Self> {
        let path = config.database.path.clone();
        let store = SqliteTaskStore::open(&path)
            .with_context(|| format!("Failed to open task database at {}", path.display()))?;
        tracing::info!("Task database at {}", path.display());

        Self::new(config, store)
    }
}
