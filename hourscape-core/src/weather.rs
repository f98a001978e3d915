//! Weather lookup against the Home Assistant REST API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::HomeAssistantConfig;
use crate::error::{Error, Result};
use crate::scene::WeatherKind;

/// Entity queried when the config leaves the entity id empty.
const DEFAULT_ENTITY: &str = "weather.home";

/// Source of the current weather category.
///
/// The scheduler only needs this one call; failures are fatal to it and are
/// not retried here.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> Result<WeatherKind>;
}

/// Weather source backed by a Home Assistant instance.
pub struct HomeAssistant {
    client: reqwest::Client,
    api_url: String,
    token: String,
    entity: String,
}

/// The slice of Home Assistant's entity state payload we care about.
#[derive(Debug, Deserialize)]
struct EntityState {
    state: String,
}

impl HomeAssistant {
    pub fn new(config: &HomeAssistantConfig) -> Self {
        let entity = if config.entity.is_empty() {
            DEFAULT_ENTITY.to_string()
        } else {
            config.entity.clone()
        };
        Self {
            client: reqwest::Client::new(),
            api_url: config.auth.api_url.clone(),
            token: config.auth.token.clone(),
            entity,
        }
    }

    fn states_url(&self) -> String {
        format!(
            "{}/states/{}",
            self.api_url.trim_end_matches('/'),
            self.entity
        )
    }
}

#[async_trait]
impl WeatherSource for HomeAssistant {
    async fn current(&self) -> Result<WeatherKind> {
        let response = self
            .client
            .get(self.states_url())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::WeatherRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::WeatherStatus(self.entity.clone(), status.to_string()));
        }

        let entity: EntityState = response
            .json()
            .await
            .map_err(|e| Error::WeatherRequest(e.to_string()))?;

        let kind = WeatherKind::classify(&entity.state);
        tracing::debug!(
            "Entity {} reports '{}', classified {}",
            self.entity,
            entity.state,
            kind
        );
        Ok(kind)
    }
}
