use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tracing::debug;

use super::keys::SettingKey;
use crate::config::PlatformConfig;
use crate::error::LinkError;
use crate::http::{ensure_success, session_headers, transport_error};
use crate::session::SessionTokenAccessor;

/// Which values a settings query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Fallback {
    /// Only values an administrator set explicitly.
    None,
    /// The store's declared defaults.
    Default,
}

/// The platform's key-value settings service.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the given keys. Keys may be missing from the result.
    async fn fetch(
        &self,
        keys: &[SettingKey],
        fallback: Fallback,
    ) -> Result<HashMap<String, Value>, LinkError>;

    /// Write values in one request.
    async fn store(&self, updates: &[(SettingKey, Value)]) -> Result<(), LinkError>;
}

/// Settings store backed by the platform REST API.
pub struct HttpSettingsStore {
    client: reqwest::Client,
    config: PlatformConfig,
    session: SessionTokenAccessor,
}

impl HttpSettingsStore {
    pub fn new(config: PlatformConfig, session: SessionTokenAccessor) -> Result<Self, LinkError> {
        Ok(Self {
            client: config.http_client()?,
            config,
            session,
        })
    }

    fn transport(&self, err: reqwest::Error) -> LinkError {
        transport_error(err, self.config.timeout())
    }

    fn headers(&self) -> reqwest::header::HeaderMap {
        session_headers(
            self.config.token_header(),
            self.session.current_token().as_deref(),
        )
    }
}

#[derive(Serialize)]
struct SettingUpdate<'a> {
    key: &'a str,
    value: &'a Value,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    list: Vec<SettingUpdate<'a>>,
}

#[async_trait]
impl SettingsStore for HttpSettingsStore {
    async fn fetch(
        &self,
        keys: &[SettingKey],
        fallback: Fallback,
    ) -> Result<HashMap<String, Value>, LinkError> {
        let names: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        let url = self.config.endpoint("settings");
        debug!(keys = names.len(), %fallback, "Fetching settings");

        let resp = self
            .client
            .get(&url)
            .headers(self.headers())
            .query(&[
                ("keys", serde_json::to_string(&names)?),
                ("fallback", fallback.to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let resp = ensure_success(resp).await?;
        match resp.json::<Value>().await.map_err(|e| self.transport(e))? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Ok(HashMap::new()),
            other => Err(LinkError::api(
                200,
                format!("expected a settings object, got {other}"),
            )),
        }
    }

    async fn store(&self, updates: &[(SettingKey, Value)]) -> Result<(), LinkError> {
        let body = UpdateBody {
            list: updates
                .iter()
                .map(|(key, value)| SettingUpdate {
                    key: key.as_str(),
                    value,
                })
                .collect(),
        };
        debug!(keys = updates.len(), "Saving settings");
        let resp = self
            .client
            .put(self.config.endpoint("settings"))
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        ensure_success(resp).await?;
        Ok(())
    }
}
