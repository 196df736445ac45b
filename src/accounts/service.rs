use async_trait::async_trait;
use tracing::debug;

use super::types::{AccountEntry, ApiKeySubmission};
use crate::config::PlatformConfig;
use crate::error::LinkError;
use crate::http::{ensure_success, session_headers, transport_error};
use crate::session::SessionTokenAccessor;

/// The platform's external-account endpoints.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// List the current user's providers. `redirect` is where the provider
    /// should send the browser after authorizing.
    async fn list(&self, redirect: &str) -> Result<Vec<AccountEntry>, LinkError>;

    async fn revoke(&self, provider_id: &str, resource_server: Option<&str>)
        -> Result<(), LinkError>;

    async fn submit_api_key(&self, submission: &ApiKeySubmission) -> Result<(), LinkError>;

    /// Resource servers that can still receive a key for this provider.
    async fn api_key_targets(&self, provider_id: &str) -> Result<Vec<String>, LinkError>;
}

/// Account service backed by the platform REST API.
pub struct HttpAccountService {
    client: reqwest::Client,
    config: PlatformConfig,
    session: SessionTokenAccessor,
}

impl HttpAccountService {
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

    fn provider_endpoint(&self, provider_id: &str, action: &str) -> Result<String, LinkError> {
        if provider_id.is_empty() || provider_id.contains(['/', '?', '#']) {
            return Err(LinkError::InvalidArgument(format!(
                "invalid provider id {provider_id:?}"
            )));
        }
        Ok(self
            .config
            .endpoint(&format!("account/{provider_id}/{action}")))
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn list(&self, redirect: &str) -> Result<Vec<AccountEntry>, LinkError> {
        debug!(redirect, "Listing external accounts");
        let resp = self
            .client
            .get(self.config.endpoint("account"))
            .headers(self.headers())
            .query(&[("redirect", redirect)])
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let resp = ensure_success(resp).await?;
        resp.json().await.map_err(|e| self.transport(e))
    }

    async fn revoke(
        &self,
        provider_id: &str,
        resource_server: Option<&str>,
    ) -> Result<(), LinkError> {
        let url = self.provider_endpoint(provider_id, "revoke")?;
        debug!(provider = provider_id, resource_server, "Revoking external account");
        let mut request = self.client.get(url).headers(self.headers());
        if let Some(rs) = resource_server {
            request = request.query(&[("resource_server", rs)]);
        }
        let resp = request.send().await.map_err(|e| self.transport(e))?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn submit_api_key(&self, submission: &ApiKeySubmission) -> Result<(), LinkError> {
        let url = self.provider_endpoint(&submission.provider_id, "key")?;
        debug!(
            provider = %submission.provider_id,
            resource_server = submission.resource_server.as_deref(),
            "Submitting API key"
        );
        let resp = self
            .client
            .post(url)
            .headers(self.headers())
            .json(submission)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn api_key_targets(&self, provider_id: &str) -> Result<Vec<String>, LinkError> {
        let url = self.provider_endpoint(provider_id, "targets")?;
        let resp = self
            .client
            .get(url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let resp = ensure_success(resp).await?;
        resp.json().await.map_err(|e| self.transport(e))
    }
}
