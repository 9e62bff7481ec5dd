//! SendGrid HTTP request methods

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ProviderError, Result};
use crate::http_client::{self, ApiResponse};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::SendGridDeliverability;
use super::types::SendGridErrorResponse;

impl SendGridDeliverability {
    fn handle_response_error(&self, response: &ApiResponse, ctx: ErrorContext) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }
        let (status, response_text) = (response.status, response.body.as_str());

        if let Ok(body) = serde_json::from_str::<SendGridErrorResponse>(response_text)
            && let Some(first) = body.errors.into_iter().next()
        {
            let raw = match first.field {
                Some(field) => RawApiError::with_code(field, first.message),
                None => RawApiError::new(first.message),
            };
            return Err(self.map_error(raw.status(status), ctx));
        }

        Err(self.map_error(
            RawApiError::new(format!("HTTP {status}: {response_text}")).status(status),
            ctx,
        ))
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<T> {
        let url = format!("{}{path}", self.api_base);
        let request = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json");

        let response =
            http_client::send(self.provider_name(), request, &self.retry, |_| None).await?;

        self.handle_response_error(&response, ctx)?;
        response.json(self.provider_name())
    }

    /// Execute a POST request.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        ctx: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path}", self.api_base);
        let payload = match body {
            Some(body) => {
                serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
                    provider: self.provider_name().to_string(),
                    detail: e.to_string(),
                })?
            }
            None => "{}".to_string(),
        };

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .body(payload);

        let response =
            http_client::send(self.provider_name(), request, &self.retry, |_| None).await?;

        self.handle_response_error(&response, ctx)?;
        response.json(self.provider_name())
    }
}
