//! GoDaddy HTTP request methods

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ProviderError, Result};
use crate::http_client::{self, ApiResponse};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::GoDaddyRegistrar;
use super::types::GoDaddyErrorResponse;

impl GoDaddyRegistrar {
    /// Map a non-2xx response to a `ProviderError`.
    fn handle_response_error(&self, response: &ApiResponse, ctx: ErrorContext) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }
        let (status, response_text) = (response.status, response.body.as_str());

        if let Ok(error) = serde_json::from_str::<GoDaddyErrorResponse>(response_text) {
            let mut message = error.message.unwrap_or_default();
            if let Some(path) = error.fields.iter().find_map(|f| f.path.as_deref()) {
                message = format!("{message} ({path})");
            }
            let raw = match error.code {
                Some(code) => RawApiError::with_code(code, message),
                None => RawApiError::new(message),
            };
            return Err(self.map_error(raw.status(status), ctx));
        }

        Err(self.map_error(
            RawApiError::new(format!("HTTP {status}: {response_text}")).status(status),
            ctx,
        ))
    }

    fn serialize_body<B: Serialize>(&self, body: &B) -> Result<String> {
        serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
            provider: self.provider_name().to_string(),
            detail: e.to_string(),
        })
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<T> {
        let url = format!("{}{path}", self.api_base);
        let request = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json");

        let response =
            http_client::send(self.provider_name(), request, &self.retry, |_| None).await?;

        self.handle_response_error(&response, ctx)?;
        response.json(self.provider_name())
    }

    /// Execute a request with a JSON body whose response body is ignored (PUT/PATCH).
    pub(crate) async fn send<B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<()> {
        let payload = self.serialize_body(body)?;
        let url = format!("{}{path}", self.api_base);

        let request_builder = match method {
            "PUT" => self.client.put(&url),
            "PATCH" => self.client.patch(&url),
            _ => self.client.post(&url),
        };
        let request = request_builder
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json")
            .body(payload);

        let response =
            http_client::send(self.provider_name(), request, &self.retry, |_| None).await?;

        self.handle_response_error(&response, ctx)
    }
}
