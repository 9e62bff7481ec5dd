//! Zoho Mail HTTP request methods

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::http_client::{self, ApiResponse};
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::ZohoMailProvider;
use super::types::{ZohoErrorData, ZohoResponse, ZohoStatus};

/// Envelope header only, for cheap inspection before the full decode.
#[derive(serde::Deserialize)]
struct EnvelopeStatus {
    status: ZohoStatus,
}

/// A 2xx reply whose envelope reports a server fault is transient.
fn envelope_fault(response: &ApiResponse) -> Option<ProviderError> {
    if !response.is_success() {
        return None;
    }
    let envelope: EnvelopeStatus = serde_json::from_str(&response.body).ok()?;
    matches!(envelope.status.code, 500 | 502..=504).then(|| ProviderError::NetworkError {
        provider: "zoho".to_string(),
        detail: format!(
            "status {} in HTTP {} reply: {}",
            envelope.status.code, response.status, envelope.status.description
        ),
    })
}

impl ZohoMailProvider {
    /// Unwrap the `{status, data}` envelope, mapping failures.
    ///
    /// Zoho sometimes answers HTTP 200 with a failing `status.code`, so both are checked.
    fn unwrap_envelope(&self, status: u16, response_text: &str, ctx: ErrorContext) -> Result<Value> {
        let envelope: ZohoResponse<Value> = match serde_json::from_str(response_text) {
            Ok(env) => env,
            Err(e) if (200..300).contains(&status) => return Err(self.parse_error(e)),
            Err(_) => {
                return Err(self.map_error(
                    RawApiError::new(format!("HTTP {status}: {response_text}")).status(status),
                    ctx,
                ));
            }
        };

        if (200..300).contains(&status) && (200..300).contains(&envelope.status.code) {
            return Ok(envelope.data.unwrap_or(Value::Null));
        }

        let error = envelope
            .data
            .and_then(|d| serde_json::from_value::<ZohoErrorData>(d).ok());
        let (code, message) = match error {
            Some(ZohoErrorData {
                error_code,
                more_info,
            }) => (
                error_code,
                more_info.unwrap_or_else(|| envelope.status.description.clone()),
            ),
            None => (None, envelope.status.description.clone()),
        };
        let raw = match code {
            Some(code) => RawApiError::with_code(code, message),
            None => RawApiError::new(message),
        };
        let http_status = if (200..300).contains(&status) {
            envelope.status.code
        } else {
            status
        };
        Err(self.map_error(raw.status(http_status), ctx))
    }

    fn decode<T: DeserializeOwned>(&self, data: Value) -> Result<T> {
        serde_json::from_value(data).map_err(|e| {
            log::error!("[zoho] Response data did not match the expected shape: {e}");
            self.parse_error(e)
        })
    }

    /// Execute a GET request and decode `data`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, ctx: ErrorContext) -> Result<T> {
        let url = format!("{}{path}", self.api_base);
        let request = self
            .client
            .get(&url)
            .header("Authorization", format!("Zoho-oauthtoken {}", self.oauth_token))
            .header("Accept", "application/json");

        let response =
            http_client::send(self.provider_name(), request, &self.retry, envelope_fault).await?;

        let data = self.unwrap_envelope(response.status, &response.body, ctx)?;
        self.decode(data)
    }

    /// Execute a POST/PUT request and return the raw `data` value.
    pub(crate) async fn send<B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<Value> {
        let payload =
            serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
                provider: self.provider_name().to_string(),
                detail: e.to_string(),
            })?;
        let url = format!("{}{path}", self.api_base);

        let request_builder = match method {
            "PUT" => self.client.put(&url),
            _ => self.client.post(&url),
        };
        let request = request_builder
            .header("Authorization", format!("Zoho-oauthtoken {}", self.oauth_token))
            .header("Content-Type", "application/json")
            .body(payload);

        let response =
            http_client::send(self.provider_name(), request, &self.retry, envelope_fault).await?;

        self.unwrap_envelope(response.status, &response.body, ctx)
    }

    /// `send` followed by decoding `data`.
    pub(crate) async fn send_decode<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        let data = self.send(method, path, body, ctx).await?;
        self.decode(data)
    }
}
