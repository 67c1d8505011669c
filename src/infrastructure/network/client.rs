use crate::domain::error::TrackError;
use crate::domain::model::{OrderDetails, OtpDispatch, OtpVerification, TrackingSummary};
use crate::domain::traits::TrackingBackend;
use crate::infrastructure::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpRequestBody<'a> {
    order_id: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpVerifyBody<'a> {
    order_id: &'a str,
    email: &'a str,
    otp: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Storefront tracking API over HTTP/JSON
pub struct HttpTrackingBackend {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTrackingBackend {
    pub fn new(client: Client, api: &ApiConfig) -> Result<Self, TrackError> {
        let base_url = Url::parse(api.base_url.trim()).map_err(|e| {
            TrackError::Config(format!("Invalid api.base_url '{}': {}", api.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TrackError::Config(format!(
                "api.base_url '{}' cannot carry a path",
                api.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            token: api.token.clone().filter(|t| !t.is_empty()),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        bearer: Option<&str>,
    ) -> Result<T, TrackError> {
        let request_id = Uuid::new_v4();
        let mut request = request.header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = bearer.or(self.token.as_deref()) {
            request = request.bearer_auth(token);
        }

        info!(%request_id, operation, "sending request");

        // NOTE: inner scope so every failure is logged in one place
        let result: Result<T, TrackError> = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            debug!(%request_id, status = status.as_u16(), bytes = body.len(), "response received");

            if !status.is_success() {
                return Err(api_error(status.as_u16(), &body));
            }
            decode_body(&body)
        }
        .await;

        if let Err(e) = &result {
            error!(%request_id, operation, "request failed: {e}");
        }

        result
    }
}

#[async_trait]
impl TrackingBackend for HttpTrackingBackend {
    async fn track_order(&self, order_id: &str) -> Result<TrackingSummary, TrackError> {
        let url = self.endpoint(&["orders", "track", order_id]);
        self.send("track", self.client.get(url), None).await
    }

    async fn request_otp(&self, order_id: &str, email: &str) -> Result<OtpDispatch, TrackError> {
        let url = self.endpoint(&["orders", "track", "otp", "request"]);
        let body = OtpRequestBody { order_id, email };
        self.send("otp-request", self.client.post(url).json(&body), None)
            .await
    }

    async fn verify_otp(
        &self,
        order_id: &str,
        email: &str,
        otp: &str,
    ) -> Result<OtpVerification, TrackError> {
        let url = self.endpoint(&["orders", "track", "otp", "verify"]);
        let body = OtpVerifyBody {
            order_id,
            email,
            otp,
        };
        self.send("otp-verify", self.client.post(url).json(&body), None)
            .await
    }

    async fn track_order_details(
        &self,
        order_id: &str,
        access_token: &str,
    ) -> Result<OrderDetails, TrackError> {
        let url = self.endpoint(&["orders", "track", order_id, "details"]);
        self.send("track-details", self.client.get(url), Some(access_token))
            .await
    }
}

/// Error for a non-success response, preferring the body's `message` field
pub fn api_error(status: u16, body: &[u8]) -> TrackError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    TrackError::Api { status, message }
}

/// Decode a success body, accepting both bare and `{"data": ...}` payloads
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, TrackError> {
    let value: Value = serde_json::from_slice(body)?;
    let payload = match value {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(payload)?)
}
