use crate::domain::error::TrackError;
use crate::domain::model::{OrderDetails, OtpDispatch, OtpVerification, TrackingSummary};
use async_trait::async_trait;

/// Order tracking backend
///
/// The HTTP client implements this against the storefront API; tests swap in
/// in-memory fakes.
#[async_trait]
pub trait TrackingBackend: Send + Sync + 'static {
    /// Public tracking summary for an order
    async fn track_order(&self, order_id: &str) -> Result<TrackingSummary, TrackError>;

    /// Ask the backend to e-mail a one-time password for the order
    async fn request_otp(&self, order_id: &str, email: &str) -> Result<OtpDispatch, TrackError>;

    /// Exchange an OTP for a short-lived access token
    async fn verify_otp(
        &self,
        order_id: &str,
        email: &str,
        otp: &str,
    ) -> Result<OtpVerification, TrackError>;

    /// Full order details, authorised by a verified access token
    async fn track_order_details(
        &self,
        order_id: &str,
        access_token: &str,
    ) -> Result<OrderDetails, TrackError>;
}
