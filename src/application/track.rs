use crate::domain::error::TrackError;
use crate::domain::key::{normalize_email, required, RequestKey};
use crate::domain::model::{OrderDetails, OtpDispatch, OtpVerification, TrackingSummary};
use crate::domain::traits::TrackingBackend;
use crate::infrastructure::config::CacheConfig;
use crate::infrastructure::storage::{DedupOptions, DedupStats, RequestDeduplicator};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type Dedup<T> = RequestDeduplicator<RequestKey, T, TrackError>;

/// One deduplicator per call site, all with the same window
#[derive(Clone)]
struct TrackingCache {
    summaries: Dedup<TrackingSummary>,
    otp_requests: Dedup<OtpDispatch>,
    otp_verifications: Dedup<OtpVerification>,
    details: Dedup<OrderDetails>,
}

impl TrackingCache {
    fn new(config: &CacheConfig) -> Self {
        let options = DedupOptions {
            evict_failures: config.evict_failures,
            ..DedupOptions::from_millis(config.window_ms, config.grace_ms)
        };

        Self {
            summaries: RequestDeduplicator::with_options(options),
            otp_requests: RequestDeduplicator::with_options(options),
            otp_verifications: RequestDeduplicator::with_options(options),
            details: RequestDeduplicator::with_options(options),
        }
    }
}

/// Order tracking operations with identical calls collapsed inside the
/// cache window.
pub struct TrackingService<B> {
    backend: Arc<B>,
    cache: TrackingCache,
}

impl<B> Clone for TrackingService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            cache: self.cache.clone(),
        }
    }
}

impl<B: TrackingBackend> TrackingService<B> {
    pub fn new(backend: B, config: &CacheConfig) -> Self {
        Self::with_shared_backend(Arc::new(backend), config)
    }

    pub fn with_shared_backend(backend: Arc<B>, config: &CacheConfig) -> Self {
        Self {
            backend,
            cache: TrackingCache::new(config),
        }
    }

    pub async fn track_order(&self, order_id: &str) -> Result<TrackingSummary, TrackError> {
        let id = required("order id", order_id)?;
        let key = RequestKey::Track {
            order_id: id.clone(),
        };
        let backend = Arc::clone(&self.backend);

        debug!("Tracking order {key}");
        self.cache
            .summaries
            .get_or_create(key, move || async move { backend.track_order(&id).await })
            .await
            .map_err(TrackError::from)
    }

    pub async fn request_otp(&self, order_id: &str, email: &str) -> Result<OtpDispatch, TrackError> {
        let id = required("order id", order_id)?;
        let email = normalize_email(email)?;
        let key = RequestKey::RequestOtp {
            order_id: id.clone(),
            email: email.clone(),
        };
        let backend = Arc::clone(&self.backend);

        debug!("Requesting OTP {key}");
        self.cache
            .otp_requests
            .get_or_create(key, move || async move {
                backend.request_otp(&id, &email).await
            })
            .await
            .map_err(TrackError::from)
    }

    pub async fn verify_otp(
        &self,
        order_id: &str,
        email: &str,
        otp: &str,
    ) -> Result<OtpVerification, TrackError> {
        let id = required("order id", order_id)?;
        let email = normalize_email(email)?;
        let otp = required("OTP", otp)?;
        let key = RequestKey::VerifyOtp {
            order_id: id.clone(),
            email: email.clone(),
            otp: otp.clone(),
        };
        let backend = Arc::clone(&self.backend);

        debug!("Verifying OTP {key}");
        self.cache
            .otp_verifications
            .get_or_create(key, move || async move {
                backend.verify_otp(&id, &email, &otp).await
            })
            .await
            .map_err(TrackError::from)
    }

    pub async fn track_order_details(
        &self,
        order_id: &str,
        access_token: &str,
    ) -> Result<OrderDetails, TrackError> {
        let id = required("order id", order_id)?;
        let token = required("access token", access_token)?;
        let key = RequestKey::TrackDetails {
            order_id: id.clone(),
            access_token: token.clone(),
        };
        let backend = Arc::clone(&self.backend);

        debug!("Fetching order details {key}");
        self.cache
            .details
            .get_or_create(key, move || async move {
                backend.track_order_details(&id, &token).await
            })
            .await
            .map_err(TrackError::from)
    }

    /// How long identical calls keep sharing one request
    pub fn window(&self) -> Duration {
        self.cache.summaries.window()
    }

    /// Hit/miss counters summed over every call site
    pub fn stats(&self) -> DedupStats {
        [
            self.cache.summaries.stats(),
            self.cache.otp_requests.stats(),
            self.cache.otp_verifications.stats(),
            self.cache.details.stats(),
        ]
        .into_iter()
        .fold(DedupStats::default(), |acc, s| DedupStats {
            hits: acc.hits + s.hits,
            misses: acc.misses + s.misses,
            entries: acc.entries + s.entries,
        })
    }

    pub fn clear_cache(&self) {
        self.cache.summaries.clear();
        self.cache.otp_requests.clear();
        self.cache.otp_verifications.clear();
        self.cache.details.clear();
    }
}
