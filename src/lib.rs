//! Order tracking client for the PC parts storefront API.
//!
//! Identical tracking and OTP calls made within a short window are collapsed
//! into a single request by [`RequestDeduplicator`]; every caller receives the
//! same outcome.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod presentation;
pub mod state;

pub use application::TrackingService;
pub use domain::error::TrackError;
pub use domain::key::RequestKey;
pub use domain::traits::TrackingBackend;
pub use infrastructure::storage::RequestDeduplicator;
