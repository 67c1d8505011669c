use crate::domain::error::TrackError;
use std::fmt;

/// Cache key for a tracking call: the operation plus its normalized arguments.
///
/// Fields are compared structurally, so an order id containing a separator can
/// never collide with another operation's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Track {
        order_id: String,
    },
    RequestOtp {
        order_id: String,
        email: String,
    },
    VerifyOtp {
        order_id: String,
        email: String,
        otp: String,
    },
    TrackDetails {
        order_id: String,
        access_token: String,
    },
}

impl RequestKey {
    pub fn track(order_id: &str) -> Result<Self, TrackError> {
        Ok(Self::Track {
            order_id: required("order id", order_id)?,
        })
    }

    pub fn request_otp(order_id: &str, email: &str) -> Result<Self, TrackError> {
        Ok(Self::RequestOtp {
            order_id: required("order id", order_id)?,
            email: normalize_email(email)?,
        })
    }

    pub fn verify_otp(order_id: &str, email: &str, otp: &str) -> Result<Self, TrackError> {
        Ok(Self::VerifyOtp {
            order_id: required("order id", order_id)?,
            email: normalize_email(email)?,
            otp: required("OTP", otp)?,
        })
    }

    pub fn track_details(order_id: &str, access_token: &str) -> Result<Self, TrackError> {
        Ok(Self::TrackDetails {
            order_id: required("order id", order_id)?,
            access_token: required("access token", access_token)?,
        })
    }

    pub fn operation(&self) -> &'static str {
        match self {
            RequestKey::Track { .. } => "track",
            RequestKey::RequestOtp { .. } => "otp-request",
            RequestKey::VerifyOtp { .. } => "otp-verify",
            RequestKey::TrackDetails { .. } => "track-details",
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            RequestKey::Track { order_id }
            | RequestKey::RequestOtp { order_id, .. }
            | RequestKey::VerifyOtp { order_id, .. }
            | RequestKey::TrackDetails { order_id, .. } => order_id,
        }
    }
}

// Secrets (OTP, token) stay out of logs
impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKey::RequestOtp { order_id, email }
            | RequestKey::VerifyOtp {
                order_id, email, ..
            } => write!(f, "{}({}, {})", self.operation(), order_id, email),
            _ => write!(f, "{}({})", self.operation(), self.order_id()),
        }
    }
}

/// Trimmed `value`, or `InvalidInput` when nothing is left.
pub(crate) fn required(name: &str, value: &str) -> Result<String, TrackError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackError::InvalidInput(format!("{} is empty", name)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_email(email: &str) -> Result<String, TrackError> {
    let email = required("email", email)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(TrackError::InvalidInput(format!(
            "'{}' is not a valid email",
            email
        ))),
    }
}
