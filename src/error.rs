//! Error handling for the OTTSONLY Rust client
//!
//! Every failure a caller can see resolves to one [`Error`] value whose
//! `Display` output is the human-readable message shown to the user.
//! Callers that need more than the message match on the variant instead of
//! inspecting the string.

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// How a non-success response body described the failure
#[derive(Debug, Clone, PartialEq)]
pub enum ApiErrorKind {
    /// `detail` was a string
    Detail,

    /// `detail` was an array of validation issues; holds each `msg`/`message`
    Validation(Vec<String>),

    /// `detail` was an object
    DetailObject(serde_json::Value),

    /// No usable `detail`, but the body carried a `message` string
    Message,

    /// A JSON body with nothing describing the failure
    Unspecified,
}

/// Form field a local validation error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Amount,
    Destination,
    Email,
    Terms,
    PaymentMethod,
    SubscriptionId,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Amount => "amount",
            Field::Destination => "destination",
            Field::Email => "email",
            Field::Terms => "terms",
            Field::PaymentMethod => "payment_method",
            Field::SubscriptionId => "subscription_id",
        };
        f.write_str(name)
    }
}

/// Field-level rejection raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    pub fn new<T: fmt::Display>(field: Field, message: T) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Unified error type for the OTTSONLY Rust client
#[derive(Error, Debug)]
pub enum Error {
    /// Non-success status with a JSON body
    #[error("{message}")]
    Api {
        status: u16,
        kind: ApiErrorKind,
        message: String,
    },

    /// Non-success status whose body was not JSON
    #[error("Server error: {status} {status_text}")]
    Server { status: u16, status_text: String },

    /// Success status whose body was not JSON
    #[error("Invalid response from server")]
    InvalidResponse,

    /// The request never completed
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Well-formed JSON that does not match the expected response shape
    #[error("Unexpected response shape: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request body serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected locally before any request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisted session storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The payment gateway failed or was dismissed
    #[error("{0}")]
    Gateway(String),

    /// A mutating action is already in flight
    #[error("{0} is already in progress")]
    Busy(&'static str),
}

impl Error {
    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new gateway error
    pub fn gateway<T: fmt::Display>(msg: T) -> Self {
        Error::Gateway(msg.to_string())
    }

    /// Create a new validation error for `field`
    pub fn validation<T: fmt::Display>(field: Field, msg: T) -> Self {
        Error::Validation(ValidationError::new(field, msg))
    }

    /// The message to show the user
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::Server { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The field a local validation error belongs to
    pub fn field(&self) -> Option<Field> {
        match self {
            Error::Validation(v) => Some(v.field),
            _ => None,
        }
    }
}
