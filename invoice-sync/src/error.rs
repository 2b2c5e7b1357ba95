//! Error taxonomy for the invoice sync pipeline.
//!
//! Every variant aborts the current run. Only [`SyncError::Transport`] may be
//! worth restarting as-is; the others point at data or configuration that a
//! person has to fix first.

use rust_decimal::Decimal;
use service_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Country {country} not defined in VAT rates, please define it")]
    MissingTaxRule { country: String },

    #[error(
        "Invoice {series}{number}: paid amount {paid} does not match invoice total {total}, manual reconciliation required"
    )]
    Mismatch {
        series: String,
        number: String,
        total: Decimal,
        paid: Decimal,
    },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("Payment {payment_id} cannot be invoiced: {reason}")]
    MalformedPayment { payment_id: String, reason: String },

    #[error("Invalid start date: {0}")]
    InvalidStartDate(String),
}

impl SyncError {
    pub fn transport(service: &'static str, err: impl std::fmt::Display) -> Self {
        SyncError::Transport {
            service,
            message: err.to_string(),
        }
    }

    pub fn malformed(payment_id: &str, reason: impl Into<String>) -> Self {
        SyncError::MalformedPayment {
            payment_id: payment_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether restarting the run without any change could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport { .. })
    }
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Http(e) => SyncError::Config(format!("HTTP client setup failed: {}", e)),
            other => SyncError::Config(other.to_string()),
        }
    }
}
