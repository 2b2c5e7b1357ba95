//! Configuration module for invoice-sync.

use crate::error::SyncError;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::PathBuf;

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const SMARTBILL_API_BASE: &str = "https://ws.smartbill.ro";

/// Flat settings as they appear in the environment or the settings file.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Settings {
    pub stripe_secret_key: Option<Secret<String>>,
    pub smartbill_api_key: Option<Secret<String>>,
    pub smartbill_series: Option<String>,
    pub smartbill_company_cui: Option<String>,
    pub smartbill_intocmit_nume: Option<String>,
    pub smartbill_intocmit_cnp: Option<String>,
    pub smartbill_delegat_nume: Option<String>,
    pub smartbill_delegat_ci: Option<String>,
    pub smartbill_mentiuni: Option<String>,
    pub vat_rates_path: Option<PathBuf>,
    pub stripe_api_base_url: Option<String>,
    pub smartbill_api_base_url: Option<String>,
    pub log_level: Option<String>,
    pub otlp_endpoint: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub vat_rates_path: PathBuf,
    pub stripe: StripeConfig,
    pub smartbill: SmartbillConfig,
    pub company: CompanyProfile,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: Secret<String>,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct SmartbillConfig {
    /// `user:token` pair, sent base64-encoded.
    pub api_key: Secret<String>,
    pub api_base_url: String,
}

/// Issuing company details stamped on every accounting invoice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanyProfile {
    pub vat_code: String,
    pub series: String,
    pub mentions: String,
    pub issuer: Option<Identity>,
    pub delegate: Option<Identity>,
}

/// Name plus national id (issuer CNP or delegate identity card).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub id: String,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        let settings: Settings = service_core::config::load()?;
        Self::from_settings(settings)
    }

    pub fn from_settings(settings: Settings) -> Result<Self, SyncError> {
        let stripe_secret_key = required_secret(settings.stripe_secret_key, "STRIPE_SECRET_KEY")?;
        let smartbill_api_key = required_secret(settings.smartbill_api_key, "SMARTBILL_API_KEY")?;
        let series = required(settings.smartbill_series, "SMARTBILL_SERIES")?;
        let vat_code = required(settings.smartbill_company_cui, "SMARTBILL_COMPANY_CUI")?;

        Ok(Self {
            service_name: "invoice-sync".to_string(),
            log_level: non_empty(settings.log_level).unwrap_or_else(|| "info".to_string()),
            otlp_endpoint: non_empty(settings.otlp_endpoint),
            vat_rates_path: settings
                .vat_rates_path
                .unwrap_or_else(|| PathBuf::from("vat_rates.json")),
            stripe: StripeConfig {
                secret_key: stripe_secret_key,
                api_base_url: non_empty(settings.stripe_api_base_url)
                    .unwrap_or_else(|| STRIPE_API_BASE.to_string()),
            },
            smartbill: SmartbillConfig {
                api_key: smartbill_api_key,
                api_base_url: non_empty(settings.smartbill_api_base_url)
                    .unwrap_or_else(|| SMARTBILL_API_BASE.to_string()),
            },
            company: CompanyProfile {
                vat_code,
                series,
                mentions: settings.smartbill_mentiuni.unwrap_or_default(),
                issuer: identity(
                    settings.smartbill_intocmit_nume,
                    settings.smartbill_intocmit_cnp,
                ),
                delegate: identity(settings.smartbill_delegat_nume, settings.smartbill_delegat_ci),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, key: &str) -> Result<String, SyncError> {
    non_empty(value).ok_or_else(|| SyncError::Config(format!("{} is required", key)))
}

fn required_secret(value: Option<Secret<String>>, key: &str) -> Result<Secret<String>, SyncError> {
    value
        .filter(|v| !v.expose_secret().trim().is_empty())
        .ok_or_else(|| SyncError::Config(format!("{} is required", key)))
}

/// Both halves configured, or nothing.
fn identity(name: Option<String>, id: Option<String>) -> Option<Identity> {
    match (non_empty(name), non_empty(id)) {
        (Some(name), Some(id)) => Some(Identity { name, id }),
        _ => None,
    }
}
