//! SmartBill Cloud client.
//!
//! Creates invoices and reads back their payment status.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{header, Client, RequestBuilder};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::SmartbillConfig;
use crate::error::SyncError;
use crate::models::{AccountingInvoice, CreatedInvoice, PaymentStatus};
use crate::services::AccountingService;

const SERVICE: &str = "SmartBill";

/// SmartBill client for the invoice endpoints.
#[derive(Clone)]
pub struct SmartbillClient {
    client: Client,
    base_url: String,
    /// Pre-encoded `Authorization` header value.
    authorization: Secret<String>,
}

/// Response to an invoice creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInvoiceResponse {
    #[serde(default)]
    error_text: Option<String>,
    #[serde(default)]
    series: Option<String>,
    #[serde(default)]
    number: Option<String>,
}

/// Response to a payment status request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentStatusResponse {
    #[serde(default)]
    error_text: Option<String>,
    invoice_total_amount: Option<Decimal>,
    paid_amount: Option<Decimal>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SmartbillError {
    #[serde(default)]
    error_text: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

impl SmartbillClient {
    pub fn new(config: SmartbillConfig) -> Result<Self, SyncError> {
        let encoded = general_purpose::STANDARD.encode(config.api_key.expose_secret());

        Ok(Self {
            client: service_core::http::build_client(concat!(
                "invoice-sync/",
                env!("CARGO_PKG_VERSION")
            ))?,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            authorization: Secret::new(format!("Basic {}", encoded)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, SyncError> {
        let response = request
            .header(header::AUTHORIZATION, self.authorization.expose_secret())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SyncError::transport(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::transport(SERVICE, e))?;

        tracing::debug!(status = %status, operation, body = %body, "SmartBill response");

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                SyncError::transport(SERVICE, format!("{}: unexpected response: {}", operation, e))
            })
        } else {
            let detail = serde_json::from_str::<SmartbillError>(&body)
                .ok()
                .and_then(|e| non_empty(e.error_text).or(non_empty(e.message)))
                .unwrap_or(body);
            tracing::error!(status = %status, operation, error = %detail, "SmartBill request failed");
            Err(SyncError::transport(
                SERVICE,
                format!("{} failed ({}): {}", operation, status.as_u16(), detail),
            ))
        }
    }
}

#[async_trait]
impl AccountingService for SmartbillClient {
    async fn create_invoice(
        &self,
        invoice: &AccountingInvoice,
    ) -> Result<CreatedInvoice, SyncError> {
        let request = self.client.post(self.url("SBORO/api/invoice")).json(invoice);
        let response: CreateInvoiceResponse = self.send(request, "create invoice").await?;

        if let Some(error) = non_empty(response.error_text) {
            return Err(SyncError::transport(
                SERVICE,
                format!("create invoice rejected: {}", error),
            ));
        }

        match (non_empty(response.series), non_empty(response.number)) {
            (Some(series), Some(number)) => {
                tracing::info!(series = %series, number = %number, "SmartBill invoice created");
                Ok(CreatedInvoice { series, number })
            }
            _ => Err(SyncError::transport(
                SERVICE,
                "create invoice response is missing series or number",
            )),
        }
    }

    async fn get_payment_status(
        &self,
        series: &str,
        company_vat_code: &str,
        number: &str,
    ) -> Result<PaymentStatus, SyncError> {
        let request = self
            .client
            .get(self.url("SBORO/api/invoice/paymentstatus"))
            .query(&[
                ("cif", company_vat_code),
                ("seriesname", series),
                ("number", number),
            ]);
        let response: PaymentStatusResponse = self.send(request, "get payment status").await?;

        if let Some(error) = non_empty(response.error_text) {
            return Err(SyncError::transport(
                SERVICE,
                format!("payment status rejected: {}", error),
            ));
        }

        match (response.invoice_total_amount, response.paid_amount) {
            (Some(total_amount), Some(paid_amount)) => Ok(PaymentStatus {
                series: series.to_string(),
                number: number.to_string(),
                total_amount,
                paid_amount,
            }),
            _ => Err(SyncError::transport(
                SERVICE,
                "payment status response is missing amounts",
            )),
        }
    }
}
