//! Stripe client.
//!
//! Lists and fetches charges, their invoices and customers, and writes the
//! invoiced-marker back onto a charge's metadata.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::StripeConfig;
use crate::error::SyncError;
use crate::models::{Customer, LineItem, Payment, SourceInvoice, INVOICED_MARKER};
use crate::services::PaymentSource;

const SERVICE: &str = "Stripe";
const PAGE_LIMIT: u32 = 100;

/// Stripe client for the charge, invoice and customer endpoints.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

/// One page of a Stripe list endpoint.
#[derive(Debug, Deserialize)]
struct ListPage<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

/// Stripe API error response.
#[derive(Debug, Deserialize)]
struct StripeError {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Result<Self, SyncError> {
        Ok(Self {
            client: service_core::http::build_client(concat!(
                "invoice-sync/",
                env!("CARGO_PKG_VERSION")
            ))?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(self.config.secret_key.expose_secret(), Some(""))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, SyncError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| SyncError::transport(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::transport(SERVICE, e))?;

        tracing::debug!(status = %status, operation, "Stripe response");

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                SyncError::transport(SERVICE, format!("{}: unexpected response: {}", operation, e))
            })
        } else {
            let detail = serde_json::from_str::<StripeError>(&body)
                .ok()
                .and_then(|e| e.error.message.or(e.error.kind))
                .unwrap_or(body);
            tracing::error!(status = %status, operation, error = %detail, "Stripe request failed");
            Err(SyncError::transport(
                SERVICE,
                format!("{} failed ({}): {}", operation, status.as_u16(), detail),
            ))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, operation: &str) -> Result<T, SyncError> {
        self.send(self.client.get(self.url(path)), operation).await
    }

    /// Follow `has_more`/`starting_after` until the list is exhausted.
    async fn list_all<T, F>(
        &self,
        path: &str,
        filters: &[(&str, String)],
        operation: &str,
        cursor: F,
    ) -> Result<Vec<T>, SyncError>
    where
        T: DeserializeOwned + Send,
        F: Fn(&T) -> Option<String> + Send + Sync,
    {
        let mut items = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut params = vec![("limit", PAGE_LIMIT.to_string())];
            params.extend(filters.iter().cloned());
            if let Some(ref after) = starting_after {
                params.push(("starting_after", after.clone()));
            }

            let request = self.client.get(self.url(path)).query(&params);
            let page: ListPage<T> = self.send(request, operation).await?;

            // has_more with no data would loop forever
            if page.has_more && page.data.is_empty() {
                return Err(SyncError::transport(
                    SERVICE,
                    format!("{} returned has_more=true with empty data", operation),
                ));
            }

            tracing::debug!(operation, count = page.data.len(), has_more = page.has_more, "Page fetched");

            let last_id = page.data.last().and_then(|item| cursor(item));
            let has_more = page.has_more;
            items.extend(page.data);

            if !has_more {
                break;
            }

            if last_id.is_none() || starting_after == last_id {
                return Err(SyncError::transport(
                    SERVICE,
                    format!(
                        "{} pagination stuck at starting_after={}",
                        operation,
                        last_id.unwrap_or_default()
                    ),
                ));
            }
            starting_after = last_id;
        }

        Ok(items)
    }
}

fn date_to_epoch(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl PaymentSource for StripeClient {
    async fn list_payments(&self, since: NaiveDate) -> Result<Vec<Payment>, SyncError> {
        let created_from = date_to_epoch(since).to_string();
        self.list_all(
            "v1/charges",
            &[("created[gte]", created_from)],
            "list charges",
            |payment: &Payment| Some(payment.id.clone()),
        )
        .await
    }

    async fn get_payment(&self, payment_id: &str) -> Result<Payment, SyncError> {
        self.get(&format!("v1/charges/{}", payment_id), "get charge")
            .await
    }

    async fn get_invoice(&self, invoice_id: &str) -> Result<SourceInvoice, SyncError> {
        let mut invoice: SourceInvoice = self
            .get(&format!("v1/invoices/{}", invoice_id), "get invoice")
            .await?;

        // Only the first page of lines is embedded; re-read the full list.
        if invoice.lines.has_more {
            let lines = self
                .list_all(
                    &format!("v1/invoices/{}/lines", invoice_id),
                    &[],
                    "list invoice lines",
                    |line: &LineItem| line.id.clone(),
                )
                .await?;

            tracing::debug!(
                invoice_id,
                embedded = invoice.lines.data.len(),
                fetched = lines.len(),
                "Invoice lines completed"
            );
            invoice.lines.data = lines;
            invoice.lines.has_more = false;
        }

        Ok(invoice)
    }

    async fn get_customer(&self, customer_id: &str) -> Result<Customer, SyncError> {
        self.get(&format!("v1/customers/{}", customer_id), "get customer")
            .await
    }

    async fn mark_invoiced(&self, payment_id: &str, reference: &str) -> Result<(), SyncError> {
        let key = format!("metadata[{}]", INVOICED_MARKER);
        let request = self
            .client
            .post(self.url(&format!("v1/charges/{}", payment_id)))
            .form(&[(key.as_str(), reference)]);

        let updated: Payment = self.send(request, "update charge").await?;
        tracing::info!(payment_id = %updated.id, reference, "Charge marked as invoiced");
        Ok(())
    }
}
