//! Payment processor snapshots: charges, their invoices and customers.
//!
//! Field names follow the Stripe API so responses deserialize directly.
//! Anything Stripe documents as nullable is an `Option` here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::TaxCategory;

/// Metadata key marking a charge as already invoiced.
pub const INVOICED_MARKER: &str = "smartbill_invoice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Succeeded,
    Pending,
    Failed,
    #[serde(other)]
    Other,
}

/// A charge recorded by the payment processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    /// Seconds since epoch.
    pub created: i64,
    /// Minor currency units.
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    pub status: ChargeStatus,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub invoice: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Payment {
    pub fn is_invoiced(&self) -> bool {
        self.metadata
            .get(INVOICED_MARKER)
            .is_some_and(|value| !value.is_empty())
    }

    /// Succeeded and not yet invoiced.
    pub fn is_eligible(&self) -> bool {
        self.status == ChargeStatus::Succeeded && !self.is_invoiced()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Region or county.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxId {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemPrice {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Minor units, possibly fractional (Stripe sends a decimal string).
    #[serde(default)]
    pub unit_amount_excluding_tax: Option<Decimal>,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<LineItemPrice>,
}

/// Line items embedded in an invoice. Stripe embeds only the first page;
/// `has_more` is set when the rest must be fetched separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineList {
    #[serde(default)]
    pub data: Vec<LineItem>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl LineList {
    /// Every line item of the invoice is present.
    pub fn is_complete(&self) -> bool {
        !self.has_more
            && self
                .total_count
                .map_or(true, |total| total == self.data.len() as u64)
    }
}

/// The processor-side invoice backing a charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInvoice {
    pub id: String,
    #[serde(default)]
    pub number: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_address: Option<Address>,
    #[serde(default)]
    pub customer_tax_ids: Option<Vec<TaxId>>,
    #[serde(default)]
    pub customer_tax_exempt: Option<TaxCategory>,
    #[serde(default)]
    pub lines: LineList,
}

impl SourceInvoice {
    pub fn tax_category(&self) -> TaxCategory {
        self.customer_tax_exempt.unwrap_or_default()
    }

    pub fn address(&self) -> Address {
        self.customer_address.clone().unwrap_or_default()
    }

    /// VAT code of an EU business customer, taken from the first tax id only.
    pub fn eu_vat_code(&self) -> Option<&str> {
        self.customer_tax_ids
            .as_deref()
            .and_then(|ids| ids.first())
            .filter(|id| id.kind == "eu_vat" && !id.value.trim().is_empty())
            .map(|id| id.value.as_str())
    }

    /// Fill customer details the invoice snapshot left empty from the customer record.
    pub fn fill_from_customer(&mut self, customer: &Customer) {
        if is_blank(&self.customer_name) {
            self.customer_name = customer.name.clone();
        }
        if is_blank(&self.customer_email) {
            self.customer_email = customer.email.clone();
        }
        if self.customer_address.is_none() {
            self.customer_address = customer.address.clone();
        }
        if self.customer.is_none() {
            self.customer = Some(customer.id.clone());
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}
