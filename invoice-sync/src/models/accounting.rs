//! Accounting service documents: the invoice payload we submit and what
//! comes back for it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice payload submitted to the accounting service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingInvoice {
    pub company_vat_code: String,
    pub client: InvoiceClient,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub series_name: String,
    pub currency: String,
    pub language: String,
    pub mentions: String,
    /// Reference note naming the source invoice.
    pub aviz: String,
    #[serde(flatten)]
    pub issuer: Option<Issuer>,
    #[serde(flatten)]
    pub delegate: Option<Delegate>,
    pub products: Vec<Product>,
    pub payment: InvoicePayment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceClient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_code: Option<String>,
    /// Processor customer id.
    pub code: String,
    pub address: String,
    pub is_tax_payer: bool,
    pub city: String,
    pub county: String,
    pub country: String,
    pub email: String,
    pub save_to_db: bool,
}

/// Signing officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub issuer_name: String,
    pub issuer_cnp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegate {
    pub delegate_name: String,
    pub delegate_identity_card: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub code: String,
    pub is_discount: bool,
    pub measuring_unit_name: String,
    pub currency: String,
    pub quantity: i64,
    /// Major units, excluding tax.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub is_tax_included: bool,
    pub tax_name: String,
    pub tax_percentage: u32,
    pub is_service: bool,
    pub save_to_db: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayment {
    /// Major units.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_cash: bool,
}

/// Series and number assigned by the accounting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedInvoice {
    pub series: String,
    pub number: String,
}

impl CreatedInvoice {
    /// Value written into the payment's invoiced-marker.
    pub fn reference(&self) -> String {
        format!("{}{}", self.series, self.number)
    }
}

/// Amounts recorded by the accounting service for a created invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatus {
    pub series: String,
    pub number: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
}
