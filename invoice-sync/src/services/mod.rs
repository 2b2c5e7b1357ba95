//! Invoice generation services.
//!
//! The pipeline talks to the payment processor and the accounting service
//! only through [`PaymentSource`] and [`AccountingService`], so either side
//! can be swapped or faked.

pub mod generator;
pub mod invoice_builder;
pub mod reconciliation;
pub mod smartbill;
pub mod stripe;
pub mod tax_rules;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::SyncError;
use crate::models::{
    AccountingInvoice, CreatedInvoice, Customer, Payment, PaymentStatus, SourceInvoice,
};

pub use generator::{InvoiceGenerator, InvoicedPayment, RunMode, RunSummary};
pub use invoice_builder::build_invoice;
pub use smartbill::SmartbillClient;
pub use stripe::StripeClient;
pub use tax_rules::TaxRuleTable;

/// Payment processor side of the pipeline.
#[async_trait]
pub trait PaymentSource: Send + Sync {
    /// All payments created on or after `since` (UTC midnight), any status.
    async fn list_payments(&self, since: NaiveDate) -> Result<Vec<Payment>, SyncError>;

    async fn get_payment(&self, payment_id: &str) -> Result<Payment, SyncError>;

    async fn get_invoice(&self, invoice_id: &str) -> Result<SourceInvoice, SyncError>;

    async fn get_customer(&self, customer_id: &str) -> Result<Customer, SyncError>;

    /// Record the accounting invoice reference in the payment's invoiced-marker.
    async fn mark_invoiced(&self, payment_id: &str, reference: &str) -> Result<(), SyncError>;
}

/// Accounting service side of the pipeline.
#[async_trait]
pub trait AccountingService: Send + Sync {
    async fn create_invoice(&self, invoice: &AccountingInvoice)
        -> Result<CreatedInvoice, SyncError>;

    async fn get_payment_status(
        &self,
        series: &str,
        company_vat_code: &str,
        number: &str,
    ) -> Result<PaymentStatus, SyncError>;
}
