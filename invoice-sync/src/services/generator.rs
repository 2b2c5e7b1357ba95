//! Drives one invoice generation run.
//!
//! Payments are processed one at a time, oldest first, so the accounting
//! service hands out invoice numbers in the same order the charges happened.
//! The first failure stops the run; payments already invoiced stay marked and
//! are skipped by the next run.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::Instrument;

use crate::config::CompanyProfile;
use crate::error::SyncError;
use crate::models::{AccountingInvoice, CreatedInvoice, Payment};
use crate::services::{
    build_invoice, reconciliation, AccountingService, PaymentSource, TaxRuleTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Create, reconcile and mark every eligible payment.
    Submit,
    /// Build and log the invoices only. Nothing is written anywhere.
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicedPayment {
    pub payment_id: String,
    pub invoice: CreatedInvoice,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub eligible: usize,
    pub invoiced: Vec<InvoicedPayment>,
    pub previewed: Vec<AccountingInvoice>,
    /// Payments found already marked when re-fetched.
    pub skipped: Vec<String>,
}

pub struct InvoiceGenerator {
    payments: Arc<dyn PaymentSource>,
    accounting: Arc<dyn AccountingService>,
    tax_rules: TaxRuleTable,
    company: CompanyProfile,
}

/// Succeeded, unmarked payments in ascending creation order.
pub fn select_eligible(payments: Vec<Payment>) -> Vec<Payment> {
    let mut eligible: Vec<Payment> = payments
        .into_iter()
        .filter(Payment::is_eligible)
        .collect();
    eligible.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
    eligible
}

impl InvoiceGenerator {
    pub fn new(
        payments: Arc<dyn PaymentSource>,
        accounting: Arc<dyn AccountingService>,
        tax_rules: TaxRuleTable,
        company: CompanyProfile,
    ) -> Self {
        Self {
            payments,
            accounting,
            tax_rules,
            company,
        }
    }

    pub async fn eligible_payments(&self, since: NaiveDate) -> Result<Vec<Payment>, SyncError> {
        let listed = self.payments.list_payments(since).await?;
        let total = listed.len();
        let eligible = select_eligible(listed);

        tracing::info!(
            since = %since,
            listed = total,
            eligible = eligible.len(),
            "Payments selected for invoicing"
        );
        Ok(eligible)
    }

    pub async fn run(&self, since: NaiveDate, mode: RunMode) -> Result<RunSummary, SyncError> {
        let queue = self.eligible_payments(since).await?;
        let mut summary = RunSummary {
            eligible: queue.len(),
            ..RunSummary::default()
        };

        for listed in &queue {
            let span = tracing::info_span!("payment", payment_id = %listed.id, created = listed.created);

            let Some((payment, invoice)) = self.prepare(listed).instrument(span.clone()).await?
            else {
                summary.skipped.push(listed.id.clone());
                continue;
            };

            match mode {
                RunMode::DryRun => {
                    span.in_scope(|| match serde_json::to_string(&invoice) {
                        Ok(payload) => {
                            tracing::info!(%payload, "Dry run, invoice not submitted")
                        }
                        Err(e) => tracing::warn!(
                            error = %e,
                            "Dry run, invoice not submitted and could not be serialized"
                        ),
                    });
                    summary.previewed.push(invoice);
                }
                RunMode::Submit => {
                    let created = self.submit(&payment, &invoice).instrument(span).await?;
                    summary.invoiced.push(InvoicedPayment {
                        payment_id: payment.id,
                        invoice: created,
                    });
                }
            }
        }

        tracing::info!(
            eligible = summary.eligible,
            invoiced = summary.invoiced.len(),
            previewed = summary.previewed.len(),
            skipped = summary.skipped.len(),
            "Invoice generation finished"
        );
        Ok(summary)
    }

    /// Fetch the current payment state and its details, and build the invoice.
    /// Returns `None` when the payment was marked since it was listed.
    async fn prepare(
        &self,
        listed: &Payment,
    ) -> Result<Option<(Payment, AccountingInvoice)>, SyncError> {
        let payment = self.payments.get_payment(&listed.id).await?;
        if !payment.is_eligible() {
            tracing::warn!(status = ?payment.status, "Payment no longer eligible, skipping");
            return Ok(None);
        }

        let invoice_id = payment
            .invoice
            .clone()
            .ok_or_else(|| SyncError::malformed(&payment.id, "no originating invoice"))?;
        let mut source = self.payments.get_invoice(&invoice_id).await?;

        if let Some(customer_id) = payment.customer.as_deref() {
            let customer = self.payments.get_customer(customer_id).await?;
            source.fill_from_customer(&customer);
        }

        let invoice = build_invoice(&payment, &source, &self.tax_rules, &self.company)?;
        Ok(Some((payment, invoice)))
    }

    /// Create, reconcile, then mark. The marker is only written once the
    /// accounting invoice is confirmed fully paid.
    async fn submit(
        &self,
        payment: &Payment,
        invoice: &AccountingInvoice,
    ) -> Result<CreatedInvoice, SyncError> {
        let created = self.accounting.create_invoice(invoice).await?;

        let status = self
            .accounting
            .get_payment_status(&created.series, &self.company.vat_code, &created.number)
            .await?;
        reconciliation::verify(&status)?;

        self.payments
            .mark_invoiced(&payment.id, &created.reference())
            .await?;

        tracing::info!(
            series = %created.series,
            number = %created.number,
            amount = %invoice.payment.value,
            currency = %invoice.currency,
            "Payment invoiced"
        );
        Ok(created)
    }
}
