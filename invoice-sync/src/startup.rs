//! Application wiring.
//!
//! Loads the VAT table and builds both API clients before any payment is
//! touched, so configuration problems surface before the first request.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::services::{
    InvoiceGenerator, RunMode, RunSummary, SmartbillClient, StripeClient, TaxRuleTable,
};

pub struct Application {
    generator: InvoiceGenerator,
}

impl Application {
    pub fn build(config: SyncConfig) -> Result<Self, SyncError> {
        let tax_rules = TaxRuleTable::load(&config.vat_rates_path)?;

        let stripe = StripeClient::new(config.stripe.clone())?;
        let smartbill = SmartbillClient::new(config.smartbill.clone())?;

        Ok(Self {
            generator: InvoiceGenerator::new(
                Arc::new(stripe),
                Arc::new(smartbill),
                tax_rules,
                config.company,
            ),
        })
    }

    pub async fn run(&self, since: NaiveDate, mode: RunMode) -> Result<RunSummary, SyncError> {
        self.generator.run(since, mode).await
    }
}
