//! Tax rule model for invoice-sync.

use serde::{Deserialize, Serialize};

/// Tax treatment of a customer, as recorded on the source invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    /// Standard treatment, rated by the customer's country.
    #[default]
    None,
    /// Outside the scope of the tax regime.
    Exempt,
    /// Reverse charge, the buyer self-assesses the tax.
    Reverse,
}

/// Display name and percentage applied to every product line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRule {
    pub name: String,
    pub percentage: u32,
}
