//! VAT rate lookup by customer country and tax category.

use crate::error::SyncError;
use crate::models::{TaxCategory, TaxRule};
use std::collections::HashMap;
use std::path::Path;

/// Issuing company's own country; its standard rate must always be known.
pub const HOME_COUNTRY: &str = "RO";

const EXEMPT_KEY: &str = "exempt";
const REVERSE_KEY: &str = "reverse";

/// Immutable table of tax rules, keyed by ISO country code plus the
/// `exempt` and `reverse` categories.
#[derive(Debug, Clone)]
pub struct TaxRuleTable {
    rules: HashMap<String, TaxRule>,
}

impl TaxRuleTable {
    pub fn new(rules: HashMap<String, TaxRule>) -> Result<Self, SyncError> {
        for key in [EXEMPT_KEY, REVERSE_KEY, HOME_COUNTRY] {
            if !rules.contains_key(key) {
                return Err(SyncError::Config(format!(
                    "VAT rates are not defined, '{}' entry is missing",
                    key
                )));
            }
        }

        Ok(Self { rules })
    }

    /// Read the table from a JSON object of `{"<KEY>": {"name", "percentage"}}`.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!(
                "{} could not be read ({}), check documentation and try again",
                path.display(),
                e
            ))
        })?;

        let rules: HashMap<String, TaxRule> = serde_json::from_str(&raw).map_err(|e| {
            SyncError::Config(format!("{} is not a valid VAT rate table: {}", path.display(), e))
        })?;

        let table = Self::new(rules)?;
        tracing::info!(path = %path.display(), entries = table.len(), "VAT rates loaded");
        Ok(table)
    }

    fn len(&self) -> usize {
        self.rules.len()
    }

    /// Resolve the rule for a customer. `country` only matters for
    /// [`TaxCategory::None`].
    pub fn resolve(&self, category: TaxCategory, country: &str) -> Result<&TaxRule, SyncError> {
        let key = match category {
            TaxCategory::Exempt => EXEMPT_KEY,
            TaxCategory::Reverse => REVERSE_KEY,
            TaxCategory::None => country,
        };

        self.rules.get(key).ok_or_else(|| SyncError::MissingTaxRule {
            country: country.to_string(),
        })
    }
}
