//! Builds the accounting invoice for a processor charge.
//!
//! Pure and deterministic: the same charge, source invoice, tax table and
//! company profile always produce the same payload.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;

use crate::config::{CompanyProfile, Identity};
use crate::error::SyncError;
use crate::models::{
    AccountingInvoice, Delegate, InvoiceClient, InvoicePayment, Issuer, LineItem, Payment,
    Product, SourceInvoice, TaxCategory, TaxRule,
};
use crate::services::TaxRuleTable;

pub const EXEMPT_MENTION: &str =
    "Servicii neimpozabile in Romania conform articolului 133 alineatul 2, litera G din Codul Fiscal.";
pub const REVERSE_CHARGE_MENTION: &str =
    "Taxarea inversă, conform prevederilor art. 331 din Codul Fiscal.";

const INVOICE_LANGUAGE: &str = "RO";
const MEASURING_UNIT: &str = "buc";
const PAYMENT_TYPE: &str = "Card";
const MINOR_UNITS: i64 = 100;

pub fn build_invoice(
    payment: &Payment,
    source: &SourceInvoice,
    tax_rules: &TaxRuleTable,
    company: &CompanyProfile,
) -> Result<AccountingInvoice, SyncError> {
    // Issued on the payment date, not the source invoice date.
    let issue_date = payment_date(payment)?;
    let address = source.address();
    let country = address.country.clone().unwrap_or_default();

    let client = InvoiceClient {
        name: title_case(source.customer_name.as_deref().unwrap_or_default().trim()),
        vat_code: source.eu_vat_code().map(str::to_string),
        code: source.customer.clone().unwrap_or_default(),
        address: format!(
            "{} {}",
            address.line1.as_deref().unwrap_or_default(),
            address.line2.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string(),
        is_tax_payer: false,
        city: address.city.unwrap_or_default(),
        county: address.state.unwrap_or_default(),
        country: country.clone(),
        email: source.customer_email.clone().unwrap_or_default(),
        save_to_db: false,
    };

    let category = source.tax_category();
    let tax = tax_rules.resolve(category, &country)?;

    let mut mentions = company.mentions.clone();
    match category {
        TaxCategory::Exempt => append_mention(&mut mentions, EXEMPT_MENTION),
        TaxCategory::Reverse => append_mention(&mut mentions, REVERSE_CHARGE_MENTION),
        TaxCategory::None => {}
    }

    if !source.lines.is_complete() {
        return Err(SyncError::malformed(
            &payment.id,
            format!(
                "invoice {} has {} of {} line items",
                source.id,
                source.lines.data.len(),
                source
                    .lines
                    .total_count
                    .map_or_else(|| "more".to_string(), |total| total.to_string())
            ),
        ));
    }

    let products = source
        .lines
        .data
        .iter()
        .map(|line| build_product(payment, line, tax))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AccountingInvoice {
        company_vat_code: company.vat_code.clone(),
        client,
        issue_date,
        due_date: issue_date,
        series_name: company.series.clone(),
        currency: source.currency.to_uppercase(),
        language: INVOICE_LANGUAGE.to_string(),
        mentions,
        aviz: format!(
            "STRIPE Invoice {}",
            source.number.as_deref().unwrap_or(&source.id)
        ),
        issuer: company.issuer.as_ref().map(|Identity { name, id }| Issuer {
            issuer_name: name.clone(),
            issuer_cnp: id.clone(),
        }),
        delegate: company.delegate.as_ref().map(|Identity { name, id }| Delegate {
            delegate_name: name.clone(),
            delegate_identity_card: id.clone(),
        }),
        products,
        payment: InvoicePayment {
            value: to_major_units(Decimal::from(payment.amount)),
            kind: PAYMENT_TYPE.to_string(),
            is_cash: false,
        },
    })
}

fn build_product(payment: &Payment, line: &LineItem, tax: &TaxRule) -> Result<Product, SyncError> {
    let quantity = line
        .quantity
        .ok_or_else(|| SyncError::malformed(&payment.id, "invoice line without quantity"))?;
    let unit_amount = line.unit_amount_excluding_tax.ok_or_else(|| {
        SyncError::malformed(&payment.id, "invoice line without unit amount excluding tax")
    })?;

    Ok(Product {
        name: line.description.clone().unwrap_or_default(),
        code: line
            .price
            .as_ref()
            .map(|price| price.id.clone())
            .unwrap_or_default(),
        is_discount: false,
        measuring_unit_name: MEASURING_UNIT.to_string(),
        currency: line.currency.to_uppercase(),
        quantity,
        price: to_major_units(unit_amount),
        is_tax_included: false,
        tax_name: tax.name.clone(),
        tax_percentage: tax.percentage,
        is_service: true,
        save_to_db: false,
    })
}

fn payment_date(payment: &Payment) -> Result<NaiveDate, SyncError> {
    DateTime::from_timestamp(payment.created, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| {
            SyncError::malformed(
                &payment.id,
                format!("creation timestamp {} out of range", payment.created),
            )
        })
}

/// Minor to major units, keeping fractional cents.
pub fn to_major_units(minor: Decimal) -> Decimal {
    minor / Decimal::from(MINOR_UNITS)
}

fn append_mention(mentions: &mut String, notice: &str) {
    mentions.push_str("\n\n");
    mentions.push_str(notice);
}

/// Upper-case the first letter of every whitespace-separated word, leaving
/// the rest of each word untouched.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut word_start = true;
    for c in value.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        word_start = c.is_whitespace();
    }
    out
}
