//! Domain models for invoice-sync.

mod accounting;
mod payment;
mod tax_rule;

pub use accounting::{
    AccountingInvoice, CreatedInvoice, Delegate, InvoiceClient, InvoicePayment, Issuer,
    PaymentStatus, Product,
};
pub use payment::{
    Address, ChargeStatus, Customer, LineItem, LineItemPrice, LineList, Payment, SourceInvoice,
    TaxId, INVOICED_MARKER,
};
pub use tax_rule::{TaxCategory, TaxRule};
