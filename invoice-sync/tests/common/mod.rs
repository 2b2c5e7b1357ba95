#![allow(dead_code)]

use invoice_sync::config::{CompanyProfile, SmartbillConfig, StripeConfig, SyncConfig};
use invoice_sync::services::{SmartbillClient, StripeClient};
use secrecy::Secret;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const COMPANY_VAT_CODE: &str = "RO11111111";
pub const SERIES: &str = "SMURF";
pub const STRIPE_KEY: &str = "sk_test_123";
pub const SMARTBILL_KEY: &str = "office@example.ro:token";

pub const VAT_RATES: &str = r#"{
    "exempt": {"name": "SFDD", "percentage": 0},
    "reverse": {"name": "Taxare inversa", "percentage": 0},
    "RO": {"name": "Normala", "percentage": 19},
    "DE": {"name": "TVA DE", "percentage": 15}
}"#;

/// Mock Stripe and SmartBill servers plus a config pointing at them.
pub struct TestEnv {
    pub stripe: MockServer,
    pub smartbill: MockServer,
    pub config: SyncConfig,
    _vat_dir: TempDir,
}

impl TestEnv {
    pub async fn spawn() -> Self {
        let stripe = MockServer::start().await;
        let smartbill = MockServer::start().await;

        let vat_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let vat_rates_path = vat_dir.path().join("vat_rates.json");
        std::fs::write(&vat_rates_path, VAT_RATES).expect("Failed to write VAT rates");

        let config = SyncConfig {
            service_name: "invoice-sync-test".to_string(),
            log_level: "debug".to_string(),
            otlp_endpoint: None,
            vat_rates_path,
            stripe: StripeConfig {
                secret_key: Secret::new(STRIPE_KEY.to_string()),
                api_base_url: stripe.uri(),
            },
            smartbill: SmartbillConfig {
                api_key: Secret::new(SMARTBILL_KEY.to_string()),
                api_base_url: smartbill.uri(),
            },
            company: CompanyProfile {
                vat_code: COMPANY_VAT_CODE.to_string(),
                series: SERIES.to_string(),
                mentions: String::new(),
                issuer: None,
                delegate: None,
            },
        };

        Self {
            stripe,
            smartbill,
            config,
            _vat_dir: vat_dir,
        }
    }

    pub fn vat_rates_path(&self) -> PathBuf {
        self.config.vat_rates_path.clone()
    }

    pub fn stripe_client(&self) -> StripeClient {
        StripeClient::new(self.config.stripe.clone()).expect("Failed to build Stripe client")
    }

    pub fn smartbill_client(&self) -> SmartbillClient {
        SmartbillClient::new(self.config.smartbill.clone())
            .expect("Failed to build SmartBill client")
    }

    pub async fn stripe_requests(&self) -> Vec<Request> {
        self.stripe.received_requests().await.unwrap_or_default()
    }

    pub async fn smartbill_requests(&self) -> Vec<Request> {
        self.smartbill.received_requests().await.unwrap_or_default()
    }

    /// Serve a charge, its invoice and the marker update for that charge.
    pub async fn mount_payment(&self, charge: Value, invoice: Value) {
        let charge_id = charge["id"].as_str().unwrap_or_default().to_string();
        let invoice_id = invoice["id"].as_str().unwrap_or_default().to_string();

        Mock::given(method("GET"))
            .and(path(format!("/v1/charges/{}", charge_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(charge.clone()))
            .mount(&self.stripe)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/invoices/{}", invoice_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(invoice))
            .mount(&self.stripe)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/charges/{}", charge_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(charge))
            .mount(&self.stripe)
            .await;
    }

    pub async fn mount_customer(&self) {
        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_J"))
            .respond_with(ResponseTemplate::new(200).set_body_json(customer()))
            .mount(&self.stripe)
            .await;
    }
}

/// Stripe list envelope.
pub fn page(data: Vec<Value>, has_more: bool) -> Value {
    json!({
        "object": "list",
        "url": "/v1/charges",
        "has_more": has_more,
        "data": data,
    })
}

pub fn charge(id: &str, created: i64, status: &str, marker: Option<&str>) -> Value {
    let metadata = match marker {
        Some(value) => json!({ "smartbill_invoice": value }),
        None => json!({}),
    };
    json!({
        "id": id,
        "object": "charge",
        "amount": 2300,
        "currency": "eur",
        "created": created,
        "customer": "cus_J",
        "invoice": format!("in_{}", id),
        "metadata": metadata,
        "status": status,
    })
}

/// The five charges the listing returns: three eligible, one already
/// invoiced, one failed.
pub fn listed_charges() -> Vec<Value> {
    vec![
        charge("ch_3", 1659100000, "succeeded", None),
        charge("ch_4", 1659500000, "succeeded", None),
        charge("ch_5", 1659300000, "succeeded", Some("SMURF0001")),
        charge("ch_6", 1659400000, "failed", None),
        charge("ch_7", 1659200000, "succeeded", None),
    ]
}

/// Source invoice with 2 x 3.50 + 1 x 16.00 EUR.
pub fn invoice(id: &str, country: &str, tax_exempt: &str) -> Value {
    json!({
        "id": id,
        "object": "invoice",
        "number": format!("XX-{}", id),
        "currency": "eur",
        "customer": "cus_J",
        "customer_name": "johnny mnemonic",
        "customer_email": "jhonny@mnemonic.com",
        "customer_address": {
            "city": "Iasi",
            "country": country,
            "line1": "Strada Palat 1",
            "line2": "",
            "postal_code": "700032",
            "state": "Iasi",
        },
        "customer_tax_exempt": tax_exempt,
        "customer_tax_ids": [],
        "lines": {
            "object": "list",
            "data": [
                {
                    "id": "il_1",
                    "quantity": 2,
                    "unit_amount_excluding_tax": "350",
                    "currency": "eur",
                    "description": "Basic plan",
                    "price": { "id": "price_basic" },
                },
                {
                    "id": "il_2",
                    "quantity": 1,
                    "unit_amount_excluding_tax": "1600",
                    "currency": "eur",
                    "description": "Elite plan",
                    "price": { "id": "price_elite" },
                },
            ],
        },
    })
}

pub fn line(id: &str, quantity: i64, unit_amount: &str, description: &str) -> Value {
    json!({
        "id": id,
        "object": "line_item",
        "quantity": quantity,
        "unit_amount_excluding_tax": unit_amount,
        "currency": "eur",
        "description": description,
    })
}

/// Cut the embedded line list down to its first item, the way Stripe embeds
/// only the first page of a long invoice.
pub fn truncate_lines(mut invoice: Value, total_count: u64) -> Value {
    let first = invoice["lines"]["data"][0].clone();
    invoice["lines"] = json!({
        "object": "list",
        "data": [first],
        "has_more": true,
        "total_count": total_count,
    });
    invoice
}

pub fn customer() -> Value {
    json!({
        "id": "cus_J",
        "object": "customer",
        "name": "John Doe",
        "email": "john@example.com",
        "address": {
            "city": "London",
            "country": "GB",
            "line1": "43 Burnham Way",
            "line2": "",
            "postal_code": "",
            "state": "",
        },
    })
}

pub fn created_invoice(number: &str) -> Value {
    json!({
        "errorText": "",
        "message": "",
        "number": number,
        "series": SERIES,
        "url": "",
    })
}

pub fn payment_status(total: f64, paid: f64) -> Value {
    json!({
        "errorText": "",
        "invoiceTotalAmount": total,
        "paidAmount": paid,
        "unpaidAmount": total - paid,
        "paid": total == paid,
    })
}

pub fn body_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("Request body is not JSON")
}

pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}
