//! Shared helpers for the integration tests.

#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value};

use tuxpay_core::auth::{MemoryStore, Session};
use tuxpay_core::{ApiClient, RecordingNotifier};

/// An unsigned token whose payload carries `exp` (epoch seconds).
pub fn token_expiring_at(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT","alg":"HS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({"exp": exp, "id": 1, "email": "admin@example.com"}).to_string());
    format!("{}.{}.signature", header, payload)
}

pub fn fresh_token() -> String {
    token_expiring_at(Utc::now().timestamp() + 3600)
}

pub fn expired_token() -> String {
    token_expiring_at(Utc::now().timestamp() - 3600)
}

/// A client for `base_url` with in-memory slots and a recording notifier.
/// The returned stores share their slots with the session.
pub struct Harness {
    pub client: ApiClient,
    pub notifier: RecordingNotifier,
    pub durable: MemoryStore,
    pub ephemeral: MemoryStore,
}

impl Harness {
    pub fn new(base_url: &str) -> Self {
        let durable = MemoryStore::new();
        let ephemeral = MemoryStore::new();
        let session = Session::new(durable.clone(), ephemeral.clone()).shared();
        let notifier = RecordingNotifier::new();
        let client = ApiClient::new(base_url, session)
            .unwrap()
            .with_notifier(notifier.clone());
        Self {
            client,
            notifier,
            durable,
            ephemeral,
        }
    }

    /// Same as `new`, with `token` already stored in the durable slot.
    pub async fn with_token(base_url: &str, token: String) -> Self {
        let harness = Self::new(base_url);
        harness
            .client
            .session()
            .write()
            .await
            .set_token(token, true)
            .unwrap();
        harness
    }
}

pub fn invoice_json(id: i64) -> Value {
    json!({
        "id": id,
        "uuid": "0b6f4f0e-8d0b-4a55-9a57-1b3f0bcb2d2e",
        "name": "",
        "currency": "USD",
        "amount_cents": 250010,
        "creation_date": 1700000000.5,
        "expiry_date": 1700086400.5,
        "payment_date": null,
        "status": "pending",
        "token": "eyJpZCI6NTN9.c2ln"
    })
}

pub fn payment_json(id: i64) -> Value {
    json!({
        "id": id,
        "uuid": "5e0b3c36-7b5b-4b0e-9d1f-3a0f0c2a4e11",
        "invoice_id": 53,
        "symbol": "BTC",
        "status": "pending",
        "address": "bc1qexampleaddress",
        "amount_sats": 100000,
        "amount_coin": 0.001,
        "paid_amount_sats": 0,
        "invoice": invoice_json(53)
    })
}
