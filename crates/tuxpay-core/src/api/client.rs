//! API client for the TuxPay server.
//!
//! Every request goes through the same pipeline: the bearer token is
//! attached while the session is authenticated, failures are mapped to one
//! user notification, and server warnings on successful responses are
//! surfaced as informational notifications.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::body::{ResponseBody, ResponseKind};
use super::ApiError;
use crate::auth::SharedSession;
use crate::models::{
    CoinsResponse, Dashboard, Invoice, InvoiceCreation, InvoiceLookup, Payment, PaymentCreated,
    PaymentCreation, PublicInvoice,
};
use crate::notify::{LogNotifier, Notification, Notifier, SHORT_DURATION};

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of every server endpoint
const API_PREFIX: &str = "/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size the server uses when none is given
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    email: &'a str,
    password: &'a str,
    remember: bool,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct PaymentEnvelope {
    payment: Payment,
}

#[derive(Debug, Deserialize)]
struct InvoiceEnvelope {
    invoice: Invoice,
}

#[derive(Debug, Serialize)]
struct PayInvoiceRequest<'a> {
    token: &'a str,
    payment_coin: &'a str,
}

/// API client for a TuxPay server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SharedSession,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:8000`).
    /// Notifications go to the log until `with_notifier` is used.
    pub fn new(base_url: impl Into<String>, session: SharedSession) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Route notifications to `notifier` instead of the log.
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Create a client for another session, sharing the connection pool.
    pub fn with_session(&self, session: SharedSession) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            session,
            notifier: self.notifier.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    // ===== Pipeline =====

    /// Outbound stage: attach the bearer token while the session is valid.
    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let session = self.session.read().await;
        match session.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request through the pipeline, returning the raw body of a
    /// successful response.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
        kind: ResponseKind,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url(path);
        let builder = build(self.client.request(method.clone(), &url));
        let request = self
            .authorize(builder)
            .await
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        debug!(method = %method, url = %url, "Sending request");
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "No response from server");
                return Err(self.fail(ApiError::NoResponse(e)));
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) if status.is_success() => {
                warn!(url = %url, error = %e, "Response body interrupted");
                return Err(self.fail(ApiError::NoResponse(e)));
            }
            // The status already tells us what went wrong
            Err(_) => Vec::new(),
        };

        if status.is_success() {
            debug!(url = %url, status = %status, bytes = bytes.len(), "Response received");
            return Ok(bytes);
        }

        let body = ResponseBody::classify(kind, &bytes);
        warn!(
            url = %url,
            status = %status,
            body = %ApiError::truncate_body(&String::from_utf8_lossy(&bytes)),
            "Request failed"
        );
        let error = self.error_for(status, &body).await;
        Err(self.fail(error))
    }

    /// Error stage: decide the error, clearing the session on an expired 401.
    async fn error_for(&self, status: StatusCode, body: &ResponseBody) -> ApiError {
        if status != StatusCode::UNAUTHORIZED {
            return ApiError::from_status(status, body);
        }

        let mut session = self.session.write().await;
        if !session.is_authenticated() {
            return ApiError::Unauthorized;
        }
        if let Err(e) = session.clear_token() {
            warn!(error = %e, "Failed to clear expired session");
        }
        ApiError::SessionExpired
    }

    /// Emit the error's notification and hand the error back.
    fn fail(&self, error: ApiError) -> ApiError {
        if let Some(notification) = error.notification() {
            self.notify(notification);
        }
        error
    }

    /// Success stage: surface warnings, then deserialize.
    fn decode<T: DeserializeOwned>(&self, path: &str, bytes: &[u8]) -> Result<T, ApiError> {
        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(bytes)
                .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))?
        };

        for warning in ResponseBody::Json(value.clone()).warnings() {
            self.notify(Notification::info(warning, SHORT_DURATION));
        }

        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let bytes = self
            .execute(Method::GET, path, |b| b.query(query), ResponseKind::Json)
            .await?;
        self.decode(path, &bytes)
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let bytes = self
            .execute(method, path, |b| b.json(body), ResponseKind::Json)
            .await?;
        self.decode(path, &bytes)
    }

    // ===== Authentication =====

    /// Log in with email and password. On success the token is stored in the
    /// session, in the durable slot when `remember` is set.
    ///
    /// The server issues a 14 day token when `remember` is set and a 5 hour
    /// one otherwise.
    pub async fn authenticate(&self, email: &str, password: &str, remember: bool) -> Result<String, ApiError> {
        let request = AuthRequest {
            email,
            password,
            remember,
        };
        let auth: AuthResponse = self.send_json(Method::POST, "/authenticate", &request).await?;

        self.session
            .write()
            .await
            .set_token(auth.token.clone(), remember)
            .map_err(ApiError::Storage)?;
        debug!(email, remember, "Authenticated");
        Ok(auth.token)
    }

    /// Drop the session token locally. The server keeps no session state.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.write().await.clear_token().map_err(ApiError::Storage)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    // ===== Admin endpoints =====

    /// Invoice activity summary for the last 30 days
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        self.get("/admin/dashboard", &[]).await
    }

    /// List invoices, newest first.
    ///
    /// `page` counts pages of `limit` invoices: the server skips
    /// `page * limit` rows. Payments are paged by row instead.
    pub async fn invoices(&self, limit: u32, page: u32) -> Result<Vec<Invoice>, ApiError> {
        self.get(
            "/admin/invoice",
            &[("limit", limit.to_string()), ("offset", page.to_string())],
        )
        .await
    }

    /// Fetch one invoice with all of its payments
    pub async fn invoice(&self, invoice_id: i64) -> Result<InvoiceLookup, ApiError> {
        self.get(&format!("/admin/invoice/{}", invoice_id), &[]).await
    }

    pub async fn create_invoice(&self, creation: &InvoiceCreation) -> Result<Invoice, ApiError> {
        let envelope: InvoiceEnvelope = self.send_json(Method::POST, "/admin/invoice", creation).await?;
        Ok(envelope.invoice)
    }

    /// List payments, newest first, skipping `offset` rows
    pub async fn payments(&self, limit: u32, offset: u32) -> Result<Vec<Payment>, ApiError> {
        self.get(
            "/admin/payments",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    pub async fn payment(&self, payment_id: i64) -> Result<Payment, ApiError> {
        let envelope: PaymentEnvelope = self.get(&format!("/admin/payment/{}", payment_id), &[]).await?;
        Ok(envelope.payment)
    }

    /// Create an invoice and its payment address in one call
    pub async fn create_payment(&self, creation: &PaymentCreation) -> Result<PaymentCreated, ApiError> {
        self.send_json(Method::POST, "/admin/payment", creation).await
    }

    /// Download any invoice as a PDF by id. Needs an admin session.
    pub async fn download_invoice_by_id(&self, invoice_id: i64) -> Result<Vec<u8>, ApiError> {
        let query = [("invoice_id", invoice_id.to_string())];
        self.execute(Method::GET, "/invoice/download", |b| b.query(&query), ResponseKind::Binary)
            .await
    }

    // ===== Public endpoints =====

    /// Enabled coins and fiat exchange rates
    pub async fn coins(&self) -> Result<CoinsResponse, ApiError> {
        self.get("/coins", &[]).await
    }

    /// Look up an invoice by its short customer token
    pub async fn invoice_by_token(&self, token: &str) -> Result<PublicInvoice, ApiError> {
        self.get("/invoice", &[("token", token.to_string())]).await
    }

    /// Open a new payment address for an invoice in the chosen coin
    pub async fn pay_invoice(&self, token: &str, coin: &str) -> Result<Payment, ApiError> {
        let request = PayInvoiceRequest {
            token,
            payment_coin: coin,
        };
        let envelope: PaymentEnvelope = self.send_json(Method::PUT, "/invoice", &request).await?;
        Ok(envelope.payment)
    }

    pub async fn payment_by_uuid(&self, uuid: &str) -> Result<Payment, ApiError> {
        let envelope: PaymentEnvelope = self.get("/payment", &[("uuid", uuid.to_string())]).await?;
        Ok(envelope.payment)
    }

    /// Download an invoice as a PDF, by customer token.
    pub async fn download_invoice(&self, token: &str) -> Result<Vec<u8>, ApiError> {
        let query = [("token", token.to_string())];
        self.execute(Method::GET, "/invoice/download", |b| b.query(&query), ResponseKind::Binary)
            .await
    }
}
