//! In-process stand-in for the handful of Stripe endpoints the adapter uses.
//!
//! Runs a real actix server on an ephemeral loopback port so requests go
//! through reqwest exactly as they would in production.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use url::Url;

/// Secret key the fake accepts as a bearer token.
pub const SECRET_KEY: &str = "sk_test_fake";

type FormPairs = Vec<(String, String)>;

/// One `POST /v1/customers` call as received.
#[derive(Debug, Clone)]
pub struct CustomerCall {
    pub idempotency_key: Option<String>,
    pub form: FormPairs,
}

impl CustomerCall {
    pub fn field(&self, name: &str) -> Option<&str> {
        field(&self.form, name)
    }
}

pub fn field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
    form.iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[derive(Default)]
struct Ledger {
    customer_calls: Vec<CustomerCall>,
    checkout_forms: Vec<FormPairs>,
    subscriptions: HashMap<String, Value>,
    decline_checkouts: bool,
}

#[derive(Clone, Default)]
struct SharedLedger(Arc<Mutex<Ledger>>);

impl SharedLedger {
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct FakeStripe {
    addr: SocketAddr,
    handle: ServerHandle,
    ledger: SharedLedger,
}

impl FakeStripe {
    /// Bind to `127.0.0.1:0` and serve on the current actix runtime.
    pub fn start() -> io::Result<Self> {
        let ledger = SharedLedger::default();
        let data = web::Data::new(ledger.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/v1/customers", web::post().to(create_customer))
                .route("/v1/checkout/sessions", web::post().to(create_checkout_session))
                .route("/v1/subscriptions/{id}", web::get().to(fetch_subscription))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))?;
        let addr = server
            .addrs()
            .first()
            .copied()
            .ok_or_else(|| io::Error::other("fake Stripe did not bind"))?;

        let running = server.run();
        let handle = running.handle();
        actix_web::rt::spawn(running);
        Ok(Self {
            addr,
            handle,
            ledger,
        })
    }

    pub fn api_base(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("loopback URL")
    }

    pub fn customer_calls(&self) -> Vec<CustomerCall> {
        self.ledger.lock().customer_calls.clone()
    }

    pub fn checkout_forms(&self) -> Vec<FormPairs> {
        self.ledger.lock().checkout_forms.clone()
    }

    /// Make `GET /v1/subscriptions/{id}` return `subscription`.
    pub fn put_subscription(&self, subscription: Value) {
        let id = subscription["id"]
            .as_str()
            .expect("subscription id")
            .to_owned();
        self.ledger.lock().subscriptions.insert(id, subscription);
    }

    /// Answer every later checkout with a card error.
    pub fn decline_checkouts(&self) {
        self.ledger.lock().decline_checkouts = true;
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn stripe_error(status: StatusCode, kind: &str, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": { "type": kind, "message": message } }))
}

fn authorised(request: &HttpRequest) -> bool {
    request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {SECRET_KEY}").as_str())
}

async fn create_customer(
    ledger: web::Data<SharedLedger>,
    request: HttpRequest,
    form: web::Form<FormPairs>,
) -> HttpResponse {
    if !authorised(&request) {
        return stripe_error(
            StatusCode::UNAUTHORIZED,
            "invalid_request_error",
            "Invalid API Key provided",
        );
    }
    let idempotency_key = request
        .headers()
        .get("idempotency-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let mut ledger = ledger.lock();
    ledger.customer_calls.push(CustomerCall {
        idempotency_key: idempotency_key.clone(),
        form: form.into_inner(),
    });
    // Replays of a key resolve to the customer the first call created.
    let position = ledger
        .customer_calls
        .iter()
        .position(|call| idempotency_key.is_some() && call.idempotency_key == idempotency_key)
        .unwrap_or(ledger.customer_calls.len() - 1);
    HttpResponse::Ok().json(json!({ "id": format!("cus_{}", position + 1), "object": "customer" }))
}

async fn create_checkout_session(
    ledger: web::Data<SharedLedger>,
    request: HttpRequest,
    form: web::Form<FormPairs>,
) -> HttpResponse {
    if !authorised(&request) {
        return stripe_error(
            StatusCode::UNAUTHORIZED,
            "invalid_request_error",
            "Invalid API Key provided",
        );
    }
    let mut ledger = ledger.lock();
    if ledger.decline_checkouts {
        return stripe_error(
            StatusCode::PAYMENT_REQUIRED,
            "card_error",
            "Your card was declined.",
        );
    }
    ledger.checkout_forms.push(form.into_inner());
    let id = format!("cs_test_{}", ledger.checkout_forms.len());
    HttpResponse::Ok().json(json!({
        "id": id,
        "object": "checkout.session",
        "url": format!("https://checkout.stripe.test/c/pay/{id}"),
    }))
}

async fn fetch_subscription(
    ledger: web::Data<SharedLedger>,
    request: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    if !authorised(&request) {
        return stripe_error(
            StatusCode::UNAUTHORIZED,
            "invalid_request_error",
            "Invalid API Key provided",
        );
    }
    let id = path.into_inner();
    match ledger.lock().subscriptions.get(&id) {
        Some(subscription) => HttpResponse::Ok().json(subscription),
        None => stripe_error(
            StatusCode::NOT_FOUND,
            "invalid_request_error",
            &format!("No such subscription: '{id}'"),
        ),
    }
}
