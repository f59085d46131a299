use super::*;
use crate::identity::{MemoryStore, VerificationEngine, VerificationStrategy};
use crate::notify::Notifier;
use crate::payment::{OrderRequest, PaymentGateway, PaymentIntegrityChecker};
use crate::test_support::{FailingNotifier, RecordingNotifier, fast_hasher};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use axum::http::{HeaderMap, header::LOCATION};
use secrecy::SecretString;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const FRONTEND: &str = "http://localhost:3000";
const KEY_SECRET: &str = "rzp_test_secret";

#[derive(Default)]
struct StubGateway {
    orders: Mutex<Vec<OrderRequest>>,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(&self, order: &OrderRequest) -> anyhow::Result<Value> {
        self.orders.lock().expect("orders lock").push(order.clone());
        Ok(json!({
            "id": "order_test_1",
            "entity": "order",
            "amount": order.amount,
            "currency": order.currency,
            "receipt": order.receipt,
            "status": "created",
        }))
    }
}

struct DownGateway;

#[async_trait]
impl PaymentGateway for DownGateway {
    async fn create_order(&self, _order: &OrderRequest) -> anyhow::Result<Value> {
        Err(anyhow!("gateway timeout"))
    }
}

struct Harness {
    app: Router,
    notifier: Arc<RecordingNotifier>,
    gateway: Arc<StubGateway>,
}

fn build(
    strategy: VerificationStrategy,
    notifier: Arc<dyn Notifier>,
    gateway: Arc<dyn PaymentGateway>,
    environment: Environment,
) -> Router {
    let store = Arc::new(MemoryStore::new());
    let hasher = Arc::new(fast_hasher());
    let engine = VerificationEngine::new(
        strategy,
        store.clone(),
        store.clone(),
        hasher.clone(),
        notifier,
        FRONTEND.to_string(),
    );
    let state = AppState {
        auth: Arc::new(AuthState::new(store, hasher, engine)),
        payment: Arc::new(PaymentState::new(
            PaymentIntegrityChecker::new(SecretString::from(KEY_SECRET)),
            gateway,
        )),
        environment,
    };
    app(state)
}

fn harness(strategy: VerificationStrategy) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let gateway = Arc::new(StubGateway::default());
    let app = build(
        strategy,
        notifier.clone(),
        gateway.clone(),
        Environment::Development,
    );
    Harness {
        app,
        notifier,
        gateway,
    }
}

fn json_request(method: Method, uri: &str, body: &Value) -> Result<Request> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

fn get_request(uri: &str) -> Result<Request> {
    Ok(Request::builder().uri(uri).body(Body::empty())?)
}

async fn send(app: &Router, request: Request) -> Result<(StatusCode, HeaderMap, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Ok((status, headers, body))
}

fn signup_body(email: &str) -> Value {
    json!({
        "name": "Alice",
        "phone": "555-0100",
        "email": email,
        "password": "hunter22",
    })
}

fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

#[tokio::test]
async fn root_fallback_and_preflight() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);

    let (status, headers, body) = send(&h.app, get_request("/")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Welcome to the E-commerce API".to_string()));
    assert!(headers.contains_key(REQUEST_ID));

    let (status, _, body) = send(&h.app, get_request("/nope")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/auth/signup")
        .header("origin", "http://shop.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())?;
    let (status, headers, body) = send(&h.app, preflight).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );

    let plain = Request::builder()
        .method(Method::OPTIONS)
        .uri("/health")
        .body(Body::empty())?;
    let (status, _, _) = send(&h.app, plain).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn request_id_is_propagated() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);
    let request = Request::builder()
        .uri("/")
        .header(REQUEST_ID, "req-123")
        .body(Body::empty())?;
    let (_, headers, _) = send(&h.app, request).await?;
    assert_eq!(
        headers.get(REQUEST_ID).and_then(|value| value.to_str().ok()),
        Some("req-123")
    );
    Ok(())
}

#[tokio::test]
async fn health_reports_store() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);
    let (status, headers, body) = send(&h.app, get_request("/health")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "ok");
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert!(headers.contains_key("x-app"));
    Ok(())
}

#[tokio::test]
async fn link_lifecycle_signup_activate_login() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/signup", &signup_body("Alice@Example.com"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "User registered successfully. Check your email to activate your account.",
        })
    );

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/login", &login_body("alice@example.com", "hunter22"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please activate your account before logging in.");

    let (status, _, body) = send(
        &h.app,
        get_request("/auth/check-verification?email=alice@example.com")?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "isVerified": false }));

    let token = h.notifier.last_link_token().context("activation mailed")?;
    let (status, headers, _) =
        send(&h.app, get_request(&format!("/auth/activate/{token}"))?).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        headers.get(LOCATION).and_then(|value| value.to_str().ok()),
        Some("http://localhost:3000/login?activated=true")
    );

    let (status, _, body) =
        send(&h.app, get_request(&format!("/auth/activate/{token}"))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired activation token.");

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/login", &login_body("ALICE@example.com", "hunter22"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful!");
    assert_eq!(body["email"], "alice@example.com");

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/login", &login_body("alice@example.com", "wrong"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials.");

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/auth/resend-verification",
            &json!({ "email": "alice@example.com" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already verified.");
    Ok(())
}

#[tokio::test]
async fn signup_validation_and_duplicates() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/signup", &json!({ "email": "a@example.com" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required.");

    let (status, _, _) = send(
        &h.app,
        json_request(Method::POST, "/auth/signup", &signup_body("alice@example.com"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/signup", &signup_body(" ALICE@EXAMPLE.COM "))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered. Please log in.");
    assert_eq!(h.notifier.sent().len(), 1);
    Ok(())
}

#[tokio::test]
async fn otp_lifecycle() -> Result<()> {
    let h = harness(VerificationStrategy::NumericOtp);

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/signup", &signup_body("bob@example.com"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        "User registered successfully. Check your email for the verification code."
    );

    let (status, _, _) = send(
        &h.app,
        json_request(
            Method::POST,
            "/auth/resend-otp",
            &json!({ "email": "bob@example.com" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let code = h.notifier.last_otp().context("otp mailed")?;
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/auth/verify-otp",
            &json!({ "email": "bob@example.com", "otp": wrong }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid OTP");

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/auth/verify-otp",
            &json!({ "email": "bob@example.com", "otp": code }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email verified successfully.");

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/auth/verify-otp",
            &json!({ "email": "bob@example.com", "otp": code }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No OTP found. Please request a new one.");

    let (status, _, _) = send(
        &h.app,
        json_request(Method::POST, "/auth/login", &login_body("bob@example.com", "hunter22"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&h.app, get_request("/auth/activate/deadbeef")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_and_missing_emails() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/auth/resend-verification",
            &json!({ "email": "ghost@example.com" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found.");

    let (status, _, body) = send(
        &h.app,
        get_request("/auth/check-verification?email=ghost@example.com")?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User not found.");

    let (status, _, body) = send(&h.app, get_request("/auth/check-verification")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is required.");

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/auth/login", &login_body("ghost@example.com", "x"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User not found.");
    Ok(())
}

#[tokio::test]
async fn dispatch_failure_is_generic_in_production() -> Result<()> {
    let app = build(
        VerificationStrategy::LinkToken,
        Arc::new(FailingNotifier),
        Arc::new(StubGateway::default()),
        Environment::Production,
    );

    let (status, _, body) = send(
        &app,
        json_request(Method::POST, "/auth/signup", &signup_body("carol@example.com"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "message": error::DISPATCH_ERROR_MESSAGE })
    );

    // The account exists, so a second signup conflicts.
    let (status, _, _) = send(
        &app,
        json_request(Method::POST, "/auth/signup", &signup_body("carol@example.com"))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_order_converts_amount() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/razorpay/create-order", &json!({ "amount": 10.005 }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "order_test_1");
    assert_eq!(body["amount"], 1001);
    assert_eq!(body["currency"], "INR");

    let orders = h.gateway.orders.lock().expect("orders lock").clone();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].amount, 1001);
    assert!(orders[0].receipt.starts_with("order_rcptid_"));

    for amount in [json!(0), json!(-3), json!("abc"), Value::Null] {
        let (status, _, body) = send(
            &h.app,
            json_request(Method::POST, "/razorpay/create-order", &json!({ "amount": amount }))?,
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid amount");
    }
    Ok(())
}

#[tokio::test]
async fn create_order_gateway_failure() -> Result<()> {
    let app = build(
        VerificationStrategy::LinkToken,
        Arc::new(RecordingNotifier::default()),
        Arc::new(DownGateway),
        Environment::Production,
    );
    let (status, _, body) = send(
        &app,
        json_request(Method::POST, "/razorpay/create-order", &json!({ "amount": "499" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to create order");
    Ok(())
}

#[tokio::test]
async fn verify_payment_signature() -> Result<()> {
    let h = harness(VerificationStrategy::LinkToken);
    let signature = PaymentIntegrityChecker::new(SecretString::from(KEY_SECRET))
        .sign("order_1", "pay_1")
        .map_err(|err| anyhow!("{err}"))?;

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/razorpay/verify-payment",
            &json!({
                "razorpay_order_id": "order_1",
                "razorpay_payment_id": "pay_1",
                "razorpay_signature": signature,
            }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "Payment verified successfully" })
    );

    let mut tampered = signature.clone();
    let last = if tampered.ends_with('0') { "1" } else { "0" };
    tampered.replace_range(tampered.len() - 1.., last);
    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/razorpay/verify-payment",
            &json!({
                "razorpay_order_id": "order_1",
                "razorpay_payment_id": "pay_1",
                "razorpay_signature": tampered,
            }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Payment verification failed");

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/razorpay/verify-payment",
            &json!({ "razorpay_order_id": "order_1" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing payment details");
    Ok(())
}

#[test]
fn body_log_redacts_secrets() {
    let body = Bytes::from(r#"{"email":"a@example.com","password":"hunter22","otp":"123456"}"#);
    let logged = redacted_body(&body);
    assert!(logged.contains("a@example.com"));
    assert!(!logged.contains("hunter22"));
    assert!(!logged.contains("123456"));
    assert_eq!(redacted_body(&Bytes::new()), "{}");
    assert_eq!(redacted_body(&Bytes::from_static(b"not json")), "<8 bytes>");
}
