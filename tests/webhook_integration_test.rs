//! Webhook 集成测试

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bee_booking::{
    config::AppConfig,
    gateway::{Delivery, MessageGateway, RecordingGateway, WhatsappCloudGateway},
    server::{create_router, AppState},
};
use tokio::sync::Mutex;
use tower::ServiceExt;

fn config(operator: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.agenda.operator_identity = operator.map(str::to_string);
    config.whatsapp.verify_token = "secret".to_string();
    config
}

fn app(operator: Option<&str>) -> (Router, Arc<AppState>, Arc<RecordingGateway>) {
    let gateway = Arc::new(RecordingGateway::new());
    let state = Arc::new(AppState::in_memory(&config(operator), gateway.clone()));
    (create_router(Arc::clone(&state)), state, gateway)
}

fn cloud_message(from: &str, body: &str) -> Request<Body> {
    let payload = serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA",
            "changes": [{
                "field": "messages",
                "value": {
                    "contacts": [{ "wa_id": from, "profile": { "name": "Ana" } }],
                    "messages": [{ "from": from, "id": "wamid.1", "type": "text", "text": { "body": body } }]
                }
            }]
        }]
    });
    Request::post("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_verify_handshake() {
    let (app, _, _) = app(None);

    let ok = app
        .clone()
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=secret&hub.challenge=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(body_string(ok).await, "42");

    let rejected = app
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cloud_booking_flow_and_agenda() {
    let (app, state, gateway) = app(Some("15559999"));

    for body in ["book", "2025-01-01", "10:00", "Premium"] {
        let resp = app.clone().oneshot(cloud_message("15550001", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let sent = gateway.sent().await;
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|(to, _)| to == "15550001"));
    assert!(sent[3].1.contains("Booking confirmed"));
    assert_eq!(state.router.ledger().len().await, 1);

    let resp = app
        .oneshot(Request::get("/agenda?date=2025-01-01").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "Agenda for 2025-01-01 sent");

    let sent = gateway.sent().await;
    let (to, agenda) = sent.last().unwrap();
    assert_eq!(to, "15559999");
    assert_eq!(
        agenda,
        "📅 Agenda for 2025-01-01:\n1. 2025-01-01 at 10:00 — Premium (Ana)"
    );
}

#[tokio::test]
async fn test_empty_body_is_acknowledged_without_reply() {
    let (app, state, gateway) = app(None);
    let resp = app.oneshot(cloud_message("15550001", "   ")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(gateway.sent().await.is_empty());
    assert_eq!(state.router.sessions().len().await, 0);
}

#[tokio::test]
async fn test_malformed_cloud_payload_is_acknowledged() {
    let (app, state, gateway) = app(None);

    let wrong_type = serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{ "changes": [{ "value": { "messages": [
            { "from": "15550001", "type": "text", "text": { "body": 5 } }
        ] } }] }]
    });
    let requests = vec![
        Request::post("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(wrong_type.to_string()))
            .unwrap(),
        Request::post("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap(),
        Request::post("/webhook")
            .body(Body::from(r#"{"object":"whatsapp_business_account"}"#))
            .unwrap(),
    ];

    for req in requests {
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert!(gateway.sent().await.is_empty());
    assert_eq!(state.router.sessions().len().await, 0);
}

#[tokio::test]
async fn test_twilio_without_form_content_type_gets_empty_twiml() {
    let (app, state, _) = app(None);
    let req = Request::post("/webhook/twilio")
        .body(Body::from("From=whatsapp%3A%2B15550001&Body=book"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/xml");
    assert_eq!(
        body_string(resp).await,
        r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#
    );
    assert_eq!(state.router.sessions().len().await, 0);
}

#[tokio::test]
async fn test_delivery_failure_still_acknowledged() {
    let gateway: Arc<dyn MessageGateway> = Arc::new(RecordingGateway::failing("boom"));
    let state = Arc::new(AppState::in_memory(&config(None), gateway));
    let app = create_router(Arc::clone(&state));

    let resp = app.oneshot(cloud_message("15550001", "book")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!state.router.sessions().get("15550001").await.is_idle());
}

#[tokio::test]
async fn test_agenda_without_operator_fails() {
    let (app, _, gateway) = app(None);
    let resp = app
        .oneshot(Request::get("/agenda").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(resp).await.contains("Operator identity is not configured"));
    assert!(gateway.sent().await.is_empty());
}

#[tokio::test]
async fn test_twilio_form_replies_with_twiml() {
    let (app, _, gateway) = app(None);
    let req = Request::post("/webhook/twilio")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("From=whatsapp%3A%2B15550001&ProfileName=Ana&Body=book"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/xml");
    let xml = body_string(resp).await;
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>"#));
    assert!(xml.contains("Which date"));
    assert!(gateway.sent().await.is_empty());

    let req = Request::post("/webhook/twilio")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("From=whatsapp%3A%2B15550001&Body="))
        .unwrap();
    let xml = body_string(app.oneshot(req).await.unwrap()).await;
    assert!(xml.ends_with("<Response></Response>"));
}

#[tokio::test]
async fn test_cloud_gateway_posts_to_messages_api() {
    use axum::{extract::State, routing::post, Json};

    type Seen = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    async fn capture(
        State(seen): State<Seen>,
        headers: axum::http::HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.lock().await.push((auth, body));
        StatusCode::OK
    }

    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let mock = Router::new()
        .route("/v18.0/1234/messages", post(capture))
        .with_state(Arc::clone(&seen));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, mock).await.unwrap();
    });

    let mut section = AppConfig::default().whatsapp;
    section.access_token = "token".into();
    section.phone_number_id = "1234".into();
    section.api_base = format!("http://{}/v18.0", addr);
    let gateway = WhatsappCloudGateway::new(&section).unwrap();

    assert_eq!(gateway.send("+15550001", "hello").await, Delivery::Delivered);

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("Bearer token"));
    assert_eq!(seen[0].1["to"], "15550001");
    assert_eq!(seen[0].1["text"]["body"], "hello");
    assert_eq!(seen[0].1["messaging_product"], "whatsapp");

    let mut bad = section.clone();
    bad.phone_number_id = "missing".into();
    let gateway = WhatsappCloudGateway::new(&bad).unwrap();
    assert!(matches!(gateway.send("1", "x").await, Delivery::Failed(_)));
}
