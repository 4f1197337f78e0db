//! Integration tests for the gateway client over real HTTP.
//!
//! Each test serves one canned HTTP/1.1 response from a local listener and drives
//! [`BraspagClient`] with the default [`HttpTransport`] against it.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use braspag_rest::{
    BraspagClient, BraspagError, ClientConfig, ErrorEnvelope, GatewayResponse,
    GetTransactionDataParams,
    config::GatewayHosts,
    observer::RequestObserver,
    request::RequestDescriptor,
    response::GatewayError,
    transport::HttpTransport,
};
use serde_json::json;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

const TRANSACTION_ID: &str = "782a56e2-2dae-11e2-b3ee-080027d29772";

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    )
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.expect("read request");
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&received).into_owned()
}

/// Serves `response` to the first connection and returns the request head it received.
async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let head = read_head(&mut socket).await;
        socket.write_all(response.as_bytes()).await.expect("write response");
        let _ = socket.shutdown().await;
        head
    });

    (base, handle)
}

/// Accepts a connection and never answers.
async fn serve_silence() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let _ = read_head(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    (base, handle)
}

fn client(base: &str, timeout_secs: u64, transport: HttpTransport) -> BraspagClient {
    let config = ClientConfig { timeout_secs, ..ClientConfig::new("merchant-id", "merchant-key") };
    BraspagClient::with_hosts(
        config,
        GatewayHosts { query_url: base, transaction_url: base },
        transport,
    )
    .expect("valid client")
}

fn default_client(base: &str) -> BraspagClient {
    client(base, 10, HttpTransport::new().expect("http transport"))
}

#[derive(Debug, Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RequestObserver for RecordingObserver {
    fn record_request(&self, request: &RequestDescriptor) {
        self.events.lock().unwrap().push(format!("request {}", request.method));
    }

    fn record_response(&self, _request: &RequestDescriptor, status: u16, _body: &[u8]) {
        self.events.lock().unwrap().push(format!("response {status}"));
    }

    fn record_failure(&self, _request: &RequestDescriptor, error: &BraspagError) {
        self.events.lock().unwrap().push(format!("failure timeout={}", error.is_timeout()));
    }
}

#[tokio::test]
async fn test_successful_query_is_normalized() {
    let body = json!({
        "MerchantOrderId": "2017051002",
        "Payment": {
            "Status": 1,
            "PaymentId": TRANSACTION_ID,
            "Amount": 15700,
            "ReceivedDate": "2017-05-10 14:51:23",
            "CreditCard": {"CardNumber": "455187******0183", "Brand": "Visa"}
        }
    });
    let (base, server) = serve_once(http_response("200 OK", &body.to_string())).await;

    let params = GetTransactionDataParams {
        request_id: Some("6a1cf4c5-2d7f-4a8b-9d0e-123456789abc".to_owned()),
        ..GetTransactionDataParams::new(TRANSACTION_ID)
    };
    let response = default_client(&base).get_transaction_data(params).await.unwrap();

    let envelope = response.success().expect("success envelope");
    assert_eq!(envelope.order_id.as_deref(), Some("2017051002"));
    assert_eq!(envelope.transaction.amount, Some(15700));
    assert_eq!(envelope.transaction.payment_method_name, Some(Some("Visa".to_owned())));

    let head = server.await.unwrap();
    let lower = head.to_ascii_lowercase();
    assert!(head.starts_with(&format!("GET /v2/sales/{TRANSACTION_ID} HTTP/1.1")));
    assert!(lower.contains("merchantid: merchant-id"));
    assert!(lower.contains("merchantkey: merchant-key"));
    assert!(lower.contains("requestid: 6a1cf4c5-2d7f-4a8b-9d0e-123456789abc"));
    assert!(lower.contains("content-type: application/json"));
}

#[tokio::test]
async fn test_rejection_with_object_body() {
    let body = json!({"Code": 123, "Message": "bad request"}).to_string();
    let (base, _server) = serve_once(http_response("400 Bad Request", &body)).await;

    let response = default_client(&base)
        .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
        .await
        .unwrap();

    assert_eq!(
        response,
        GatewayResponse::Failure(ErrorEnvelope::Error(GatewayError {
            code: 123,
            message: "bad request".to_owned(),
        }))
    );
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"success": false, "code": 123, "message": "bad request"})
    );
}

#[tokio::test]
async fn test_rejection_with_array_body() {
    let body = json!([
        {"Code": 126, "Message": "Credit Card Expiration Date is invalid"},
        {"Code": 127, "Message": "You must provide CreditCard Number"}
    ])
    .to_string();
    let (base, _server) = serve_once(http_response("400 Bad Request", &body)).await;

    let response = default_client(&base)
        .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
        .await
        .unwrap();

    let Some(ErrorEnvelope::Errors(errors)) = response.failure() else {
        panic!("expected a list rejection");
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].code, 126);
    assert_eq!(errors[1].message, "You must provide CreditCard Number");
}

#[tokio::test]
async fn test_not_found_is_transport_error() {
    let (base, _server) = serve_once(http_response("404 Not Found", "")).await;

    let result = default_client(&base)
        .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
        .await;

    match result {
        Err(BraspagError::Transport(err)) => {
            assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
        }
        other => panic!("expected Transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let (base, _server) =
        serve_once(http_response("500 Internal Server Error", "{\"Message\":\"boom\"}")).await;

    let result = default_client(&base)
        .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
        .await;

    assert!(matches!(result, Err(BraspagError::Transport(_))));
}

#[tokio::test]
async fn test_silent_gateway_times_out() {
    let (base, server) = serve_silence().await;
    let observer = Arc::new(RecordingObserver::default());
    let transport = HttpTransport::new().unwrap().with_observer(observer.clone());

    let result = client(&base, 1, transport)
        .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
        .await;
    server.abort();

    match result {
        Err(err @ BraspagError::Timeout { .. }) => {
            assert!(err.is_timeout());
            assert!(matches!(err, BraspagError::Timeout { status: 599, .. }));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert_eq!(*observer.events.lock().unwrap(), vec![
        "request GET".to_owned(),
        "failure timeout=true".to_owned(),
    ]);
}

#[tokio::test]
async fn test_observer_sees_request_and_response() {
    let body = json!({"Payment": {"Status": 2}}).to_string();
    let (base, _server) = serve_once(http_response("200 OK", &body)).await;
    let observer = Arc::new(RecordingObserver::default());
    let transport = HttpTransport::new().unwrap().with_observer(observer.clone());

    client(&base, 10, transport)
        .get_transaction_data(GetTransactionDataParams::new(TRANSACTION_ID))
        .await
        .unwrap();

    assert_eq!(*observer.events.lock().unwrap(), vec![
        "request GET".to_owned(),
        "response 200".to_owned(),
    ]);
}

#[tokio::test]
async fn test_invalid_id_never_connects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let result = default_client(&base)
        .get_transaction_data(GetTransactionDataParams::new("782a56e2-2dae-11e2-b3ee"))
        .await;
    assert!(matches!(result, Err(BraspagError::InvalidArgument(_))));

    let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err(), "no connection expected");
}
