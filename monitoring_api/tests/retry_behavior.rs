use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use monitoring_api::types::Server;
use monitoring_api::{Client, Error, Request, RetryPolicy, TokenProvider};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OK_BODY: &str = r#"{"status":"success","message":"ok","data":{"id":1,"server_uuid":"u","hostname":"h","organization_id":1}}"#;

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_retries(max_retries)
        .with_base_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(50))
        .with_jitter(false)
}

fn client(uri: &str, max_retries: u32) -> Client {
    Client::builder(uri)
        .api_key("k", "s")
        .retry_policy(fast_policy(max_retries))
        .build()
        .unwrap()
}

#[tokio::test]
async fn retryable_statuses_exhaust_the_budget() {
    for status in [500u16, 502, 503, 429] {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/servers"))
            .respond_with(ResponseTemplate::new(status))
            .expect(3)
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri(), 2)
            .execute_paginated::<Server>(Request::get("/v1/servers"))
            .await;

        match result {
            Err(Error::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last.status(), Some(status));
            }
            other => panic!("status {}: expected exhaustion, got {:?}", status, other),
        }
    }
}

#[tokio::test]
async fn client_errors_are_never_retried() {
    for status in [400u16, 401, 403, 404, 409, 422] {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/server/abc"))
            .respond_with(ResponseTemplate::new(status).set_body_string(
                r#"{"status":"error","message":"rejected","error":"REJECTED"}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client(&mock_server.uri(), 3).get_server("abc").await;
        match result {
            Err(Error::HttpStatus {
                status: got,
                message,
                body,
                ..
            }) => {
                assert_eq!(got, status);
                assert_eq!(message.as_deref(), Some("rejected"));
                assert!(body.contains("REJECTED"));
            }
            other => panic!("status {}: expected HTTP error, got {:?}", status, other),
        }
    }
}

#[tokio::test]
async fn recovers_after_transient_failures() {
    let mock_server = MockServer::start().await;
    let attempts = Arc::new(AtomicU32::new(0));
    let attempts_clone = Arc::clone(&attempts);

    Mock::given(method("GET"))
        .and(path("/v1/server/abc"))
        .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
            if attempts_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200).set_body_string(OK_BODY)
            }
        })
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server.uri(), 3)
        .execute::<Server>(Request::get("/v1/server/abc"))
        .await
        .unwrap();
    assert_eq!(resp.attempts, 3);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn honours_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status":"success","data":[],"meta":{"page":1,"limit":10,"total_items":0,"total_pages":0}}"#,
        ))
        .mount(&mock_server)
        .await;

    let client = Client::builder(mock_server.uri())
        .api_key("k", "s")
        .retry_policy(fast_policy(2).with_max_delay(Duration::from_secs(5)))
        .build()
        .unwrap();

    let started = Instant::now();
    let page = client
        .execute_paginated::<Server>(Request::get("/v1/servers"))
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(page.attempts, 2);
}

#[tokio::test]
async fn retries_reuse_the_body() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({"hostname": "web-02"});

    Mock::given(method("PUT"))
        .and(path("/v1/server/abc/details"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/server/abc/details"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resp = client(&mock_server.uri(), 2)
        .execute::<Server>(Request::put("/v1/server/abc/details").json(&body))
        .await
        .unwrap();
    assert_eq!(resp.attempts, 2);
}

#[tokio::test]
async fn connection_refused_is_retried_then_exhausted() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let result = client(&format!("http://{}", addr), 2)
        .execute::<Server>(Request::get("/v1/server/abc"))
        .await;

    match result {
        Err(Error::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, Error::Network(_)));
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn redirect_loops_are_not_retried() {
    let mock_server = MockServer::start().await;
    let location = format!("{}/v1/servers", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", location.as_str()))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server.uri(), 3)
        .execute_paginated::<Server>(Request::get("/v1/servers"))
        .await;

    match result {
        Err(Error::Network(e)) => assert!(e.is_redirect(), "{:?}", e),
        other => panic!("expected a single redirect failure, got {:?}", other),
    }
}

#[tokio::test]
async fn deadline_preempts_a_hung_server() {
    // Accepted by the kernel backlog, never answered.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let client = Client::builder(format!("http://{}", addr))
        .api_key("k", "s")
        .retry_policy(fast_policy(5))
        .build()
        .unwrap();

    let started = Instant::now();
    let result = client
        .execute::<Server>(Request::get("/v1/server/abc").deadline(Duration::from_millis(500)))
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(Error::DeadlineExceeded(_))));
    assert!(elapsed >= Duration::from_millis(450));
    assert!(elapsed < Duration::from_secs(3), "took {:?}", elapsed);
    drop(listener);
}

#[tokio::test]
async fn deadline_preempts_backoff() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/servers"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = Client::builder(mock_server.uri())
        .api_key("k", "s")
        .retry_policy(
            RetryPolicy::default()
                .with_max_retries(10)
                .with_base_delay(Duration::from_secs(10))
                .with_jitter(false),
        )
        .build()
        .unwrap();

    let started = Instant::now();
    let result = client
        .execute_paginated::<Server>(Request::get("/v1/servers").deadline(Duration::from_millis(300)))
        .await;
    assert!(matches!(result, Err(Error::DeadlineExceeded(_))));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[derive(Debug, Default)]
struct CountingProvider(AtomicU32);

impl TokenProvider for CountingProvider {
    fn bearer_token(&self) -> Result<String, Error> {
        Ok(format!("token-{}", self.0.fetch_add(1, Ordering::SeqCst)))
    }
}

#[tokio::test]
async fn each_retry_reapplies_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/server/abc"))
        .and(header("Authorization", "Bearer token-0"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/server/abc"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder(mock_server.uri())
        .token_provider(Arc::new(CountingProvider::default()))
        .retry_policy(fast_policy(2))
        .build()
        .unwrap();
    let server = client.get_server("abc").await.unwrap();
    assert_eq!(server.hostname, "h");
}

#[tokio::test]
async fn concurrent_calls_do_not_interfere() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(|req: &wiremock::Request| -> ResponseTemplate {
            let uuid = req.url.path().trim_start_matches("/v1/server/").to_string();
            let body = serde_json::json!({
                "status": "success",
                "message": "ok",
                "data": {"id": 1, "server_uuid": uuid, "hostname": format!("host-{}", uuid), "organization_id": 1}
            });
            ResponseTemplate::new(200).set_body_json(body)
        })
        .expect(100)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server.uri(), 0);
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..100 {
        let client = client.clone();
        tasks.spawn(async move {
            let uuid = format!("srv-{}", i);
            let server = client.get_server(&uuid).await.unwrap();
            (uuid, server)
        });
    }

    let mut seen = 0;
    while let Some(joined) = tasks.join_next().await {
        let (uuid, server) = joined.unwrap();
        assert_eq!(server.server_uuid, uuid);
        assert_eq!(server.hostname, format!("host-{}", uuid));
        seen += 1;
    }
    assert_eq!(seen, 100);
}
