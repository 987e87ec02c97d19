// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB v2 endpoint coverage against a local HTTP stub.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use caseline::{Error, InfluxExporter, Precision, RestClient, TokenAuth};

/// Serves a fixed list of canned responses, one connection each, recording
/// every request it answered.
struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    fn serve(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let thread_requests = Arc::clone(&requests);
        let thread_connections = Arc::clone(&connections);
        let handle = thread::spawn(move || {
            for response in responses {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                thread_connections.fetch_add(1, Ordering::SeqCst);
                let request = read_request(&mut stream);
                thread_requests
                    .lock()
                    .expect("record request")
                    .push(request);
                stream
                    .write_all(response.as_bytes())
                    .expect("write stub response");
            }
        });

        StubServer {
            addr,
            requests,
            connections,
            handle: Some(handle),
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Waits for every canned response to be consumed, then returns the
    /// recorded requests.
    fn join(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("stub thread");
        }
        let requests = self.requests.lock().expect("read requests");
        requests.clone()
    }
}

/// Reads one HTTP request (head plus `Content-Length` body) as text.
fn read_request(stream: &mut TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set stub read timeout");

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).expect("read request head");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head_end = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| i + 4)
        .unwrap_or(buf.len());
    let expected_body = content_length(&String::from_utf8_lossy(&buf[..head_end]));
    let mut remaining = expected_body.saturating_sub(buf.len() - head_end);
    while remaining > 0 {
        let n = stream.read(&mut chunk).expect("read request body");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        remaining = remaining.saturating_sub(n);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}

fn header_value(request: &str, name: &str) -> Option<String> {
    request.lines().find_map(|line| {
        let (header, value) = line.split_once(':')?;
        if header.eq_ignore_ascii_case(name) {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

fn stub_exporter(base_url: &str) -> InfluxExporter {
    let client = RestClient::builder(&format!("{}/api/v2", base_url))
        .auth(TokenAuth::new("test-token"))
        .timeout(Duration::from_secs(5))
        .build()
        .expect("build stub client");
    InfluxExporter::new(client, "foo_org", "bar_bucket")
}

#[test]
fn write_runs_bucket_preflight_then_posts_lines() {
    let payload =
        "covid_cases,abbr=AK,fips=02,jurisdiction=Alaska total_cases=293766,id=2 1678201680";
    let server = StubServer::serve(vec![
        http_response("200 OK", r#"{ "buckets": [ { "name": "bar_bucket" } ] }"#),
        http_response("204 No Content", ""),
    ]);
    let exporter = stub_exporter(&server.base_url());

    let result = exporter
        .write(payload, Precision::Seconds, false)
        .expect("write succeeds");
    assert_eq!(result.status, 204);
    assert!(result.accepted());

    let requests = server.join();
    assert_eq!(requests.len(), 2);

    assert!(
        requests[0].starts_with("GET /api/v2/buckets?name=bar_bucket HTTP/1.1"),
        "unexpected preflight request line: {}",
        requests[0]
    );
    assert_eq!(
        header_value(&requests[0], "authorization").as_deref(),
        Some("Token test-token")
    );

    assert!(
        requests[1].starts_with("POST /api/v2/write?bucket=bar_bucket&org=foo_org&precision=s HTTP/1.1"),
        "unexpected write request line: {}",
        requests[1]
    );
    assert_eq!(
        header_value(&requests[1], "authorization").as_deref(),
        Some("Token test-token")
    );
    assert!(requests[1].ends_with(payload));
}

#[test]
fn missing_bucket_fails_before_any_write() {
    let server = StubServer::serve(vec![http_response("200 OK", r#"{ "buckets": [] }"#)]);
    let exporter = stub_exporter(&server.base_url());

    let err = exporter
        .write("m,abbr=AK total_cases=1 1678201680", Precision::Seconds, false)
        .unwrap_err();
    assert!(matches!(err, Error::BucketNotFound(_)));
    assert_eq!(
        err.to_string(),
        "The specified bucket does not exist: bar_bucket"
    );

    let requests = server.join();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /api/v2/buckets"));
}

#[test]
fn bucket_listing_without_buckets_key_is_not_found() {
    let server = StubServer::serve(vec![http_response("200 OK", r#"{ "links": {} }"#)]);
    let exporter = stub_exporter(&server.base_url());

    let err = exporter.bucket_exists().unwrap_err();
    assert!(matches!(err, Error::BucketNotFound(_)));
    server.join();
}

#[test]
fn rejected_token_maps_to_authentication_error() {
    let server = StubServer::serve(vec![http_response(
        "401 Unauthorized",
        r#"{ "code": "unauthorized", "message": "unauthorized access" }"#,
    )]);
    let exporter = stub_exporter(&server.base_url());

    let err = exporter.is_authenticated().unwrap_err();
    match err {
        Error::AuthenticationFailed { bucket, status } => {
            assert_eq!(bucket, "bar_bucket");
            assert_eq!(status, 401);
        }
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
    server.join();
}

#[test]
fn compression_write_never_reaches_the_network() {
    let server = StubServer::serve(Vec::new());
    let exporter = stub_exporter(&server.base_url());

    let err = exporter
        .write("m,abbr=AK total_cases=1 1678201680", Precision::Seconds, true)
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));

    assert_eq!(server.connections(), 0);
    let requests = server.join();
    assert!(requests.is_empty());
}
