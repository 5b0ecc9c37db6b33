//! Mock secret-store HTTP API for E2E tests
//!
//! Serves canned responses per request path and records every request, so
//! tests can assert both what the client got back and what it sent (paths,
//! auth headers).

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use tokio::net::TcpListener;

/// A recorded HTTP request for test assertions
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query
    pub uri: String,
    /// Header names are lower-case
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// First value of header `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response served for a path
#[derive(Clone, Debug)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

type Routes = Arc<RwLock<HashMap<String, CannedResponse>>>;

/// A mock HTTP API server for testing
///
/// Paths without a canned response answer `404` with an empty JSON error
/// body, which is how both Vault and Kubernetes report missing secrets.
pub struct MockApiServer {
    addr: SocketAddr,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    routes: Routes,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockApiServer {
    /// Start a mock API server on an ephemeral port
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API server");
        let addr = listener.local_addr().unwrap();

        let requests: Arc<RwLock<Vec<RecordedRequest>>> = Arc::new(RwLock::new(Vec::new()));
        let routes: Routes = Arc::new(RwLock::new(HashMap::new()));
        let delay: Arc<RwLock<Option<Duration>>> = Arc::new(RwLock::new(None));

        let requests_clone = requests.clone();
        let routes_clone = routes.clone();
        let delay_clone = delay.clone();

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };

                let requests = requests_clone.clone();
                let routes = routes_clone.clone();
                let delay = delay_clone.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let requests = requests.clone();
                        let routes = routes.clone();
                        let delay = delay.clone();
                        async move {
                            let path = req.uri().path().to_string();
                            requests.write().push(RecordedRequest {
                                method: req.method().to_string(),
                                uri: req.uri().to_string(),
                                headers: req
                                    .headers()
                                    .iter()
                                    .map(|(k, v)| {
                                        (k.to_string(), v.to_str().unwrap_or("").to_string())
                                    })
                                    .collect(),
                            });

                            let pause = *delay.read();
                            if let Some(pause) = pause {
                                tokio::time::sleep(pause).await;
                            }

                            let canned = routes.read().get(&path).cloned().unwrap_or(
                                CannedResponse {
                                    status: StatusCode::NOT_FOUND,
                                    body: br#"{"errors":[]}"#.to_vec(),
                                },
                            );

                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(canned.status)
                                    .header("content-type", "application/json")
                                    .body(Full::new(Bytes::from(canned.body)))
                                    .unwrap(),
                            )
                        }
                    });

                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            addr,
            requests,
            routes,
            delay,
        }
    }

    /// Get the address this server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to configure clients with (e.g. `http://127.0.0.1:12345`)
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve `body` with `status` for `path`
    pub fn respond(&self, path: impl Into<String>, status: StatusCode, body: impl Into<Vec<u8>>) {
        self.routes.write().insert(
            path.into(),
            CannedResponse {
                status,
                body: body.into(),
            },
        );
    }

    /// Serve `body` as JSON with `200 OK` for `path`
    pub fn respond_json(&self, path: impl Into<String>, body: &serde_json::Value) {
        self.respond(path, StatusCode::OK, body.to_string());
    }

    /// Hold every response back for `delay`
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write() = Some(delay);
    }

    /// Get all recorded requests
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().clone()
    }

    /// Get the last recorded request (if any)
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.read().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_response() {
        let server = MockApiServer::start().await;
        server.respond_json("/v1/kv/app", &serde_json::json!({"data": {"k": "v"}}));
        assert!(server.addr().ip().is_loopback());
        assert_eq!(server.base_url(), format!("http://{}", server.addr()));

        let resp = reqwest::Client::new()
            .get(format!("{}/v1/kv/app", server.base_url()))
            .header("X-Vault-Token", "t0k3n")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), r#"{"data":{"k":"v"}}"#);

        let requests = server.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].uri, "/v1/kv/app");
        assert_eq!(requests[0].header("x-vault-token"), Some("t0k3n"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let server = MockApiServer::start().await;

        let resp = reqwest::Client::new()
            .get(format!("{}/nothing/here", server.base_url()))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 404);
        assert_eq!(server.last_request().unwrap().uri, "/nothing/here");
    }
}
