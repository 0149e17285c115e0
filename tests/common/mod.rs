//! In-process HTTP/1.1 server that records every request it receives.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fred_client::{Client, ClientConfig, ItemData};
use http::header::CONTENT_TYPE;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

/// A request as seen by the server
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// What the server answers with
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn status(status: StatusCode) -> Self {
        Self::new(status, Vec::new())
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub type Handler = Arc<dyn Fn(&Recorded) -> Reply + Send + Sync>;

pub struct RecordingServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingServer {
    pub async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = log.clone();
                let handler = handler.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let log = log.clone();
                        let handler = handler.clone();
                        async move { Ok::<_, Infallible>(respond(req, &log, &handler).await) }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    /// Answer every request the same way
    pub async fn replying(reply: Reply) -> Self {
        Self::start(Arc::new(move |_: &Recorded| reply.clone())).await
    }

    /// Behave like a single in-memory FReD node
    pub async fn fred_node() -> Self {
        let node = Arc::new(Mutex::new(FredNode::default()));
        Self::start(Arc::new(move |req: &Recorded| {
            node.lock().expect("node state poisoned").handle(req)
        }))
        .await
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port().to_string(),
            ..Default::default()
        }
    }

    pub fn client(&self) -> Client {
        Client::with_config(self.config()).expect("Failed to create client")
    }
}

async fn respond(
    req: Request<Incoming>,
    log: &Mutex<Vec<Recorded>>,
    handler: &Handler,
) -> Response<Full<Bytes>> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = req
        .into_body()
        .collect()
        .await
        .map(|c| c.to_bytes().to_vec())
        .unwrap_or_default();

    let recorded = Recorded {
        method,
        path,
        content_type,
        body,
    };
    let reply = handler(&recorded);
    log.lock().expect("request log poisoned").push(recorded);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    Response::builder()
        .status(reply.status)
        .body(Full::new(Bytes::from(reply.body)))
        .expect("Failed to build response")
}

/// Keygroups and their items, routed the way a FReD node routes them
#[derive(Default)]
struct FredNode {
    keygroups: HashMap<String, HashMap<String, String>>,
    next_id: u64,
}

impl FredNode {
    fn handle(&mut self, req: &Recorded) -> Reply {
        let segments: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();

        match (req.method.as_str(), segments.as_slice()) {
            ("POST", ["keygroup", kg]) => {
                if self.keygroups.contains_key(*kg) {
                    return Reply::status(StatusCode::CONFLICT);
                }
                self.keygroups.insert(kg.to_string(), HashMap::new());
                Reply::status(StatusCode::OK)
            }
            ("DELETE", ["keygroup", kg]) => match self.keygroups.remove(*kg) {
                Some(_) => Reply::status(StatusCode::OK),
                None => Reply::status(StatusCode::CONFLICT),
            },
            ("POST", ["keygroup", kg, "items"]) => {
                let Some(data) = parse_data(&req.body) else {
                    return Reply::status(StatusCode::BAD_REQUEST);
                };
                self.next_id += 1;
                let id = self.next_id.to_string();
                match self.keygroups.get_mut(*kg) {
                    Some(items) => {
                        items.insert(id.clone(), data);
                        Reply::ok(id)
                    }
                    None => Reply::status(StatusCode::NOT_FOUND),
                }
            }
            (method, ["keygroup", kg, "items", id]) => {
                let Some(items) = self.keygroups.get_mut(*kg) else {
                    return Reply::status(StatusCode::NOT_FOUND);
                };
                match method {
                    "GET" => match items.get(*id) {
                        Some(data) => Reply::ok(data.clone()),
                        None => Reply::status(StatusCode::CONFLICT),
                    },
                    "PUT" => match parse_data(&req.body) {
                        Some(data) => {
                            items.insert(id.to_string(), data);
                            Reply::status(StatusCode::OK)
                        }
                        None => Reply::status(StatusCode::BAD_REQUEST),
                    },
                    "DELETE" => match items.remove(*id) {
                        Some(_) => Reply::status(StatusCode::OK),
                        None => Reply::status(StatusCode::NOT_FOUND),
                    },
                    _ => Reply::status(StatusCode::METHOD_NOT_ALLOWED),
                }
            }
            _ => Reply::status(StatusCode::NOT_FOUND),
        }
    }
}

fn parse_data(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ItemData>(body)
        .ok()
        .map(|item| item.data)
}
