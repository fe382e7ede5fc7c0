use super::make_answer;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hickory_proto::op::Message;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: &'static str,
    pub dns_param: Option<String>,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

struct MockDohState {
    status: StatusCode,
    answer_ip: Ipv4Addr,
    seen: Mutex<Vec<SeenRequest>>,
}

/// In-process RFC 8484 endpoint at `/dns-query` over plain HTTP.
pub struct MockDohServer {
    addr: SocketAddr,
    state: Arc<MockDohState>,
    task: tokio::task::JoinHandle<()>,
}

impl MockDohServer {
    /// Answers every decodable query with one A record for `answer_ip`.
    pub async fn start(answer_ip: Ipv4Addr) -> Self {
        Self::start_with_status(StatusCode::OK, answer_ip).await
    }

    /// Replies with `status` and, for 200, a DNS answer.
    pub async fn start_with_status(status: StatusCode, answer_ip: Ipv4Addr) -> Self {
        let state = Arc::new(MockDohState {
            status,
            answer_ip,
            seen: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/dns-query", get(handle_get).post(handle_post))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    pub fn url(&self) -> String {
        format!("http://{}/dns-query", self.addr)
    }

    /// Base URL, for use as a forward proxy address.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

impl Drop for MockDohServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn respond(state: &MockDohState, query: &[u8]) -> Response {
    if state.status != StatusCode::OK {
        return state.status.into_response();
    }

    let Ok(request) = Message::from_vec(query) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let reply = make_answer(&request, &[(state.answer_ip, 120)]);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/dns-message")],
        reply.to_vec().unwrap(),
    )
        .into_response()
}

async fn handle_get(
    State(state): State<Arc<MockDohState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let dns_param = params.get("dns").cloned();
    state.seen.lock().unwrap().push(SeenRequest {
        method: "GET",
        dns_param: dns_param.clone(),
        body: Vec::new(),
        content_type: content_type(&headers),
    });

    let Some(query) = dns_param.and_then(|p| URL_SAFE_NO_PAD.decode(p).ok()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    respond(&state, &query)
}

async fn handle_post(
    State(state): State<Arc<MockDohState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.seen.lock().unwrap().push(SeenRequest {
        method: "POST",
        dns_param: None,
        body: body.to_vec(),
        content_type: content_type(&headers),
    });
    respond(&state, &body)
}
