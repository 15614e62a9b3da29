// src/transport/vendor_client.rs

use reqwest::Client;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

use crate::error::AdapterError;
use crate::wire::request::ServerRequest;
use crate::wire::response::{ServerResponse, WireResponse};

/// 执行适配器生成的请求。不重试，任何失败都折叠为带 error 的 ServerResponse。
#[derive(Clone)]
pub struct VendorClient {
    client: Client,
    timeout: Duration,
}

impl VendorClient {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// 返回 (响应, 请求耗时_ms)
    pub async fn send(&self, request: &ServerRequest) -> (ServerResponse, u128) {
        let start = Instant::now();
        let result = self.exchange(request).await;
        let elapsed = start.elapsed().as_millis();

        match result {
            Ok(Some(body)) => {
                info!(url = %request.url, elapsed_ms = elapsed as u64, "admatic exchange succeeded");
                (ServerResponse::ok(body), elapsed)
            }
            Ok(None) => {
                warn!(url = %request.url, elapsed_ms = elapsed as u64, "admatic exchange returned an empty body");
                (ServerResponse::default(), elapsed)
            }
            Err(e) => {
                warn!(url = %request.url, elapsed_ms = elapsed as u64, error = %e, "admatic exchange failed");
                (ServerResponse::failed(e.to_string()), elapsed)
            }
        }
    }

    async fn exchange(&self, request: &ServerRequest) -> Result<Option<WireResponse>, AdapterError> {
        let payload = request
            .payload_string()
            .map_err(|e| AdapterError::Decode(e.to_string()))?;

        let response = timeout(
            self.timeout,
            self.client
                .post(&request.url)
                .header("Content-Type", "text/plain")
                .body(payload)
                .send(),
        )
        .await
        .map_err(|_| AdapterError::Transport("timeout".to_string()))?
        .map_err(|e| AdapterError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AdapterError::Transport(format!("http status {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        decode_body(&bytes)
    }
}

/// 空响应体返回 None，交给解析阶段按“没有响应体”处理
pub fn decode_body(bytes: &[u8]) -> Result<Option<WireResponse>, AdapterError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let mut buf = bytes.to_vec();
    simd_json::serde::from_slice::<WireResponse>(&mut buf)
        .map(Some)
        .map_err(|e| AdapterError::Decode(e.to_string()))
}
