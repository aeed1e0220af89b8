//! `HttpFetcher` backed by `reqwest`.

use async_trait::async_trait;
use chainbind_core::types::{HttpRequest, HttpResponse};
use chainbind_core::{HttpFetcher, TransportError};
use std::time::Duration;

pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn send_request(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = reqwest::Method::from_bytes(req.method.as_bytes())
            .map_err(|e| TransportError::Http(format!("invalid method '{}': {e}", req.method)))?;
        let mut builder = self.http.request(method, &req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !req.body.is_empty() {
            builder = builder.body(req.body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let status_code = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;
        tracing::debug!(url = %req.url, status_code, bytes = body.len(), "http response");

        Ok(HttpResponse {
            status_code,
            body: body.to_vec(),
        })
    }
}
