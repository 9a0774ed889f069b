use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::errors::BoxError;
use crate::transport::{RequestSpec, Transport, TransportResponse};

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, spec: RequestSpec) -> Result<TransportResponse, BoxError> {
        let mut request = self
            .client
            .request(spec.method.clone(), &spec.url)
            .timeout(spec.timeout);

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(form) = &spec.form {
            request = request.form(form);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method = %spec.method, url = %spec.url, %status, "http call finished");
        Ok(TransportResponse { status, body })
    }
}
