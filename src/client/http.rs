// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{Method, Request, Transport, TransportError, TransportResponse};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4567";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the annotation server lives and how long a round trip may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// [`Transport`] over HTTP: query strings for reads, a form body for edits.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: ClientConfig,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| TransportError::Setup(err.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, request: &Request) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), request.endpoint.path())
    }
}

fn map_http_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(endpoint = %request.endpoint))]
    async fn send(&self, request: Request) -> Result<TransportResponse, TransportError> {
        let url = self.url(&request);
        let builder = match request.method() {
            Method::Get => self.client.get(&url).query(&request.params),
            Method::Post => self.client.post(&url).form(&request.params),
        };

        let response = builder.send().await.map_err(map_http_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_http_error)?;
        debug!(status, bytes = body.len(), "response received");
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, HttpTransport, DEFAULT_SERVER_URL};
    use crate::client::{Endpoint, Request};

    #[test]
    fn default_config_points_at_local_server() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn url_joins_base_and_endpoint_once() {
        let transport = HttpTransport::new(ClientConfig {
            base_url: "http://annot.example:8080/".to_owned(),
            timeout_secs: 5,
        })
        .expect("transport");
        let request = Request::new(Endpoint::SetPreferred);
        assert_eq!(transport.url(&request), "http://annot.example:8080/setpreferred");
    }
}
