// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Reqwest based [`HttpSend`] for creditsign.
//!
//! This is the transport collaborator: it owns timeouts, proxy usage and
//! retries, and hands any transport error back to the caller unchanged.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use creditsign_core::{Error, HttpSend, Result};
use http_body_util::BodyExt;
use log::{debug, warn};
use reqwest::{Client, Request};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default number of extra attempts after a transport failure.
pub const DEFAULT_RETRY: usize = 1;

/// HttpSend implementation backed by [`reqwest::Client`].
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
    retry: usize,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client, retry: 0 }
    }

    /// Create a builder with the credit API defaults: 60s timeout, no proxy, one retry.
    pub fn builder() -> ReqwestHttpSendBuilder {
        ReqwestHttpSendBuilder::default()
    }

    /// Set how many extra attempts are made when the transport fails.
    pub fn with_retry(mut self, retry: usize) -> Self {
        self.retry = retry;
        self
    }

    async fn send_once(&self, req: Request) -> Result<http::Response<Bytes>> {
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::unexpected("failed to send http request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::unexpected("failed to read http response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert http request").with_source(e))?;

        let mut attempt = 0;
        loop {
            // Bytes bodies can always be cloned.
            let Some(current) = req.try_clone() else {
                return self.send_once(req).await;
            };

            match self.send_once(current).await {
                Ok(resp) => return Ok(resp),
                Err(err) if attempt < self.retry => {
                    attempt += 1;
                    warn!("http send to {} failed, retrying ({attempt}/{}): {err:?}", req.url(), self.retry);
                }
                Err(err) => {
                    debug!("http send to {} failed after {} attempts", req.url(), attempt + 1);
                    return Err(err);
                }
            }
        }
    }
}

/// Builder for [`ReqwestHttpSend`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpSendBuilder {
    timeout: Duration,
    use_proxy: bool,
    retry: usize,
}

impl Default for ReqwestHttpSendBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            use_proxy: false,
            retry: DEFAULT_RETRY,
        }
    }
}

impl ReqwestHttpSendBuilder {
    /// Set the total timeout of a single attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allow reqwest to pick up proxies from the environment.
    pub fn use_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    /// Set how many extra attempts are made when the transport fails.
    pub fn retry(mut self, retry: usize) -> Self {
        self.retry = retry;
        self
    }

    /// Build the http sender.
    pub fn build(self) -> Result<ReqwestHttpSend> {
        let mut builder = Client::builder().timeout(self.timeout);
        if !self.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| Error::config_invalid("failed to build reqwest client").with_source(e))?;

        Ok(ReqwestHttpSend::new(client).with_retry(self.retry))
    }
}
